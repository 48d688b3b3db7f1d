use serde::Serialize;

use crate::widget::{CameraView, ImageryLayer, MapWidget, SceneMode, Terrain};

/// In-memory widget that keeps every call's effect so it can be inspected
/// or printed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordingWidget {
    pub ready: bool,
    layers: Vec<ImageryLayer>,
    pub scene_mode: Option<SceneMode>,
    pub terrain: Option<Terrain>,
    pub camera: Option<CameraView>,
}

impl Default for RecordingWidget {
    fn default() -> Self {
        Self {
            ready: true,
            layers: Vec::new(),
            scene_mode: None,
            terrain: None,
            camera: None,
        }
    }
}

impl RecordingWidget {
    /// Starts with the imagery a freshly mounted globe shows by default.
    pub fn with_builtin_imagery() -> Self {
        Self {
            layers: vec![ImageryLayer::Builtin {
                name: "Default aerial imagery".to_string(),
            }],
            ..Self::default()
        }
    }

    pub fn overlay_count(&self) -> usize {
        self.layers.iter().filter(|l| l.is_overlay()).count()
    }
}

impl MapWidget for RecordingWidget {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn imagery_layers(&self) -> &[ImageryLayer] {
        &self.layers
    }

    fn remove_all_imagery(&mut self) {
        self.layers.clear();
    }

    fn add_imagery(&mut self, layer: ImageryLayer) {
        self.layers.push(layer);
    }

    fn set_scene_mode(&mut self, mode: SceneMode) {
        self.scene_mode = Some(mode);
    }

    fn set_terrain(&mut self, terrain: Terrain) {
        self.terrain = Some(terrain);
    }

    fn set_camera(&mut self, view: CameraView) {
        self.camera = Some(view);
    }
}
