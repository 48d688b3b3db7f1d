//! Seam between the view layer and whatever globe widget renders the map.

use serde::Serialize;

use crate::layer::{Layer, LayerId};
use crate::raster::RasterLayer;
use crate::wms::WmsOverlay;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageryLayer {
    /// Imagery the widget ships with before anyone configures it.
    Builtin { name: String },
    Tiles(RasterLayer),
    Wms(WmsOverlay),
}

impl ImageryLayer {
    pub fn name(&self) -> &str {
        match self {
            ImageryLayer::Builtin { name } => name,
            ImageryLayer::Tiles(l) => l.name(),
            ImageryLayer::Wms(l) => l.name(),
        }
    }

    pub fn id(&self) -> Option<LayerId> {
        match self {
            ImageryLayer::Builtin { .. } => None,
            ImageryLayer::Tiles(l) => Some(l.id()),
            ImageryLayer::Wms(l) => Some(l.id()),
        }
    }

    pub fn is_overlay(&self) -> bool {
        matches!(self, ImageryLayer::Wms(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneMode {
    Scene2D,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    /// Smooth WGS84 ellipsoid, no elevation data.
    Ellipsoid,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraView {
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub height_m: f64,
}

impl CameraView {
    pub fn new(lon_deg: f64, lat_deg: f64, height_m: f64) -> Self {
        Self {
            lon_deg,
            lat_deg,
            height_m,
        }
    }
}

pub trait MapWidget {
    /// False until the underlying widget has finished mounting.
    fn is_ready(&self) -> bool {
        true
    }
    fn imagery_layers(&self) -> &[ImageryLayer];
    fn remove_all_imagery(&mut self);
    fn add_imagery(&mut self, layer: ImageryLayer);
    fn set_scene_mode(&mut self, mode: SceneMode);
    fn set_terrain(&mut self, terrain: Terrain);
    fn set_camera(&mut self, view: CameraView);
}
