use std::env;

use tracing::{debug, info};

use crate::error::LayerError;
use crate::raster::{OSM_TILE_URL, RasterLayer};
use crate::widget::{CameraView, ImageryLayer, MapWidget, SceneMode, Terrain};
use crate::wms::WmsOverlay;

pub const BASEMAP_URL_VAR: &str = "GEOIMPORTER_BASEMAP_URL";

/// Camera height over the null island, in meters.
pub const DEFAULT_CAMERA_HEIGHT_M: f64 = 10_000_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BaseMapConfig {
    pub basemap: RasterLayer,
    pub scene_mode: SceneMode,
    pub terrain: Terrain,
    pub camera: CameraView,
}

impl Default for BaseMapConfig {
    fn default() -> Self {
        Self::with_tile_url(OSM_TILE_URL)
    }
}

impl BaseMapConfig {
    pub fn with_tile_url(url: &str) -> Self {
        let basemap = if url == OSM_TILE_URL {
            RasterLayer::open_street_map(0)
        } else {
            RasterLayer::new(0, "Basemap", url)
        };
        Self {
            basemap,
            scene_mode: SceneMode::Scene2D,
            terrain: Terrain::Ellipsoid,
            camera: CameraView::new(0.0, 0.0, DEFAULT_CAMERA_HEIGHT_M),
        }
    }

    /// `GEOIMPORTER_BASEMAP_URL` overrides the OpenStreetMap tile root.
    pub fn from_env() -> Self {
        match env::var(BASEMAP_URL_VAR) {
            Ok(url) if !url.trim().is_empty() => Self::with_tile_url(url.trim()),
            _ => Self::default(),
        }
    }
}

/// Replaces whatever imagery the widget started with by the configured
/// tile basemap and resets scene, terrain and camera.
pub fn configure_base_map<W: MapWidget + ?Sized>(
    widget: &mut W,
    config: &BaseMapConfig,
) -> Result<(), LayerError> {
    if !widget.is_ready() {
        return Err(LayerError::WidgetNotReady);
    }
    let stripped = widget.imagery_layers().len();
    widget.remove_all_imagery();
    widget.add_imagery(ImageryLayer::Tiles(config.basemap.clone()));
    widget.set_scene_mode(config.scene_mode);
    widget.set_terrain(config.terrain.clone());
    widget.set_camera(config.camera);
    debug!(stripped, source = %config.basemap.source, "base map configured");
    Ok(())
}

pub fn add_overlay<W: MapWidget + ?Sized>(
    widget: &mut W,
    overlay: WmsOverlay,
) -> Result<(), LayerError> {
    if !widget.is_ready() {
        return Err(LayerError::WidgetNotReady);
    }
    info!(layer = %overlay.layer_name, url = %overlay.url, "adding WMS overlay");
    widget.add_imagery(ImageryLayer::Wms(overlay));
    Ok(())
}
