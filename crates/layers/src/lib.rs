pub mod error;
pub mod layer;
pub mod raster;
pub mod recording;
pub mod viewer;
pub mod widget;
pub mod wms;

pub use error::LayerError;
pub use layer::{Layer, LayerId};
pub use raster::{OSM_TILE_URL, RasterLayer};
pub use recording::RecordingWidget;
pub use viewer::{BaseMapConfig, add_overlay, configure_base_map};
pub use widget::{CameraView, ImageryLayer, MapWidget, SceneMode, Terrain};
pub use wms::WmsOverlay;
