use serde::Serialize;

use crate::layer::{Layer, LayerId};

pub const OSM_TILE_URL: &str = "https://a.tile.openstreetmap.org/";

/// XYZ raster tile source used as a base map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasterLayer {
    id: LayerId,
    name: String,
    /// Tile root; tiles live at `{source}{z}/{x}/{y}.{extension}`.
    pub source: String,
    pub extension: String,
    pub max_zoom: u8,
}

impl RasterLayer {
    pub fn new(id: u64, name: impl Into<String>, source: impl Into<String>) -> Self {
        let mut source = source.into();
        if !source.ends_with('/') {
            source.push('/');
        }
        Self {
            id: LayerId(id),
            name: name.into(),
            source,
            extension: "png".to_string(),
            max_zoom: 19,
        }
    }

    pub fn open_street_map(id: u64) -> Self {
        Self::new(id, "OpenStreetMap", OSM_TILE_URL)
    }

    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> String {
        format!("{}{z}/{x}/{y}.{}", self.source, self.extension)
    }
}

impl Layer for RasterLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osm_tile_urls() {
        let osm = RasterLayer::open_street_map(1);
        assert_eq!(osm.tile_url(3, 4, 2), "https://a.tile.openstreetmap.org/3/4/2.png");
        assert_eq!(osm.name(), "OpenStreetMap");
    }

    #[test]
    fn source_gets_trailing_slash() {
        let l = RasterLayer::new(2, "local", "http://tiles.local/osm");
        assert_eq!(l.tile_url(0, 0, 0), "http://tiles.local/osm/0/0/0.png");
    }
}
