use serde::Serialize;
use url::Url;

use crate::error::LayerError;
use crate::layer::{Layer, LayerId};

/// A remotely rendered image layer served by a GeoServer WMS endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WmsOverlay {
    id: LayerId,
    pub url: String,
    pub layer_name: String,
    pub format: String,
    pub transparent: bool,
    pub version: String,
}

impl WmsOverlay {
    pub fn new(id: u64, url: impl Into<String>, layer_name: impl Into<String>) -> Self {
        Self {
            id: LayerId(id),
            url: url.into(),
            layer_name: layer_name.into(),
            format: "image/png".to_string(),
            transparent: true,
            version: "1.1.1".to_string(),
        }
    }

    /// Both the endpoint and the layer name must be present and non-blank.
    pub fn from_parts(id: u64, url: Option<&str>, layer_name: Option<&str>) -> Option<Self> {
        let url = url.map(str::trim).filter(|s| !s.is_empty())?;
        let layer_name = layer_name.map(str::trim).filter(|s| !s.is_empty())?;
        Some(Self::new(id, url, layer_name))
    }

    /// GetMap request for a WGS84 bbox `(lon_min, lat_min, lon_max, lat_max)`.
    pub fn get_map_url(
        &self,
        bbox: (f64, f64, f64, f64),
        width: u32,
        height: u32,
    ) -> Result<String, LayerError> {
        let mut url =
            Url::parse(&self.url).map_err(|e| LayerError::InvalidUrl(format!("{}: {e}", self.url)))?;
        let (lon_min, lat_min, lon_max, lat_max) = bbox;
        url.query_pairs_mut()
            .append_pair("service", "WMS")
            .append_pair("version", &self.version)
            .append_pair("request", "GetMap")
            .append_pair("layers", &self.layer_name)
            .append_pair("styles", "")
            .append_pair("format", &self.format)
            .append_pair("transparent", if self.transparent { "true" } else { "false" })
            .append_pair("srs", "EPSG:4326")
            .append_pair("bbox", &format!("{lon_min},{lat_min},{lon_max},{lat_max}"))
            .append_pair("width", &width.to_string())
            .append_pair("height", &height.to_string());
        Ok(url.into())
    }
}

impl Layer for WmsOverlay {
    fn id(&self) -> LayerId {
        self.id
    }

    fn name(&self) -> &str {
        &self.layer_name
    }
}
