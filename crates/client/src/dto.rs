//! Transport types exchanged with the geoimporter backend.
//!
//! Field names follow the backend's JSON (snake_case).

use serde::{Deserialize, Serialize};

pub type ImportId = u64;

/// Lifecycle of an import as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportState {
    Pending,
    Processing,
    Success,
    Error,
    /// Any status string this client does not know; kept verbatim.
    Other(String),
}

impl ImportState {
    pub fn as_str(&self) -> &str {
        match self {
            ImportState::Pending => "pending",
            ImportState::Processing => "processing",
            ImportState::Success => "success",
            ImportState::Error => "error",
            ImportState::Other(s) => s,
        }
    }
}

impl From<&str> for ImportState {
    fn from(s: &str) -> Self {
        match s {
            "pending" => ImportState::Pending,
            "processing" => ImportState::Processing,
            "success" => ImportState::Success,
            "error" => ImportState::Error,
            other => ImportState::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for ImportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ImportState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ImportState {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ImportState::from(raw.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_id: Option<ImportId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    /// `[name, type]` pairs.
    #[serde(default)]
    pub columns: Vec<Vec<String>>,
    pub row_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srid: Option<i64>,
}

impl TableInfo {
    /// Column `(name, type)` pairs, skipping malformed entries.
    pub fn column_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().filter_map(|c| match c.as_slice() {
            [name, ty, ..] => Some((name.as_str(), ty.as_str())),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportStatus {
    pub id: ImportId,
    pub name: String,
    pub status: ImportState,
    pub table_name: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geoserver_layer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geoserver_wms_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geoserver_wfs_url: Option<String>,
    #[serde(default)]
    pub published_to_geoserver: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_info: Option<TableInfo>,
}

/// Summary entry from the list endpoint; carries no publish fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub id: ImportId,
    pub name: String,
    pub status: ImportState,
    pub table_name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImportList {
    #[serde(default)]
    pub imports: Vec<ImportSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoServerUserCreate {
    pub username: String,
    pub password: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for GeoServerUserCreate {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoServerLayerList {
    #[serde(default)]
    pub layers: Vec<serde_json::Value>,
}

/// A zipped shapefile ready to be sent as the `shapefile` multipart field.
#[derive(Clone, PartialEq, Eq)]
pub struct ShapefileArchive {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ShapefileArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapefileArchive")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ShapefileArchive {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}
