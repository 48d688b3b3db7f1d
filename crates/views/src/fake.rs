use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use client::{
    ApiError, BoxFuture, DeleteResponse, GeoImporterApi, GeoServerUserCreate, ImportId,
    ImportList, ImportState, ImportStatus, ImportSummary, MessageResponse, ShapefileArchive,
    UploadMode, UploadResponse,
};

pub(crate) fn import(id: ImportId, name: &str) -> ImportStatus {
    ImportStatus {
        id,
        name: name.to_string(),
        status: ImportState::Success,
        table_name: format!("{name}_{id}"),
        created_at: "2024-05-01T10:00:00Z".to_string(),
        geoserver_layer: None,
        geoserver_wms_url: None,
        geoserver_wfs_url: None,
        published_to_geoserver: false,
        table_info: None,
    }
}

pub(crate) fn published(id: ImportId, name: &str) -> ImportStatus {
    ImportStatus {
        geoserver_layer: Some(format!("geoimporter:{name}")),
        geoserver_wms_url: Some("http://gs.test/geoserver/wms".to_string()),
        published_to_geoserver: true,
        ..import(id, name)
    }
}

fn failed(status: u16, message: &str) -> ApiError {
    ApiError::Status {
        status,
        message: message.to_string(),
    }
}

/// Counts concurrent calls and remembers the peak.
#[derive(Default)]
pub(crate) struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Holds a slot across one scheduler yield so overlapping callers are seen.
    async fn hold(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Backend double that keeps imports in memory and records every call.
#[derive(Default)]
pub(crate) struct FakeApi {
    pub imports: Mutex<Vec<ImportStatus>>,
    pub failing_status: Mutex<HashSet<ImportId>>,
    pub failing_uploads: Mutex<HashSet<String>>,
    pub fail_list: Mutex<Option<String>>,
    pub calls: Mutex<Vec<String>>,
    pub status_in_flight: InFlight,
    pub uploads_in_flight: InFlight,
    next_id: AtomicU64,
}

impl FakeApi {
    pub fn with_imports(imports: Vec<ImportStatus>) -> Self {
        let next = imports.iter().map(|i| i.id).max().unwrap_or(0);
        Self {
            imports: Mutex::new(imports),
            next_id: AtomicU64::new(next),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl GeoImporterApi for FakeApi {
    fn upload(
        &self,
        mode: UploadMode,
        archive: ShapefileArchive,
    ) -> BoxFuture<'_, Result<UploadResponse, ApiError>> {
        Box::pin(async move {
            self.record(format!("upload {} {}", mode.as_str(), archive.file_name));
            self.uploads_in_flight.hold().await;
            if self.failing_uploads.lock().unwrap().contains(&archive.file_name) {
                return Err(failed(400, "Invalid shapefile"));
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let name = archive.file_name.trim_end_matches(".zip").to_string();
            let entry = import(id, &name);
            let table_name = entry.table_name.clone();
            self.imports.lock().unwrap().push(entry);
            Ok(UploadResponse {
                success: true,
                message: "Shapefile imported".to_string(),
                import_id: Some(id),
                table_name: Some(table_name),
            })
        })
    }

    fn get_import_status(&self, id: ImportId) -> BoxFuture<'_, Result<ImportStatus, ApiError>> {
        Box::pin(async move {
            self.record(format!("status {id}"));
            self.status_in_flight.hold().await;
            if self.failing_status.lock().unwrap().contains(&id) {
                return Err(failed(500, "Failed to get status"));
            }
            self.imports
                .lock()
                .unwrap()
                .iter()
                .find(|i| i.id == id)
                .cloned()
                .ok_or_else(|| failed(404, "Import not found"))
        })
    }

    fn list_imports(&self) -> BoxFuture<'_, Result<ImportList, ApiError>> {
        Box::pin(async move {
            self.record("list".to_string());
            if let Some(message) = self.fail_list.lock().unwrap().clone() {
                return Err(failed(500, &message));
            }
            let imports = self
                .imports
                .lock()
                .unwrap()
                .iter()
                .map(|i| ImportSummary {
                    id: i.id,
                    name: i.name.clone(),
                    status: i.status.clone(),
                    table_name: i.table_name.clone(),
                    created_at: i.created_at.clone(),
                })
                .collect();
            Ok(ImportList { imports })
        })
    }

    fn delete_import(&self, id: ImportId) -> BoxFuture<'_, Result<DeleteResponse, ApiError>> {
        Box::pin(async move {
            self.record(format!("delete {id}"));
            let mut imports = self.imports.lock().unwrap();
            let before = imports.len();
            imports.retain(|i| i.id != id);
            if imports.len() == before {
                return Err(failed(404, "Import not found"));
            }
            Ok(DeleteResponse {
                success: true,
                message: "Import deleted".to_string(),
            })
        })
    }

    fn publish_to_geoserver(
        &self,
        id: ImportId,
    ) -> BoxFuture<'_, Result<UploadResponse, ApiError>> {
        Box::pin(async move {
            self.record(format!("publish {id}"));
            let mut imports = self.imports.lock().unwrap();
            let entry = imports
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or_else(|| failed(404, "Import not found"))?;
            *entry = published(entry.id, &entry.name);
            Ok(UploadResponse {
                success: true,
                message: "Published".to_string(),
                import_id: Some(id),
                table_name: Some(entry.table_name.clone()),
            })
        })
    }

    fn create_geoserver_user(
        &self,
        user: GeoServerUserCreate,
    ) -> BoxFuture<'_, Result<MessageResponse, ApiError>> {
        Box::pin(async move {
            self.record(format!("create user {}", user.username));
            if user.username.is_empty() || user.password.is_empty() {
                return Err(failed(400, "Username and password required"));
            }
            Ok(MessageResponse {
                message: format!("User {} created", user.username),
            })
        })
    }
}
