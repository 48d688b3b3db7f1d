//! Upload view: a queue of zipped shapefiles plus the import history.

use std::path::Path;
use std::sync::Arc;

use client::{
    GeoImporterApi, ImportId, ImportSummary, ShapefileArchive, UploadMode, UploadResponse,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ViewError;
use crate::notice::NoticeSlot;
use crate::scope::ViewScope;

pub const ZIP_ONLY_MESSAGE: &str = "Only .zip archives are accepted";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    Pending,
    Uploading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedFile {
    pub id: Uuid,
    #[serde(rename = "file")]
    pub file_name: String,
    #[serde(skip)]
    archive: ShapefileArchive,
    pub state: FileState,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<UploadResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadedFile {
    fn new(archive: ShapefileArchive) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: archive.file_name.clone(),
            archive,
            state: FileState::Pending,
            progress: 0,
            response: None,
            error: None,
        }
    }
}

pub fn is_zip_archive(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

pub struct UploadView {
    api: Arc<dyn GeoImporterApi>,
    scope: ViewScope,
    mode: UploadMode,
    files: Vec<UploadedFile>,
    imports: Vec<ImportSummary>,
    selected: Option<ImportSummary>,
    busy: bool,
    pub notice: NoticeSlot,
}

impl UploadView {
    pub fn new(api: Arc<dyn GeoImporterApi>) -> Self {
        Self {
            api,
            scope: ViewScope::new(),
            mode: UploadMode::default(),
            files: Vec::new(),
            imports: Vec::new(),
            selected: None,
            busy: false,
            notice: NoticeSlot::default(),
        }
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn mode(&self) -> UploadMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: UploadMode) {
        self.mode = mode;
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn imports(&self) -> &[ImportSummary] {
        &self.imports
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn has_pending(&self) -> bool {
        self.files.iter().any(|f| f.state == FileState::Pending)
    }

    /// Queues the `.zip` archives and hands back the names of everything
    /// else. Rejected files never reach the network.
    pub fn add_files(&mut self, archives: impl IntoIterator<Item = ShapefileArchive>) -> Vec<String> {
        let mut rejected = Vec::new();
        for archive in archives {
            if is_zip_archive(&archive.file_name) {
                debug!(file = %archive.file_name, "queued archive");
                self.files.push(UploadedFile::new(archive));
            } else {
                rejected.push(archive.file_name);
            }
        }
        if !rejected.is_empty() {
            warn!(?rejected, "rejected non-zip files");
            self.notice.error(ZIP_ONLY_MESSAGE);
        }
        rejected
    }

    /// Drops a queued file unless it is currently uploading.
    pub fn remove_file(&mut self, id: Uuid) -> bool {
        let before = self.files.len();
        self.files
            .retain(|f| f.id != id || f.state == FileState::Uploading);
        self.files.len() != before
    }

    fn file_mut(&mut self, id: Uuid) -> Result<&mut UploadedFile, ViewError> {
        self.files
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| ViewError::NotFound(id.to_string()))
    }

    /// Uploads one queued file with the current mode. An API failure is
    /// recorded on the file; only cancellation is returned as an error.
    pub async fn upload_file(&mut self, id: Uuid) -> Result<FileState, ViewError> {
        let mode = self.mode;
        let archive = {
            let file = self.file_mut(id)?;
            file.state = FileState::Uploading;
            file.progress = 0;
            file.error = None;
            file.archive.clone()
        };

        let api = self.api.clone();
        let outcome = match self.scope.run(api.upload(mode, archive)).await {
            Ok(outcome) => outcome,
            Err(cancelled) => {
                self.file_mut(id)?.state = FileState::Pending;
                return Err(cancelled.into());
            }
        };

        let file = self.file_mut(id)?;
        match outcome {
            Ok(response) => {
                info!(file = %file.file_name, import_id = ?response.import_id, "upload finished");
                file.state = FileState::Success;
                file.progress = 100;
                file.response = Some(response);
            }
            Err(err) => {
                warn!(file = %file.file_name, error = %err, "upload failed");
                file.state = FileState::Error;
                file.error = Some(err.user_message());
                return Ok(FileState::Error);
            }
        }
        self.load_imports().await?;
        Ok(FileState::Success)
    }

    /// Uploads every pending file one after another. Returns how many
    /// succeeded.
    pub async fn upload_all(&mut self) -> Result<usize, ViewError> {
        let pending: Vec<Uuid> = self
            .files
            .iter()
            .filter(|f| f.state == FileState::Pending)
            .map(|f| f.id)
            .collect();

        self.busy = true;
        let mut succeeded = 0;
        for id in pending {
            match self.upload_file(id).await {
                Ok(FileState::Success) => succeeded += 1,
                Ok(_) => {}
                Err(err) => {
                    self.busy = false;
                    return Err(err);
                }
            }
        }
        self.busy = false;
        Ok(succeeded)
    }

    pub async fn load_imports(&mut self) -> Result<(), ViewError> {
        let api = self.api.clone();
        match self.scope.run(api.list_imports()).await? {
            Ok(list) => self.imports = list.imports,
            Err(err) => {
                warn!(error = %err, "failed to load imports");
                self.notice.error(err.user_message());
            }
        }
        Ok(())
    }

    pub async fn delete_import(&mut self, id: ImportId) -> Result<(), ViewError> {
        let api = self.api.clone();
        match self.scope.run(api.delete_import(id)).await? {
            Ok(_) => self.load_imports().await,
            Err(err) => {
                self.notice.error(err.user_message());
                Ok(())
            }
        }
    }

    /// Opens the details dialog for an import in the history.
    pub fn select_import(&mut self, id: ImportId) -> Option<&ImportSummary> {
        self.selected = self.imports.iter().find(|i| i.id == id).cloned();
        self.selected.as_ref()
    }

    pub fn selected(&self) -> Option<&ImportSummary> {
        self.selected.as_ref()
    }

    pub fn close_details(&mut self) {
        self.selected = None;
    }
}
