//! Layer list view: every import with its full detail, fetched concurrently.

use std::sync::Arc;

use client::{ApiError, GeoImporterApi, ImportId, ImportState, ImportStatus, ImportSummary};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ViewError;
use crate::notice::NoticeSlot;
use crate::routes::Route;
use crate::scope::{Cancelled, ViewScope};

/// A list entry. When the detail fetch fails the row keeps the summary,
/// reports `error` and counts as unpublished.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "row", rename_all = "lowercase")]
pub enum Row {
    Ok(ImportStatus),
    Degraded {
        summary: ImportSummary,
        reason: String,
    },
}

impl Row {
    pub fn id(&self) -> ImportId {
        match self {
            Row::Ok(s) => s.id,
            Row::Degraded { summary, .. } => summary.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Row::Ok(s) => &s.name,
            Row::Degraded { summary, .. } => &summary.name,
        }
    }

    pub fn status(&self) -> ImportState {
        match self {
            Row::Ok(s) => s.status.clone(),
            Row::Degraded { .. } => ImportState::Error,
        }
    }

    pub fn published_to_geoserver(&self) -> bool {
        match self {
            Row::Ok(s) => s.published_to_geoserver,
            Row::Degraded { .. } => false,
        }
    }

    pub fn detail(&self) -> Option<&ImportStatus> {
        match self {
            Row::Ok(s) => Some(s),
            Row::Degraded { .. } => None,
        }
    }
}

pub struct LayerListView {
    api: Arc<dyn GeoImporterApi>,
    scope: ViewScope,
    rows: Vec<Row>,
    loading: bool,
    action_in_flight: Option<ImportId>,
    details: Option<ImportId>,
    pub notice: NoticeSlot,
}

impl LayerListView {
    pub fn new(api: Arc<dyn GeoImporterApi>) -> Self {
        Self {
            api,
            scope: ViewScope::new(),
            rows: Vec::new(),
            loading: true,
            action_in_flight: None,
            details: None,
            notice: NoticeSlot::default(),
        }
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Id whose delete or publish is currently running.
    pub fn action_in_flight(&self) -> Option<ImportId> {
        self.action_in_flight
    }

    pub async fn load(&mut self) -> Result<(), ViewError> {
        self.loading = true;
        self.notice.dismiss();
        let result = self.fetch_rows().await;
        self.loading = false;
        match result? {
            Ok(rows) => self.rows = rows,
            Err(err) => {
                warn!(error = %err, "failed to load imports");
                self.notice.error(err.user_message());
            }
        }
        Ok(())
    }

    async fn fetch_rows(
        &self,
    ) -> Result<Result<Vec<Row>, ApiError>, Cancelled> {
        let api = self.api.as_ref();
        self.scope
            .run(async move {
                let list = api.list_imports().await?;
                let details = list.imports.into_iter().map(|summary| async move {
                    match api.get_import_status(summary.id).await {
                        Ok(status) => Row::Ok(status),
                        Err(err) => {
                            debug!(id = summary.id, error = %err, "detail fetch failed");
                            Row::Degraded {
                                summary,
                                reason: err.user_message(),
                            }
                        }
                    }
                });
                Ok::<_, ApiError>(join_all(details).await)
            })
            .await
    }

    pub async fn refresh(&mut self) -> Result<(), ViewError> {
        self.load().await
    }

    pub async fn delete(&mut self, id: ImportId) -> Result<(), ViewError> {
        let api = self.api.clone();
        self.action_in_flight = Some(id);
        let outcome = self.scope.run(api.delete_import(id)).await;
        self.action_in_flight = None;
        match outcome? {
            Ok(_) => self.load().await,
            Err(err) => {
                self.notice.error(err.user_message());
                Ok(())
            }
        }
    }

    pub async fn publish(&mut self, id: ImportId) -> Result<(), ViewError> {
        let api = self.api.clone();
        self.action_in_flight = Some(id);
        let outcome = self.scope.run(api.publish_to_geoserver(id)).await;
        self.action_in_flight = None;
        match outcome? {
            Ok(_) => self.load().await,
            Err(err) => {
                self.notice.error(err.user_message());
                Ok(())
            }
        }
    }

    pub fn open_details(&mut self, id: ImportId) -> Option<&Row> {
        self.details = self.rows.iter().any(|r| r.id() == id).then_some(id);
        self.details()
    }

    pub fn details(&self) -> Option<&Row> {
        let id = self.details?;
        self.rows.iter().find(|r| r.id() == id)
    }

    pub fn close_details(&mut self) {
        self.details = None;
    }

    pub fn map_route_for(&self, id: ImportId) -> Route {
        Route::Map { layer_id: Some(id) }
    }
}
