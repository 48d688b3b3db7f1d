//! Map view: base map plus, when the import is published, its WMS layer.

use std::sync::Arc;
use std::time::Duration;

use client::{GeoImporterApi, ImportId, ImportStatus};
use layers::{BaseMapConfig, LayerError, MapWidget, WmsOverlay, add_overlay, configure_base_map};
use tracing::{debug, info, warn};

use crate::error::ViewError;
use crate::notice::NoticeSlot;
use crate::scope::ViewScope;

pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const MAX_READY_POLLS: u32 = 50;

pub struct MapView<W: MapWidget> {
    api: Arc<dyn GeoImporterApi>,
    scope: ViewScope,
    widget: W,
    config: BaseMapConfig,
    layer: Option<ImportStatus>,
    overlay: Option<WmsOverlay>,
    pub notice: NoticeSlot,
}

impl<W: MapWidget> MapView<W> {
    pub fn new(api: Arc<dyn GeoImporterApi>, widget: W, config: BaseMapConfig) -> Self {
        Self {
            api,
            scope: ViewScope::new(),
            widget,
            config,
            layer: None,
            overlay: None,
            notice: NoticeSlot::default(),
        }
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    pub fn layer(&self) -> Option<&ImportStatus> {
        self.layer.as_ref()
    }

    pub fn overlay(&self) -> Option<&WmsOverlay> {
        self.overlay.as_ref()
    }

    async fn wait_until_ready(&self) -> Result<(), ViewError> {
        for _ in 0..MAX_READY_POLLS {
            if self.widget.is_ready() {
                return Ok(());
            }
            self.scope.run(tokio::time::sleep(READY_POLL_INTERVAL)).await?;
        }
        Err(LayerError::WidgetNotReady.into())
    }

    /// Sets up the base map, then overlays `layer_id` if it has both a WMS
    /// endpoint and a GeoServer layer name. A failed lookup leaves the base
    /// map in place and sets the notice.
    pub async fn open(&mut self, layer_id: Option<ImportId>) -> Result<(), ViewError> {
        self.wait_until_ready().await?;
        configure_base_map(&mut self.widget, &self.config)?;
        self.layer = None;
        self.overlay = None;

        let Some(id) = layer_id else {
            return Ok(());
        };

        let api = self.api.clone();
        let status = match self.scope.run(api.get_import_status(id)).await? {
            Ok(status) => status,
            Err(err) => {
                warn!(id, error = %err, "failed to load layer for map");
                self.notice.error(err.user_message());
                return Ok(());
            }
        };

        match WmsOverlay::from_parts(
            id,
            status.geoserver_wms_url.as_deref(),
            status.geoserver_layer.as_deref(),
        ) {
            Some(overlay) => {
                add_overlay(&mut self.widget, overlay.clone())?;
                info!(id, layer = %overlay.layer_name, "layer shown on map");
                self.overlay = Some(overlay);
            }
            None => debug!(id, "layer has no WMS endpoint, showing base map only"),
        }
        self.layer = Some(status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeApi, import, published};
    use layers::{ImageryLayer, RecordingWidget};
    use pretty_assertions::assert_eq;

    fn view(api: Arc<FakeApi>) -> MapView<RecordingWidget> {
        MapView::new(api, RecordingWidget::with_builtin_imagery(), BaseMapConfig::default())
    }

    #[tokio::test]
    async fn unpublished_layer_gets_base_map_only() {
        let api = Arc::new(FakeApi::with_imports(vec![import(1, "parcels")]));
        let mut map = view(api);

        map.open(Some(1)).await.unwrap();

        let layers = map.widget().imagery_layers();
        assert_eq!(layers.len(), 1);
        assert!(matches!(layers[0], ImageryLayer::Tiles(_)));
        assert_eq!(map.widget().overlay_count(), 0);
        assert!(map.overlay().is_none());
        assert_eq!(map.layer().map(|l| l.id), Some(1));
    }

    #[tokio::test]
    async fn published_layer_is_overlaid() {
        let api = Arc::new(FakeApi::with_imports(vec![published(2, "roads")]));
        let mut map = view(api);

        map.open(Some(2)).await.unwrap();

        assert_eq!(map.widget().overlay_count(), 1);
        let overlay = map.overlay().unwrap();
        assert_eq!(overlay.layer_name, "geoimporter:roads");
        assert_eq!(overlay.url, "http://gs.test/geoserver/wms");
    }

    #[tokio::test]
    async fn lookup_failure_keeps_base_map() {
        let api = Arc::new(FakeApi::default());
        let mut map = view(api);

        map.open(Some(404)).await.unwrap();

        assert_eq!(map.widget().imagery_layers().len(), 1);
        assert_eq!(map.notice.error_message(), Some("Import not found"));
    }

    #[tokio::test]
    async fn no_layer_id_skips_the_lookup() {
        let api = Arc::new(FakeApi::default());
        let mut map = view(api.clone());
        map.open(None).await.unwrap();
        assert!(api.calls().is_empty());
        assert_eq!(map.widget().imagery_layers().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn widget_that_never_mounts_times_out() {
        let mut widget = RecordingWidget::with_builtin_imagery();
        widget.ready = false;
        let mut map = MapView::new(Arc::new(FakeApi::default()), widget, BaseMapConfig::default());

        let err = map.open(None).await.unwrap_err();
        assert!(matches!(err, ViewError::Map(LayerError::WidgetNotReady)));
    }
}
