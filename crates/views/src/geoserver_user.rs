use std::sync::Arc;

use client::{GeoImporterApi, GeoServerUserCreate};
use tracing::info;

use crate::error::ViewError;
use crate::notice::NoticeSlot;
use crate::scope::ViewScope;

/// Form for creating a GeoServer account.
pub struct GeoServerUserView {
    api: Arc<dyn GeoImporterApi>,
    scope: ViewScope,
    form: GeoServerUserCreate,
    submitting: bool,
    pub notice: NoticeSlot,
}

impl GeoServerUserView {
    pub fn new(api: Arc<dyn GeoImporterApi>) -> Self {
        Self {
            api,
            scope: ViewScope::new(),
            form: GeoServerUserCreate::default(),
            submitting: false,
            notice: NoticeSlot::default(),
        }
    }

    pub fn form(&self) -> &GeoServerUserCreate {
        &self.form
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.form.username = username.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.form.password = password.into();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.form.enabled = enabled;
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Resets the form on success; on failure the form is kept for editing.
    pub async fn submit(&mut self) -> Result<(), ViewError> {
        self.notice.dismiss();
        self.submitting = true;
        let api = self.api.clone();
        let outcome = self
            .scope
            .run(api.create_geoserver_user(self.form.clone()))
            .await;
        self.submitting = false;
        match outcome? {
            Ok(resp) => {
                info!(username = %self.form.username, "GeoServer user created");
                self.notice.success(resp.message);
                self.form = GeoServerUserCreate::default();
            }
            Err(err) => self.notice.error(err.user_message()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeApi;
    use crate::notice::Severity;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn success_resets_form() {
        let mut view = GeoServerUserView::new(Arc::new(FakeApi::default()));
        view.set_username("editor");
        view.set_password("s3cret");
        view.set_enabled(false);

        view.submit().await.unwrap();

        let notice = view.notice.current().unwrap();
        assert_eq!(notice.severity, Severity::Success);
        assert_eq!(notice.message, "User editor created");
        assert_eq!(view.form(), &GeoServerUserCreate::default());
        assert!(view.form().enabled);
    }

    #[tokio::test]
    async fn failure_keeps_form() {
        let mut view = GeoServerUserView::new(Arc::new(FakeApi::default()));
        view.set_username("editor");

        view.submit().await.unwrap();

        assert_eq!(view.notice.error_message(), Some("Username and password required"));
        assert_eq!(view.form().username, "editor");
        assert!(!view.is_submitting());
    }
}
