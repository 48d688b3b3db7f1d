use crate::config::ApiConfig;
use crate::dto::ImportId;

/// Absolute endpoint URLs under the configured API base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            base: config.base_url.clone(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn geoimporter(&self, path: &str) -> String {
        format!("{}geoimporter/{}", self.base, path)
    }

    fn auth(&self, path: &str) -> String {
        format!("{}auth/{}", self.base, path)
    }

    pub fn upload(&self) -> String {
        self.geoimporter("upload/")
    }

    pub fn upload_with_geoserver(&self) -> String {
        self.geoimporter("upload-with-geoserver/")
    }

    pub fn geoserver_import_upload(&self) -> String {
        self.geoimporter("geoserver-import/upload/")
    }

    pub fn status(&self, id: ImportId) -> String {
        self.geoimporter(&format!("status/{id}/"))
    }

    pub fn list(&self) -> String {
        self.geoimporter("list/")
    }

    pub fn import(&self, id: ImportId) -> String {
        self.geoimporter(&format!("import/{id}/"))
    }

    pub fn publish(&self, id: ImportId) -> String {
        self.geoimporter(&format!("publish/{id}/"))
    }

    pub fn geoserver_users(&self) -> String {
        self.geoimporter("geoserver/users/")
    }

    pub fn geoserver_layers(&self) -> String {
        self.geoimporter("geoserver/layers/")
    }

    pub fn geoserver_import_status(&self, id: ImportId) -> String {
        self.geoimporter(&format!("geoserver-import/status/{id}/"))
    }

    pub fn geoserver_import_list(&self) -> String {
        self.geoimporter("geoserver-import/list/")
    }

    pub fn geoserver_import(&self, id: ImportId) -> String {
        self.geoimporter(&format!("geoserver-import/{id}/"))
    }

    pub fn geoserver_layer_info(&self, layer_name: &str) -> String {
        self.geoimporter(&format!("geoserver-import/layer-info/{layer_name}/"))
    }

    pub fn login(&self) -> String {
        self.auth("login/")
    }

    pub fn logout(&self) -> String {
        self.auth("logout/")
    }

    pub fn register(&self) -> String {
        self.auth("register/")
    }

    pub fn refresh(&self) -> String {
        self.auth("refresh/")
    }

    pub fn profile(&self) -> String {
        self.auth("profile/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_hang_off_the_base() {
        let e = Endpoints::new(&ApiConfig::new("http://api.test/api"));
        assert_eq!(e.upload(), "http://api.test/api/geoimporter/upload/");
        assert_eq!(e.status(9), "http://api.test/api/geoimporter/status/9/");
        assert_eq!(e.import(9), "http://api.test/api/geoimporter/import/9/");
        assert_eq!(e.publish(2), "http://api.test/api/geoimporter/publish/2/");
        assert_eq!(
            e.geoserver_layer_info("geo:roads"),
            "http://api.test/api/geoimporter/geoserver-import/layer-info/geo:roads/"
        );
        assert_eq!(e.login(), "http://api.test/api/auth/login/");
        assert_eq!(e.profile(), "http://api.test/api/auth/profile/");
    }
}
