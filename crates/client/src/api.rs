//! REST client for the geoimporter backend.
//!
//! Each call issues exactly one request. There are no retries, no timeouts
//! beyond the transport's own, and no de-duplication of identical in-flight
//! requests.

use std::future::Future;
use std::pin::Pin;

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::dto::{
    DeleteResponse, GeoServerLayerList, GeoServerUserCreate, ImportId, ImportList, ImportStatus,
    MessageResponse, ShapefileArchive, UploadResponse,
};
use crate::error::ApiError;
use crate::urls::Endpoints;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Where an uploaded archive goes.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UploadMode {
    /// Import into the database only.
    #[default]
    Database,
    /// Import into the database and publish the table to GeoServer.
    DatabaseAndPublish,
    /// Hand the archive straight to the GeoServer importer.
    GeoServerImporter,
}

impl UploadMode {
    pub const ALL: [UploadMode; 3] = [
        UploadMode::Database,
        UploadMode::DatabaseAndPublish,
        UploadMode::GeoServerImporter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UploadMode::Database => "database",
            UploadMode::DatabaseAndPublish => "database-publish",
            UploadMode::GeoServerImporter => "geoserver-importer",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            UploadMode::Database => "Upload failed",
            UploadMode::DatabaseAndPublish => "Upload with GeoServer failed",
            UploadMode::GeoServerImporter => "Upload to GeoServer Importer failed",
        }
    }
}

impl std::str::FromStr for UploadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UploadMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown upload mode: {s}"))
    }
}

/// The backend operations views depend on.
///
/// Implementations must be `Send + Sync` for use across async tasks.
/// Methods return boxed futures for dyn-compatibility.
pub trait GeoImporterApi: Send + Sync {
    fn upload(
        &self,
        mode: UploadMode,
        archive: ShapefileArchive,
    ) -> BoxFuture<'_, Result<UploadResponse, ApiError>>;

    fn get_import_status(&self, id: ImportId) -> BoxFuture<'_, Result<ImportStatus, ApiError>>;

    /// Summaries only; use [`GeoImporterApi::get_import_status`] for details.
    fn list_imports(&self) -> BoxFuture<'_, Result<ImportList, ApiError>>;

    fn delete_import(&self, id: ImportId) -> BoxFuture<'_, Result<DeleteResponse, ApiError>>;

    fn publish_to_geoserver(&self, id: ImportId)
    -> BoxFuture<'_, Result<UploadResponse, ApiError>>;

    fn create_geoserver_user(
        &self,
        user: GeoServerUserCreate,
    ) -> BoxFuture<'_, Result<MessageResponse, ApiError>>;
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: &ApiConfig) -> Self {
        Self {
            http,
            endpoints: Endpoints::new(config),
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub async fn upload_shapefile(
        &self,
        archive: ShapefileArchive,
    ) -> Result<UploadResponse, ApiError> {
        self.upload_to(UploadMode::Database, archive).await
    }

    pub async fn upload_shapefile_with_geoserver(
        &self,
        archive: ShapefileArchive,
    ) -> Result<UploadResponse, ApiError> {
        self.upload_to(UploadMode::DatabaseAndPublish, archive).await
    }

    pub async fn upload_to_geoserver_importer(
        &self,
        archive: ShapefileArchive,
    ) -> Result<UploadResponse, ApiError> {
        self.upload_to(UploadMode::GeoServerImporter, archive).await
    }

    async fn upload_to(
        &self,
        mode: UploadMode,
        archive: ShapefileArchive,
    ) -> Result<UploadResponse, ApiError> {
        let url = match mode {
            UploadMode::Database => self.endpoints.upload(),
            UploadMode::DatabaseAndPublish => self.endpoints.upload_with_geoserver(),
            UploadMode::GeoServerImporter => self.endpoints.geoserver_import_upload(),
        };
        debug!(mode = mode.as_str(), file = %archive.file_name, bytes = archive.bytes.len(), "uploading shapefile");
        let part = Part::bytes(archive.bytes)
            .file_name(archive.file_name)
            .mime_str("application/zip")?;
        let form = Form::new().part("shapefile", part);
        let resp = self.http.post(&url).multipart(form).send().await?;
        read_json(resp, mode.failure_message()).await
    }

    pub async fn get_import_status(&self, id: ImportId) -> Result<ImportStatus, ApiError> {
        let resp = self.http.get(self.endpoints.status(id)).send().await?;
        read_json(resp, "Failed to get status").await
    }

    pub async fn list_imports(&self) -> Result<ImportList, ApiError> {
        let resp = self.http.get(self.endpoints.list()).send().await?;
        read_json(resp, "Failed to list imports").await
    }

    pub async fn delete_import(&self, id: ImportId) -> Result<DeleteResponse, ApiError> {
        let resp = self.http.delete(self.endpoints.import(id)).send().await?;
        read_json(resp, "Failed to delete import").await
    }

    pub async fn publish_to_geoserver(&self, id: ImportId) -> Result<UploadResponse, ApiError> {
        let resp = self.http.post(self.endpoints.publish(id)).send().await?;
        read_json(resp, "Failed to publish to GeoServer").await
    }

    pub async fn create_geoserver_user(
        &self,
        user: &GeoServerUserCreate,
    ) -> Result<MessageResponse, ApiError> {
        let resp = self
            .http
            .post(self.endpoints.geoserver_users())
            .json(user)
            .send()
            .await?;
        read_json(resp, "Failed to create user").await
    }

    pub async fn list_geoserver_layers(&self) -> Result<GeoServerLayerList, ApiError> {
        let resp = self.http.get(self.endpoints.geoserver_layers()).send().await?;
        read_json(resp, "Failed to list GeoServer layers").await
    }

    pub async fn get_geoserver_import_status(
        &self,
        id: ImportId,
    ) -> Result<serde_json::Value, ApiError> {
        let resp = self
            .http
            .get(self.endpoints.geoserver_import_status(id))
            .send()
            .await?;
        read_json(resp, "Failed to get GeoServer import status").await
    }

    pub async fn list_geoserver_imports(&self) -> Result<serde_json::Value, ApiError> {
        let resp = self
            .http
            .get(self.endpoints.geoserver_import_list())
            .send()
            .await?;
        read_json(resp, "Failed to list GeoServer imports").await
    }

    pub async fn delete_geoserver_import(&self, id: ImportId) -> Result<DeleteResponse, ApiError> {
        let resp = self
            .http
            .delete(self.endpoints.geoserver_import(id))
            .send()
            .await?;
        read_json(resp, "Failed to delete GeoServer import").await
    }

    pub async fn get_geoserver_layer_info(
        &self,
        layer_name: &str,
    ) -> Result<serde_json::Value, ApiError> {
        let resp = self
            .http
            .get(self.endpoints.geoserver_layer_info(layer_name))
            .send()
            .await?;
        read_json(resp, "Failed to get GeoServer layer info").await
    }
}

impl GeoImporterApi for HttpClient {
    fn upload(
        &self,
        mode: UploadMode,
        archive: ShapefileArchive,
    ) -> BoxFuture<'_, Result<UploadResponse, ApiError>> {
        Box::pin(self.upload_to(mode, archive))
    }

    fn get_import_status(&self, id: ImportId) -> BoxFuture<'_, Result<ImportStatus, ApiError>> {
        Box::pin(HttpClient::get_import_status(self, id))
    }

    fn list_imports(&self) -> BoxFuture<'_, Result<ImportList, ApiError>> {
        Box::pin(HttpClient::list_imports(self))
    }

    fn delete_import(&self, id: ImportId) -> BoxFuture<'_, Result<DeleteResponse, ApiError>> {
        Box::pin(HttpClient::delete_import(self, id))
    }

    fn publish_to_geoserver(
        &self,
        id: ImportId,
    ) -> BoxFuture<'_, Result<UploadResponse, ApiError>> {
        Box::pin(HttpClient::publish_to_geoserver(self, id))
    }

    fn create_geoserver_user(
        &self,
        user: GeoServerUserCreate,
    ) -> BoxFuture<'_, Result<MessageResponse, ApiError>> {
        Box::pin(async move { HttpClient::create_geoserver_user(self, &user).await })
    }
}

/// Turns a response into `T`, or into [`ApiError::Status`] carrying the
/// body's `error` field (or `fallback` when there is none).
pub(crate) async fn read_json<T: DeserializeOwned>(
    resp: reqwest::Response,
    fallback: &str,
) -> Result<T, ApiError> {
    let status = resp.status();
    let url = resp.url().clone();
    let bytes = resp.bytes().await?;

    if !status.is_success() {
        let message = error_field(&bytes).unwrap_or_else(|| fallback.to_string());
        warn!(%url, status = status.as_u16(), %message, "request failed");
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

fn error_field(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("error")
        .and_then(|e| e.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::ImportState;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpClient {
        HttpClient::new(&ApiConfig::new(format!("{}/api/", server.uri())))
    }

    fn zip() -> ShapefileArchive {
        ShapefileArchive::new("roads.zip", b"PK\x03\x04fake".to_vec())
    }

    #[tokio::test]
    async fn upload_posts_multipart_shapefile_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/geoimporter/upload/"))
            .and(header_exists("content-type"))
            .and(body_string_contains("name=\"shapefile\""))
            .and(body_string_contains("filename=\"roads.zip\""))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "success": true,
                "message": "imported",
                "import_id": 4,
                "table_name": "shp_roads_4"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resp = client_for(&server).upload_shapefile(zip()).await.unwrap();
        assert_eq!(resp.import_id, Some(4));
        assert_eq!(resp.table_name.as_deref(), Some("shp_roads_4"));
    }

    #[tokio::test]
    async fn each_upload_mode_hits_its_endpoint() {
        let server = MockServer::start().await;
        for p in [
            "/api/geoimporter/upload/",
            "/api/geoimporter/upload-with-geoserver/",
            "/api/geoimporter/geoserver-import/upload/",
        ] {
            Mock::given(method("POST"))
                .and(path(p))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(serde_json::json!({"success": true, "message": p})),
                )
                .expect(1)
                .mount(&server)
                .await;
        }

        let client = client_for(&server);
        for mode in UploadMode::ALL {
            GeoImporterApi::upload(&client, mode, zip()).await.unwrap();
        }
    }

    #[tokio::test]
    async fn error_field_becomes_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/geoimporter/upload/"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"error": "Missing .prj file"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).upload_shapefile(zip()).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing .prj file");
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn unparsable_error_body_uses_generic_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/geoimporter/status/3/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/geoimporter/import/3/"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"detail": "x"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get_import_status(3).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to get status");
        let err = client.delete_import(3).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to delete import");
    }

    #[tokio::test]
    async fn list_and_status_parse() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/geoimporter/list/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "imports": [
                    {"id": 1, "name": "a", "status": "success", "table_name": "t1", "created_at": "2024-01-01"},
                    {"id": 2, "name": "b", "status": "processing", "table_name": "t2", "created_at": "2024-01-02"}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/geoimporter/status/2/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 2, "name": "b", "status": "processing", "table_name": "t2",
                "created_at": "2024-01-02", "published_to_geoserver": false
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let list = client.list_imports().await.unwrap();
        assert_eq!(list.imports.len(), 2);
        assert_eq!(list.imports[1].status, ImportState::Processing);

        let status = client.get_import_status(2).await.unwrap();
        assert_eq!(status.table_name, "t2");
    }

    #[tokio::test]
    async fn publish_and_create_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/geoimporter/publish/7/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true, "message": "published"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/geoimporter/geoserver/users/"))
            .and(body_string_contains("\"username\":\"viewer\""))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({"message": "created"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.publish_to_geoserver(7).await.unwrap().success);

        let user = GeoServerUserCreate {
            username: "viewer".to_string(),
            password: "secret".to_string(),
            enabled: true,
        };
        let resp = GeoImporterApi::create_geoserver_user(&client, user).await.unwrap();
        assert_eq!(resp.message, "created");
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/geoimporter/list/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("nope"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_imports().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn geoserver_importer_calls_hit_their_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/geoimporter/geoserver/layers/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "layers": [{"name": "geoimporter:roads"}, {"name": "geoimporter:rivers"}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/geoimporter/geoserver-import/status/5/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": 5, "state": "COMPLETE"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/geoimporter/geoserver-import/list/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"imports": [{"id": 5}]})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/geoimporter/geoserver-import/5/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true, "message": "deleted"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/geoimporter/geoserver-import/layer-info/roads/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"name": "roads", "srs": "EPSG:4326"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.list_geoserver_layers().await.unwrap().layers.len(), 2);
        assert_eq!(client.get_geoserver_import_status(5).await.unwrap()["state"], "COMPLETE");
        assert_eq!(client.list_geoserver_imports().await.unwrap()["imports"][0]["id"], 5);
        assert!(client.delete_geoserver_import(5).await.unwrap().success);
        assert_eq!(client.get_geoserver_layer_info("roads").await.unwrap()["srs"], "EPSG:4326");
    }

    #[tokio::test]
    async fn geoserver_importer_failures_use_generic_messages() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let messages = [
            client.list_geoserver_layers().await.unwrap_err().to_string(),
            client.get_geoserver_import_status(1).await.unwrap_err().to_string(),
            client.list_geoserver_imports().await.unwrap_err().to_string(),
            client.delete_geoserver_import(1).await.unwrap_err().to_string(),
            client.get_geoserver_layer_info("x").await.unwrap_err().to_string(),
        ];
        assert_eq!(
            messages,
            [
                "Failed to list GeoServer layers",
                "Failed to get GeoServer import status",
                "Failed to list GeoServer imports",
                "Failed to delete GeoServer import",
                "Failed to get GeoServer layer info",
            ]
        );
    }

    #[test]
    fn upload_mode_round_trips_through_str() {
        for mode in UploadMode::ALL {
            assert_eq!(mode.as_str().parse::<UploadMode>().unwrap(), mode);
        }
        assert!("ftp".parse::<UploadMode>().is_err());
    }
}
