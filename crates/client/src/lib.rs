pub mod api;
pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod urls;

pub use api::{BoxFuture, GeoImporterApi, HttpClient, UploadMode};
pub use auth::{AuthClient, LoginPayload, LoginResponse, RegisterPayload};
pub use config::ApiConfig;
pub use dto::*;
pub use error::ApiError;
pub use urls::Endpoints;
