//! Typed client for the authentication sub-API.
//!
//! Successful session changes are written straight into the store: a login
//! carrying both token and user dispatches `login`, logout always dispatches
//! `logout`, a refresh dispatches the new token and a profile fetch replaces
//! the stored user.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use store::{Action, RootState, Store, User, action};
use tracing::{debug, info, warn};

use crate::api::read_json;
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::urls::Endpoints;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterPayload {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginResponse {
    pub token: Option<String>,
    pub user: Option<User>,
    pub success: bool,
    pub message: Option<String>,
}

impl LoginResponse {
    /// Accepts `{data: {data: {...}}}`, `{data: {...}}` or a flat body.
    pub fn from_value(response: &Value) -> Result<Self, ApiError> {
        let present = |v: &&Value| !v.is_null();
        let data = response.get("data").filter(present);
        let wrapped = data
            .and_then(|d| d.get("data"))
            .filter(present)
            .or(data)
            .unwrap_or(response);

        let token = wrapped
            .get("token")
            .and_then(|t| t.as_str())
            .map(|t| t.to_string());
        let user = match wrapped.get("user") {
            Some(Value::Null) | None => None,
            Some(raw) => Some(
                serde_json::from_value::<User>(raw.clone())
                    .map_err(|e| ApiError::Decode(format!("user: {e}")))?,
            ),
        };

        Ok(Self {
            token,
            user,
            success: response
                .get("success")
                .and_then(|s| s.as_bool())
                .unwrap_or(true),
            message: response
                .get("message")
                .and_then(|m| m.as_str())
                .map(|m| m.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    token: Option<String>,
    access: Option<String>,
}

pub struct AuthClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    store: Arc<Store<RootState>>,
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl AuthClient {
    pub fn new(config: &ApiConfig, store: Arc<Store<RootState>>) -> Self {
        Self::with_client(reqwest::Client::new(), config, store)
    }

    pub fn with_client(
        http: reqwest::Client,
        config: &ApiConfig,
        store: Arc<Store<RootState>>,
    ) -> Self {
        Self {
            http,
            endpoints: Endpoints::new(config),
            store,
        }
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.store.get_state().user.token.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn commit(&self, action: Action) {
        debug!(action = action.kind(), "session update");
        self.store.dispatch(action);
    }

    pub async fn login(&self, payload: &LoginPayload) -> Result<LoginResponse, ApiError> {
        let resp = self
            .authorized(self.http.post(self.endpoints.login()))
            .json(payload)
            .send()
            .await?;
        let body: Value = read_json(resp, "Login failed").await?;
        let login = LoginResponse::from_value(&body)?;

        match (&login.token, &login.user) {
            (Some(token), Some(user)) => {
                info!(username = %user.username, "logged in");
                self.commit(action::login(token.clone(), user.clone()));
            }
            _ => warn!("login response carried no session"),
        }
        Ok(login)
    }

    /// Clears the local session even if the server call fails.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let sent = self
            .authorized(self.http.post(self.endpoints.logout()))
            .send()
            .await;
        self.commit(action::logout());

        let resp = sent?;
        let _: Value = read_json(resp, "Logout failed").await.or_else(|err| match err {
            ApiError::Decode(_) => Ok(Value::Null),
            other => Err(other),
        })?;
        Ok(())
    }

    pub async fn register(&self, payload: &RegisterPayload) -> Result<LoginResponse, ApiError> {
        let resp = self
            .http
            .post(self.endpoints.register())
            .json(payload)
            .send()
            .await?;
        let body: Value = read_json(resp, "Registration failed").await?;
        LoginResponse::from_value(&body)
    }

    /// Exchanges the current token for a fresh one.
    pub async fn refresh(&self) -> Result<String, ApiError> {
        let resp = self
            .authorized(self.http.post(self.endpoints.refresh()))
            .send()
            .await?;
        let body: Value = read_json(resp, "Token refresh failed").await?;
        let wrapped = body.get("data").cloned().unwrap_or(body);
        let parsed: TokenBody =
            serde_json::from_value(wrapped).map_err(|e| ApiError::Decode(e.to_string()))?;
        let token = parsed
            .token
            .or(parsed.access)
            .ok_or_else(|| ApiError::Decode("refresh response carried no token".to_string()))?;
        self.commit(action::set_token(Some(token.clone())));
        Ok(token)
    }

    pub async fn profile(&self) -> Result<User, ApiError> {
        let resp = self
            .authorized(self.http.get(self.endpoints.profile()))
            .send()
            .await?;
        let body: Value = read_json(resp, "Failed to load profile").await?;
        let wrapped = body
            .get("data")
            .and_then(|d| d.get("user").or(Some(d)))
            .or_else(|| body.get("user"))
            .cloned()
            .unwrap_or(body);
        let user: User =
            serde_json::from_value(wrapped).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.commit(action::update_user_profile(user.clone()));
        Ok(user)
    }
}
