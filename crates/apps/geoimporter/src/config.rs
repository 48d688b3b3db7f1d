use std::env;
use std::path::PathBuf;

use client::ApiConfig;

pub const STATE_PATH_VAR: &str = "GEOIMPORTER_STATE_PATH";
pub const DISABLE_PERSIST_VAR: &str = "GEOIMPORTER_DISABLE_PERSIST";
pub const DEFAULT_STATE_PATH: &str = ".geoimporter/state.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub state_path: PathBuf,
    pub persist: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            state_path: env::var(STATE_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_PATH)),
            persist: !env_var_bool(DISABLE_PERSIST_VAR, false),
        }
    }
}

fn env_var_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| parse_bool(&v))
        .unwrap_or(default)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
