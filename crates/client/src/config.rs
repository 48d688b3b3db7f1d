use std::env;

pub const API_BASE_URL_VAR: &str = "GEOIMPORTER_API_BASE_URL";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Always ends with `/`.
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
        }
    }

    /// Reads `GEOIMPORTER_API_BASE_URL`, falling back to the local dev origin.
    pub fn from_env() -> Self {
        let base = env::var(API_BASE_URL_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        Self::new(base)
    }
}

fn normalize_base_url(mut base: String) -> String {
    let trimmed_len = base.trim_end().len();
    base.truncate(trimmed_len);
    if !base.ends_with('/') {
        base.push('/');
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        assert_eq!(ApiConfig::new("http://h:1/api").base_url, "http://h:1/api/");
        assert_eq!(ApiConfig::new("http://h:1/api/").base_url, "http://h:1/api/");
        assert_eq!(ApiConfig::default().base_url, DEFAULT_API_BASE_URL);
    }
}
