//! Gateway runtime settings sourced from the environment.

use std::{env, net::SocketAddr};

use anyhow::{Context, Result};

const API_KEY_VAR: &str = "BACKLOG_API_KEY";
const API_URL_VAR: &str = "BACKLOG_API_URL";
const BIND_VAR: &str = "BACKLOG_GATEWAY_BIND";

/// Settings the gateway needs to run.
///
/// Missing upstream credentials are not a startup error. The gateway still
/// serves requests and answers each one with a misconfiguration response,
/// which keeps a bad deployment visible instead of crash-looping.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    api_key: Option<String>,
    api_url: Option<String>,
    /// Local socket address to listen on.
    pub bind: SocketAddr,
}

impl GatewayConfig {
    /// Assemble a config from explicit values.
    pub fn new(api_key: Option<String>, api_url: Option<String>, bind: SocketAddr) -> Self {
        Self {
            api_key: non_empty(api_key),
            api_url: non_empty(api_url),
            bind,
        }
    }

    /// Read settings from `BACKLOG_API_KEY`, `BACKLOG_API_URL` and
    /// `BACKLOG_GATEWAY_BIND`.
    pub fn from_env() -> Result<Self> {
        let bind = match env::var(BIND_VAR) {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("invalid {BIND_VAR} value {raw}"))?,
            Err(_) => SocketAddr::from(([127, 0, 0, 1], 3000)),
        };
        Ok(Self::new(
            env::var(API_KEY_VAR).ok(),
            env::var(API_URL_VAR).ok(),
            bind,
        ))
    }

    /// Both upstream credentials, when fully configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.api_key, &self.api_url) {
            (Some(key), Some(url)) => Some((key.as_str(), url.as_str())),
            _ => None,
        }
    }

    /// Whether the upstream API key is set.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Whether the upstream base URL is set.
    pub fn has_api_url(&self) -> bool {
        self.api_url.is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 3000))
    }

    #[test]
    fn credentials_require_both_values() {
        let full = GatewayConfig::new(Some("key".into()), Some("https://api".into()), bind());
        assert_eq!(full.credentials(), Some(("key", "https://api")));

        let missing_url = GatewayConfig::new(Some("key".into()), None, bind());
        assert_eq!(missing_url.credentials(), None);
        assert!(missing_url.has_api_key());
        assert!(!missing_url.has_api_url());
    }

    #[test]
    fn empty_strings_count_as_unset() {
        let config = GatewayConfig::new(Some(String::new()), Some("https://api".into()), bind());
        assert!(!config.has_api_key());
        assert_eq!(config.credentials(), None);
    }
}
