//! HTTP surface settings for the meter: bind address, CORS and static root.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Directory served for non-API paths when none is given.
pub const DEFAULT_STATIC_ROOT: &str = ".";

/// Where the meter's API listens and what it serves besides the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Bind host, all interfaces by default so the meter is reachable on the LAN
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Send `Access-Control-Allow-Origin: *` on every response
    pub enable_cors: bool,
    /// Root for every non-API path; `None` serves only the built-in dashboard at `/`
    pub static_path: Option<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: crate::DEFAULT_WEB_PORT,
            enable_cors: true,
            static_path: Some(DEFAULT_STATIC_ROOT.to_string()),
        }
    }
}

impl WebConfig {
    /// Listen on `host:port`, keeping the default CORS and static root.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Turn the wildcard CORS header on or off.
    pub fn with_cors(mut self, enable_cors: bool) -> Self {
        self.enable_cors = enable_cors;
        self
    }

    /// Replace the static root. `None` disables file serving.
    pub fn with_static_path(mut self, path: Option<String>) -> Self {
        self.static_path = path;
        self
    }

    /// The static root as a path, if file serving is enabled.
    pub fn static_root(&self) -> Option<&Path> {
        self.static_path.as_deref().map(Path::new)
    }

    /// `host:port` string handed to the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WebConfig::default();
        assert_eq!(config.port, 8080);
        assert!(config.enable_cors);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_static_root_defaults_to_working_directory() {
        let config = WebConfig::default();
        assert_eq!(config.static_path.as_deref(), Some("."));
        assert_eq!(config.static_root(), Some(Path::new(".")));

        let config = WebConfig::new("127.0.0.1", 9000);
        assert_eq!(config.static_root(), Some(Path::new(DEFAULT_STATIC_ROOT)));
    }

    #[test]
    fn test_static_serving_disabled() {
        let config = WebConfig::default().with_static_path(None);
        assert!(config.static_root().is_none());
    }
}
