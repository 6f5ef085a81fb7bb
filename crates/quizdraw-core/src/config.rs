//! Session configuration.

use url::Url;

use crate::error::ConnectionError;

/// Server URL used when nothing else is configured.
pub const DEFAULT_SERVER_URL: &str = "ws://localhost:3001/ws";

/// Environment variable overriding the server URL.
pub const SERVER_URL_ENV: &str = "QUIZDRAW_SERVER_URL";

/// Configuration for a [`crate::Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// WebSocket endpoint of the game server (`ws://` or `wss://`).
    pub server_url: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

impl SessionConfig {
    /// Build a config for an explicit server, normalizing the URL.
    pub fn with_server(server: &str) -> Result<Self, ConnectionError> {
        let server_url = normalize_server_url(server);
        validate_server_url(&server_url)?;
        Ok(Self { server_url })
    }

    /// Read the server URL from `QUIZDRAW_SERVER_URL`, falling back to the default.
    pub fn from_env() -> Result<Self, ConnectionError> {
        match std::env::var(SERVER_URL_ENV) {
            Ok(server) if !server.trim().is_empty() => Self::with_server(&server),
            _ => Ok(Self::default()),
        }
    }

    /// Derive the server URL from a page origin (`http` becomes `ws`,
    /// `https` becomes `wss`).
    pub fn from_origin(origin: &str) -> Result<Self, ConnectionError> {
        let origin = origin.trim().trim_end_matches('/');
        let server = if let Some(rest) = origin.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = origin.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            origin.to_string()
        };
        Self::with_server(&server)
    }

    /// Derive the config from the current browser location.
    #[cfg(target_arch = "wasm32")]
    pub fn from_window() -> Result<Self, ConnectionError> {
        let origin = web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .ok_or_else(|| ConnectionError::InvalidUrl("no window origin".to_string()))?;
        Self::from_origin(&origin)
    }
}

/// Turn `host:port`, `ws://host` or `ws://host/ws` into a full `/ws` endpoint.
pub fn normalize_server_url(server: &str) -> String {
    let server = server.trim();
    if server.starts_with("ws://") || server.starts_with("wss://") {
        if server.ends_with("/ws") {
            server.to_string()
        } else {
            format!("{}/ws", server.trim_end_matches('/'))
        }
    } else {
        format!("ws://{}/ws", server.trim_end_matches('/'))
    }
}

/// Check that `url` parses and uses a WebSocket scheme.
pub fn validate_server_url(url: &str) -> Result<Url, ConnectionError> {
    let parsed = Url::parse(url).map_err(|e| ConnectionError::InvalidUrl(format!("{}: {}", url, e)))?;
    if parsed.scheme() != "ws" && parsed.scheme() != "wss" {
        return Err(ConnectionError::InvalidUrl(format!(
            "unsupported scheme: {}",
            parsed.scheme()
        )));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SessionConfig::default();
        assert!(validate_server_url(&config.server_url).is_ok());
    }

    #[test]
    fn test_normalize_server_url() {
        assert_eq!(normalize_server_url("localhost:3001"), "ws://localhost:3001/ws");
        assert_eq!(normalize_server_url("ws://example.com/"), "ws://example.com/ws");
        assert_eq!(normalize_server_url("wss://example.com/ws"), "wss://example.com/ws");
    }

    #[test]
    fn test_from_origin() {
        let config = SessionConfig::from_origin("https://quiz.example.com").unwrap();
        assert_eq!(config.server_url, "wss://quiz.example.com/ws");

        let config = SessionConfig::from_origin("http://localhost:5173/").unwrap();
        assert_eq!(config.server_url, "ws://localhost:5173/ws");
    }

    #[test]
    fn test_rejects_non_websocket_scheme() {
        assert!(matches!(
            validate_server_url("http://localhost:3001"),
            Err(ConnectionError::InvalidUrl(_))
        ));
        assert!(validate_server_url("not a url").is_err());
    }
}
