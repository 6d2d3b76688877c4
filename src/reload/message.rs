//! LiveReload Message Protocol
//!
//! JSON messages exchanged with browser clients over WebSocket, compatible
//! with the LiveReload protocol (official-7).
//!
//! # Message Types
//!
//! - `hello`: handshake, sent by both sides
//! - `reload`: reload a path (`/` reloads the whole page)
//! - `alert`: show a message to the user
//! - `info`: client → server, current page URL

use serde::{Deserialize, Serialize};

/// Protocols this server speaks.
pub const PROTOCOLS: &[&str] = &["http://livereload.com/protocols/official-7"];

/// Server name announced in the hello reply.
pub const SERVER_NAME: &str = "freshet";

/// LiveReload message sent over WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum LiveReloadMessage {
    Hello {
        #[serde(default)]
        protocols: Vec<String>,
        #[serde(
            rename = "serverName",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        server_name: Option<String>,
    },

    Reload {
        path: String,
        #[serde(rename = "liveCSS", default)]
        live_css: bool,
    },

    Alert {
        message: String,
    },

    Info {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

impl LiveReloadMessage {
    /// The server's hello reply.
    pub fn hello() -> Self {
        Self::Hello {
            protocols: PROTOCOLS.iter().map(|p| (*p).to_string()).collect(),
            server_name: Some(SERVER_NAME.to_string()),
        }
    }

    pub fn reload(path: impl Into<String>) -> Self {
        Self::Reload {
            path: path.into(),
            live_css: true,
        }
    }

    pub fn alert(message: impl Into<String>) -> Self {
        Self::Alert {
            message: message.into(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse a client message; `None` for unknown commands or bad JSON.
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_json() {
        assert_eq!(
            LiveReloadMessage::reload("/").to_json(),
            r#"{"command":"reload","path":"/","liveCSS":true}"#
        );
    }

    #[test]
    fn test_alert_json() {
        assert_eq!(
            LiveReloadMessage::alert("build failed").to_json(),
            r#"{"command":"alert","message":"build failed"}"#
        );
    }

    #[test]
    fn test_hello_json() {
        assert_eq!(
            LiveReloadMessage::hello().to_json(),
            r#"{"command":"hello","protocols":["http://livereload.com/protocols/official-7"],"serverName":"freshet"}"#
        );
    }

    #[test]
    fn test_parse_client_hello() {
        let msg = LiveReloadMessage::parse(
            r#"{"command":"hello","protocols":["http://livereload.com/protocols/official-7","http://livereload.com/protocols/2.x-remote-control"]}"#,
        );
        assert!(matches!(msg, Some(LiveReloadMessage::Hello { server_name: None, .. })));
    }

    #[test]
    fn test_parse_info_with_extra_fields() {
        let msg = LiveReloadMessage::parse(
            r#"{"command":"info","url":"http://localhost:8080/","plugins":{}}"#,
        );
        assert_eq!(
            msg,
            Some(LiveReloadMessage::Info {
                url: Some("http://localhost:8080/".into())
            })
        );
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(LiveReloadMessage::parse(r#"{"command":"ping"}"#), None);
        assert_eq!(LiveReloadMessage::parse("not json"), None);
    }
}
