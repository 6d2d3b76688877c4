//! `[reload]` and `[log]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [reload]
//! enable = true               # Serve the LiveReload endpoint
//! interface = "127.0.0.1"     # Network interface
//! port = 35729                # LiveReload's well-known port
//!
//! [log]
//! verbose = false
//! ```
//!
//! Pages opt in by including `<script src="http://localhost:35729/livereload.js"></script>`.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

/// Default LiveReload port.
pub const DEFAULT_RELOAD_PORT: u16 = 35729;

/// Browser reload settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReloadConfig {
    /// Enable the reload server.
    pub enable: bool,

    /// Network interface to bind.
    pub interface: IpAddr,

    /// Port to listen on (the next free port is used if taken).
    pub port: u16,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            enable: true,
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: DEFAULT_RELOAD_PORT,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Show debug output.
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_reload_defaults() {
        let config = test_parse_config("");
        assert!(config.reload.enable);
        assert_eq!(config.reload.port, 35729);
        assert_eq!(
            config.reload.interface,
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
        );
        assert!(!config.log.verbose);
    }

    #[test]
    fn test_reload_override() {
        let config =
            test_parse_config("[reload]\nenable = false\nport = 40000\n[log]\nverbose = true");
        assert!(!config.reload.enable);
        assert_eq!(config.reload.port, 40000);
        assert!(config.log.verbose);
    }
}
