use std::net::SocketAddr;
use std::path::PathBuf;

use url::Url;

/// Default port the gateway and API listen on.
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// address the gateway and API listen on
    pub listen_addr: SocketAddr,

    // data store configuration
    /// a path to a sqlite database, if not set then an
    ///  in-memory database will be used
    pub sqlite_path: Option<PathBuf>,

    // logging
    pub log_level: tracing::Level,

    // url configuration
    /// Public gateway URL (e.g., "https://shadow.example.com")
    /// Used to turn shadow URLs into full download links
    pub gateway_url: Option<Url>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            sqlite_path: None,
            log_level: tracing::Level::INFO,
            gateway_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.listen_addr.to_string(), "0.0.0.0:3000");
        assert!(config.sqlite_path.is_none());
        assert_eq!(config.log_level, tracing::Level::INFO);
        assert!(config.gateway_url.is_none());
    }
}
