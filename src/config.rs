//! Server configuration loaded from environment variables

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_TEST_PAGE_PATH: &str = "static/test.html";
pub const DEFAULT_LOG_FILTER: &str = "a_tree_server=debug,tower_http=debug";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// HTML page served at `/test`
    pub test_page_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            test_page_path: PathBuf::from(DEFAULT_TEST_PAGE_PATH),
        }
    }
}

impl ServerConfig {
    /// Load config from environment variables.
    /// HOST, PORT and TEST_PAGE_PATH are all optional.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = match std::env::var("HOST") {
            Ok(v) => v.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %v, "Invalid HOST, using {}", defaults.host);
                defaults.host
            }),
            Err(_) => defaults.host,
        };

        let port = match std::env::var("PORT") {
            Ok(v) => v.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %v, "Invalid PORT, using {}", defaults.port);
                defaults.port
            }),
            Err(_) => defaults.port,
        };

        let test_page_path = std::env::var("TEST_PAGE_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.test_page_path);

        tracing::info!(
            %host,
            port,
            test_page = %test_page_path.display(),
            "Server config loaded"
        );

        Self {
            host,
            port,
            test_page_path,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
