use std::net::SocketAddr;
use std::time::Duration;

/// Runtime configuration, assembled once at startup. The auth token is read
/// from the environment here and nowhere else, so the downloader itself can
/// be constructed with injected values in tests.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen: SocketAddr,
    pub scdl_timeout: Duration,
    pub auth_token: Option<String>,
}

impl Config {
    pub fn new(listen: SocketAddr, timeout_secs: u64) -> Self {
        Self {
            listen,
            scdl_timeout: Duration::from_secs(timeout_secs),
            auth_token: read_auth_token(),
        }
    }
}

fn read_auth_token() -> Option<String> {
    std::env::var("SCDL_AUTH_TOKEN")
        .ok()
        .filter(|token| !token.is_empty())
}
