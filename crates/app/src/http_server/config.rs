use std::net::SocketAddr;

use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    // Listen address
    pub listen_addr: SocketAddr,
    // Base URL redirects are built against
    pub hostname: Url,
    // log level for http tracing
    pub log_level: tracing::Level,
}

impl Config {
    pub fn new(listen_addr: SocketAddr) -> Result<Self, ConfigError> {
        let hostname = Url::parse(&format!("http://localhost:{}", listen_addr.port()))?;
        tracing::info!("Creating HTTP server Config: listen_addr={}", listen_addr);
        Ok(Self {
            listen_addr,
            hostname,
            log_level: tracing::Level::INFO,
        })
    }

    pub fn with_log_level(mut self, log_level: tracing::Level) -> Self {
        self.log_level = log_level;
        self
    }

    /// Listen on all interfaces at `port`
    pub fn from_port(port: u16) -> Result<Self, ConfigError> {
        let listen_addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;
        Self::new(listen_addr)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Invalid Socket Address: {0}")]
    ListenAddr(#[from] std::net::AddrParseError),
}
