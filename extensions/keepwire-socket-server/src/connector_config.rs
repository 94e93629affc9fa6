use keepwire::ConfigurationError;
use keepwire::constants::{
    DEFAULT_BUFFER_SIZE, DEFAULT_CORE_THREADS, DEFAULT_MAX_THREADS, DEFAULT_STOP_TIMEOUT,
};
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::time::Duration;

/// Settings a [`SocketConnector`](crate::SocketConnector) is started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorConfig {
    /// Address the listening socket binds to. Required.
    pub bind_address: Option<IpAddr>,
    /// Port to listen on; `0` lets the OS pick one. Required.
    pub port: Option<u16>,
    /// Workers started with the connector.
    pub core_threads: usize,
    /// Upper bound for lazy pool growth.
    pub max_threads: usize,
    /// How long `stop()` waits for workers before closing the listener.
    pub stop_timeout: Duration,
    /// Capacity of the per-connection plaintext windows.
    pub buffer_size: usize,
    /// Closes connections that stay silent this long. `None` waits forever.
    pub idle_timeout: Option<Duration>,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            bind_address: None,
            port: None,
            core_threads: DEFAULT_CORE_THREADS,
            max_threads: DEFAULT_MAX_THREADS,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            buffer_size: DEFAULT_BUFFER_SIZE,
            idle_timeout: None,
        }
    }
}

impl ConnectorConfig {
    /// A config listening on `bind_address:port` with default pool settings.
    pub fn bound_to(bind_address: IpAddr, port: u16) -> Self {
        Self {
            bind_address: Some(bind_address),
            port: Some(port),
            ..Self::default()
        }
    }

    /// Checks the values a setter would reject.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        validate_pool_size("core_threads", self.core_threads)?;
        validate_pool_size("max_threads", self.max_threads)?;
        validate_pool_size("buffer_size", self.buffer_size)?;
        validate_idle_timeout(self.idle_timeout)
    }

    /// The socket address to bind, once both parts are configured.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigurationError> {
        let ip = self
            .bind_address
            .ok_or(ConfigurationError::MissingBindAddress)?;
        let port = self.port.ok_or(ConfigurationError::MissingPort)?;
        Ok(SocketAddr::new(ip, port))
    }
}

pub(crate) fn validate_pool_size(name: &'static str, value: usize) -> Result<(), ConfigurationError> {
    if value < 1 {
        return Err(ConfigurationError::InvalidPoolSize { name, value });
    }
    Ok(())
}

pub(crate) fn validate_idle_timeout(timeout: Option<Duration>) -> Result<(), ConfigurationError> {
    match timeout {
        Some(timeout) if timeout.is_zero() => Err(ConfigurationError::InvalidTimeout {
            name: "idle_timeout",
        }),
        _ => Ok(()),
    }
}

/// Resolves a host name or textual IP to the first address it maps to.
pub fn resolve_host(host: &str) -> Result<IpAddr, ConfigurationError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    (host, 0)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| addr.ip())
        .ok_or_else(|| ConfigurationError::UnresolvableAddress(host.to_owned()))
}
