use keepwire::ConfigurationError;
use keepwire::constants::DEFAULT_BUFFER_SIZE;
use keepwire::tls::{RustlsEngineFactory, TlsEngineFactory, TlsSettings};
use socket2::SockRef;
use std::fmt;
use std::io;
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

/// Where a [`SocketClient`](crate::SocketClient) connects and how each call
/// is flagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Host name or textual IP of the service. Resolved on connect.
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Ask the server to keep the connection for the next call. Also turns
    /// on TCP keep-alive for the socket.
    pub keep_alive: bool,
    /// Attach this thread's cookie to every call frame.
    pub send_cookies: bool,
    /// Adopt the cookie returned with every return frame.
    pub accept_cookies: bool,
    /// Bounds every round trip, TLS handshake included. `None` waits forever.
    pub call_timeout: Option<Duration>,
    pub buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            keep_alive: true,
            send_cookies: false,
            accept_cookies: false,
            call_timeout: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ClientConfig {
    pub fn for_service(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: Some(host.into()),
            port: Some(port),
            ..Self::default()
        }
    }

    /// Applies the socket options this config implies to a freshly
    /// connected stream.
    pub fn configure_socket(&self, stream: &TcpStream) -> io::Result<()> {
        SockRef::from(stream).set_keepalive(self.keep_alive)?;
        if let Some(timeout) = self.call_timeout {
            stream.set_read_timeout(Some(timeout))?;
            stream.set_write_timeout(Some(timeout))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.buffer_size < 1 {
            return Err(ConfigurationError::InvalidPoolSize {
                name: "buffer_size",
                value: self.buffer_size,
            });
        }
        if self.call_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(ConfigurationError::InvalidTimeout {
                name: "call_timeout",
            });
        }
        Ok(())
    }
}

/// How a client secures the connections it opens.
#[derive(Clone, Default)]
pub enum ClientSecurity {
    #[default]
    Plain,
    Tls {
        factory: Arc<dyn TlsEngineFactory>,
        /// Name the server certificate is verified against. Defaults to the
        /// configured host.
        server_name: Option<String>,
    },
}

impl ClientSecurity {
    /// TLS backed by the default rustls engine built from `settings`.
    pub fn tls(settings: &TlsSettings) -> Result<Self, ConfigurationError> {
        Ok(ClientSecurity::Tls {
            factory: Arc::new(RustlsEngineFactory::client_from_settings(settings)?),
            server_name: settings.server_name.clone(),
        })
    }

    pub fn is_tls(&self) -> bool {
        matches!(self, ClientSecurity::Tls { .. })
    }
}

impl fmt::Debug for ClientSecurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientSecurity::Plain => f.write_str("Plain"),
            ClientSecurity::Tls { server_name, .. } => f
                .debug_struct("Tls")
                .field("server_name", server_name)
                .finish_non_exhaustive(),
        }
    }
}
