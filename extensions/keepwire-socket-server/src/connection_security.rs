use keepwire::ConfigurationError;
use keepwire::tls::{RustlsEngineFactory, TlsEngineFactory, TlsSettings};
use keepwire::transport::{Channel, TcpChannel, TlsChannel};
use std::fmt;
use std::io;
use std::net::TcpStream;
use std::sync::Arc;

/// How accepted sockets are turned into channels.
#[derive(Clone, Default)]
pub enum ConnectionSecurity {
    #[default]
    Plain,
    /// Every accepted socket runs a server-side TLS handshake with an engine
    /// from this factory.
    Tls(Arc<dyn TlsEngineFactory>),
}

impl ConnectionSecurity {
    /// TLS backed by the default rustls engine built from `settings`.
    pub fn tls(settings: &TlsSettings) -> Result<Self, ConfigurationError> {
        let factory = RustlsEngineFactory::server_from_settings(settings)?;
        Ok(ConnectionSecurity::Tls(Arc::new(factory)))
    }

    pub fn is_tls(&self) -> bool {
        matches!(self, ConnectionSecurity::Tls(_))
    }

    pub(crate) fn open(&self, stream: TcpStream, buffer_size: usize) -> io::Result<Box<dyn Channel>> {
        match self {
            ConnectionSecurity::Plain => Ok(Box::new(TcpChannel::new(stream, buffer_size)?)),
            ConnectionSecurity::Tls(factory) => {
                let engine = factory.create_server_engine()?;
                Ok(Box::new(TlsChannel::establish(stream, engine, buffer_size)?))
            }
        }
    }
}

impl fmt::Debug for ConnectionSecurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionSecurity::Plain => f.write_str("Plain"),
            ConnectionSecurity::Tls(_) => f.write_str("Tls"),
        }
    }
}
