use crate::ConfigurationError;
use crate::tls::{RustlsEngine, TlsEngine, TlsSettings};
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ServerConfig};
use std::io;
use std::sync::Arc;

/// Creates one engine per connection.
pub trait TlsEngineFactory: Send + Sync {
    /// An engine for a client connecting to `server_name`.
    fn create_client_engine(&self, server_name: &str) -> io::Result<Box<dyn TlsEngine>>;

    /// An engine for a connection a server just accepted.
    fn create_server_engine(&self) -> io::Result<Box<dyn TlsEngine>>;
}

/// Default factory producing [`RustlsEngine`]s from prebuilt configs.
#[derive(Clone, Default)]
pub struct RustlsEngineFactory {
    client: Option<Arc<ClientConfig>>,
    server: Option<Arc<ServerConfig>>,
}

impl RustlsEngineFactory {
    pub fn for_client(config: Arc<ClientConfig>) -> Self {
        Self {
            client: Some(config),
            server: None,
        }
    }

    pub fn for_server(config: Arc<ServerConfig>) -> Self {
        Self {
            client: None,
            server: Some(config),
        }
    }

    pub fn client_from_settings(settings: &TlsSettings) -> Result<Self, ConfigurationError> {
        Ok(Self::for_client(settings.build_client_config()?))
    }

    pub fn server_from_settings(settings: &TlsSettings) -> Result<Self, ConfigurationError> {
        Ok(Self::for_server(settings.build_server_config()?))
    }
}

impl TlsEngineFactory for RustlsEngineFactory {
    fn create_client_engine(&self, server_name: &str) -> io::Result<Box<dyn TlsEngine>> {
        let config = self
            .client
            .clone()
            .ok_or_else(|| io::Error::other("no client TLS configuration"))?;
        let name = ServerName::try_from(server_name.to_owned())
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;

        Ok(Box::new(RustlsEngine::client(config, name)?))
    }

    fn create_server_engine(&self) -> io::Result<Box<dyn TlsEngine>> {
        let config = self
            .server
            .clone()
            .ok_or_else(|| io::Error::other("no server TLS configuration"))?;

        Ok(Box::new(RustlsEngine::server(config)?))
    }
}
