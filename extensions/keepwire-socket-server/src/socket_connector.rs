//! A blocking listener that hands each accepted connection to its own worker
//! thread. Workers are started lazily: the pool begins with `core_threads`
//! and adds one whenever all of them are busy, up to `max_threads`.
//!
//! Note: like the session layer underneath, the connector carries no
//! authentication. Use the TLS variant with client certificates when peers
//! are not trusted.

use crate::connector_config::{validate_idle_timeout, validate_pool_size};
use crate::worker_pool::{ServeContext, WorkerPool};
use crate::{ConnectionSecurity, ConnectorConfig, ConnectorError, resolve_host};
use keepwire::ConfigurationError;
use keepwire::frame::FrameCodecs;
use keepwire::session::CallHandler;
use keepwire::tls::{TlsEngineFactory, TlsSettings};
use std::net::{IpAddr, SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;

/// Serves the session protocol on a listening socket.
pub struct SocketConnector {
    config: ConnectorConfig,
    security: ConnectionSecurity,
    codecs: FrameCodecs,
    handler: Option<Arc<dyn CallHandler>>,
    pool: Option<Arc<WorkerPool>>,
}

impl Default for SocketConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl SocketConnector {
    /// A plain TCP connector with default pool settings.
    pub fn new() -> Self {
        Self::with_security(ConnectionSecurity::Plain)
    }

    /// A TLS connector using the default rustls engine.
    pub fn tls(settings: &TlsSettings) -> Result<Self, ConfigurationError> {
        Ok(Self::with_security(ConnectionSecurity::tls(settings)?))
    }

    /// A TLS connector creating its engines with `factory`.
    pub fn with_tls_factory(factory: Arc<dyn TlsEngineFactory>) -> Self {
        Self::with_security(ConnectionSecurity::Tls(factory))
    }

    pub fn with_security(security: ConnectionSecurity) -> Self {
        Self {
            config: ConnectorConfig::default(),
            security,
            codecs: FrameCodecs::default(),
            handler: None,
            pool: None,
        }
    }

    /// Replaces the whole configuration after validating it.
    pub fn with_config(mut self, config: ConnectorConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    pub fn security(&self) -> &ConnectionSecurity {
        &self.security
    }

    pub fn handler(&self) -> Option<&Arc<dyn CallHandler>> {
        self.handler.as_ref()
    }

    pub fn set_handler(&mut self, handler: Arc<dyn CallHandler>) -> Result<(), ConfigurationError> {
        self.ensure_stopped()?;
        self.handler = Some(handler);
        Ok(())
    }

    pub fn set_codecs(&mut self, codecs: FrameCodecs) -> Result<(), ConfigurationError> {
        self.ensure_stopped()?;
        self.codecs = codecs;
        Ok(())
    }

    pub fn set_core_threads(&mut self, core_threads: usize) -> Result<(), ConfigurationError> {
        self.ensure_stopped()?;
        validate_pool_size("core_threads", core_threads)?;
        self.config.core_threads = core_threads;
        Ok(())
    }

    pub fn set_max_threads(&mut self, max_threads: usize) -> Result<(), ConfigurationError> {
        self.ensure_stopped()?;
        validate_pool_size("max_threads", max_threads)?;
        self.config.max_threads = max_threads;
        Ok(())
    }

    /// Takes effect on the next `stop()`, even while running.
    pub fn set_stop_timeout(&mut self, stop_timeout: Duration) {
        self.config.stop_timeout = stop_timeout;
    }

    pub fn set_buffer_size(&mut self, buffer_size: usize) -> Result<(), ConfigurationError> {
        self.ensure_stopped()?;
        validate_pool_size("buffer_size", buffer_size)?;
        self.config.buffer_size = buffer_size;
        Ok(())
    }

    pub fn set_idle_timeout(&mut self, idle_timeout: Option<Duration>) -> Result<(), ConfigurationError> {
        self.ensure_stopped()?;
        validate_idle_timeout(idle_timeout)?;
        self.config.idle_timeout = idle_timeout;
        Ok(())
    }

    pub fn set_bind_address(&mut self, bind_address: IpAddr) -> Result<(), ConfigurationError> {
        self.ensure_stopped()?;
        self.config.bind_address = Some(bind_address);
        Ok(())
    }

    /// Resolves `host` (a name or a textual IP) and binds to it on `start()`.
    pub fn set_binding_address(&mut self, host: &str) -> Result<(), ConfigurationError> {
        self.set_bind_address(resolve_host(host)?)
    }

    pub fn set_port(&mut self, port: u16) -> Result<(), ConfigurationError> {
        self.ensure_stopped()?;
        self.config.port = Some(port);
        Ok(())
    }

    /// Binds the listening socket and starts `core_threads` workers.
    pub fn start(&mut self) -> Result<(), ConnectorError> {
        self.ensure_stopped()?;
        let handler = self
            .handler
            .clone()
            .ok_or(ConfigurationError::MissingHandler)?;
        let addr = self.config.socket_addr()?;

        let listener = TcpListener::bind(addr)?;
        let context = ServeContext {
            handler,
            codecs: self.codecs.clone(),
            security: self.security.clone(),
            buffer_size: self.config.buffer_size,
            idle_timeout: self.config.idle_timeout,
        };
        let pool = Arc::new(WorkerPool::new(
            listener,
            self.config.max_threads.max(self.config.core_threads),
            context,
        )?);

        for _ in 0..self.config.core_threads {
            if let Err(err) = pool.spawn_worker() {
                pool.shut_down(self.config.stop_timeout);
                return Err(err.into());
            }
        }

        tracing::info!(
            "Connector listening on {} ({} workers, up to {})",
            pool.local_addr(),
            self.config.core_threads,
            self.config.max_threads
        );
        self.pool = Some(pool);
        Ok(())
    }

    /// Stops accepting, interrupts open connections and waits up to the
    /// stop timeout for the workers. The listening socket is closed either
    /// way.
    pub fn stop(&mut self) -> Result<(), ConfigurationError> {
        let pool = self.pool.take().ok_or(ConfigurationError::NotRunning)?;

        tracing::info!("Stopping connector on {}", pool.local_addr());
        if pool.shut_down(self.config.stop_timeout) {
            tracing::info!("Connector on {} stopped", pool.local_addr());
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.pool.is_some()
    }

    /// The bound address while running; resolves port `0` to the real port.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.pool.as_ref().map(|pool| pool.local_addr())
    }

    pub fn num_running_threads(&self) -> usize {
        self.pool.as_ref().map_or(0, |pool| pool.running())
    }

    /// Workers currently holding a connection.
    pub fn num_engaged(&self) -> usize {
        self.pool.as_ref().map_or(0, |pool| pool.engaged())
    }

    fn ensure_stopped(&self) -> Result<(), ConfigurationError> {
        if self.is_running() {
            return Err(ConfigurationError::AlreadyRunning);
        }
        Ok(())
    }
}

impl Drop for SocketConnector {
    fn drop(&mut self) {
        if self.is_running() {
            let _ = self.stop();
        }
    }
}
