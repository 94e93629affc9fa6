use crate::{ClientConfig, ClientSecurity};
use keepwire::ConfigurationError;
use keepwire::cookie;
use keepwire::frame::{CallFrame, ExchangePattern, FrameCodecs, Value};
use keepwire::session::{exchange, send_in_only};
use keepwire::tls::TlsSettings;
use keepwire::transport::{Channel, TcpChannel, TlsChannel};
use keepwire_rpc_service::{CallError, RpcCaller, resolve_return};
use std::net::TcpStream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

type Connection = Option<Box<dyn Channel>>;

/// A blocking RPC client over one TCP (or TLS) connection.
///
/// The connection is opened by the first call and kept for the next one as
/// long as both ends agree to keep it alive. Any transport failure drops it;
/// the next call connects again. Calls from several threads are serialized.
///
/// Call [`dispose`](Self::dispose) when done. Dropping a client that still
/// holds a connection closes it and logs a warning.
pub struct SocketClient {
    config: ClientConfig,
    security: ClientSecurity,
    codecs: FrameCodecs,
    connection: Mutex<Connection>,
    connections_opened: AtomicUsize,
}

impl SocketClient {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigurationError> {
        Self::with_security(config, ClientSecurity::Plain)
    }

    /// A client running the TLS handshake on every connection it opens.
    pub fn tls(config: ClientConfig, settings: &TlsSettings) -> Result<Self, ConfigurationError> {
        Self::with_security(config, ClientSecurity::tls(settings)?)
    }

    pub fn with_security(
        config: ClientConfig,
        security: ClientSecurity,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            config,
            security,
            codecs: FrameCodecs::default(),
            connection: Mutex::new(None),
            connections_opened: AtomicUsize::new(0),
        })
    }

    pub fn with_codecs(mut self, codecs: FrameCodecs) -> Self {
        self.codecs = codecs;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn security(&self) -> &ClientSecurity {
        &self.security
    }

    /// Whether a connection is currently held open.
    pub fn is_connected(&self) -> bool {
        self.lock_connection()
            .as_ref()
            .is_some_and(|channel| !channel.is_closed())
    }

    /// Connections opened over the client's lifetime.
    pub fn connection_count(&self) -> usize {
        self.connections_opened.load(Ordering::SeqCst)
    }

    /// Closes the connection, if any. Never fails; repeating it is a no-op.
    /// The next call connects again.
    pub fn dispose(&self) {
        release(&mut self.lock_connection());
    }

    fn prepare(&self, call: &mut CallFrame, pattern: ExchangePattern) {
        call.set_exchange_pattern(pattern);
        call.set_keep_alive(self.config.keep_alive);
        if self.config.send_cookies {
            call.set_user_data(cookie::get());
        }
    }

    fn deadline(&self) -> Option<Instant> {
        self.config.call_timeout.map(|timeout| Instant::now() + timeout)
    }

    fn lock_connection(&self) -> MutexGuard<'_, Connection> {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The open channel, connecting first if there is none.
    fn connected<'a>(&self, slot: &'a mut Connection) -> Result<&'a mut Box<dyn Channel>, CallError> {
        let channel = match slot.take() {
            Some(channel) if !channel.is_closed() => channel,
            _ => self.open()?,
        };
        Ok(slot.insert(channel))
    }

    fn open(&self) -> Result<Box<dyn Channel>, CallError> {
        let host = self
            .config
            .host
            .as_deref()
            .ok_or(ConfigurationError::MissingServiceAddress)?;
        let port = self.config.port.ok_or(ConfigurationError::MissingPort)?;

        let stream = TcpStream::connect((host, port))?;
        self.config.configure_socket(&stream)?;

        let channel: Box<dyn Channel> = match &self.security {
            ClientSecurity::Plain => Box::new(TcpChannel::new(stream, self.config.buffer_size)?),
            ClientSecurity::Tls {
                factory,
                server_name,
            } => {
                let engine = factory.create_client_engine(server_name.as_deref().unwrap_or(host))?;
                Box::new(TlsChannel::establish(stream, engine, self.config.buffer_size)?)
            }
        };

        self.connections_opened.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("connected to {host}:{port}");
        Ok(channel)
    }
}

impl RpcCaller for SocketClient {
    fn invoke(&self, mut call: CallFrame, declared_failures: &[&str]) -> Result<Value, CallError> {
        self.prepare(&mut call, ExchangePattern::InOut);

        let exchanged = {
            let mut connection = self.lock_connection();
            let channel = self.connected(&mut connection)?;

            match exchange(channel.as_mut(), &self.codecs, &call, self.deadline()) {
                Ok(exchanged) => {
                    if !exchanged.keep_alive {
                        release(&mut connection);
                    }
                    exchanged
                }
                Err(err) => {
                    tracing::debug!("call to {} failed: {err}", call.qualified_method_name());
                    release(&mut connection);
                    return Err(err.into());
                }
            }
        };

        let (result, user_data) = exchanged.return_frame.into_parts();
        if self.config.accept_cookies {
            cookie::set(user_data);
        }
        resolve_return(result, declared_failures)
    }

    fn invoke_in_only(&self, mut call: CallFrame) -> Result<(), CallError> {
        self.prepare(&mut call, ExchangePattern::InOnly);

        let mut connection = self.lock_connection();
        let channel = self.connected(&mut connection)?;

        if let Err(err) = send_in_only(channel.as_mut(), &self.codecs, &call, self.deadline()) {
            release(&mut connection);
            return Err(err.into());
        }
        if !self.config.keep_alive {
            release(&mut connection);
        }
        Ok(())
    }
}

impl Drop for SocketClient {
    fn drop(&mut self) {
        let connection = self
            .connection
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);

        if connection.is_some() {
            tracing::warn!("SocketClient dropped with an open connection: call dispose to clean up system resources");
            release(connection);
        }
    }
}

fn release(connection: &mut Connection) {
    if let Some(mut channel) = connection.take() {
        channel.close();
    }
}
