use crate::io::{BufferInput, BufferOutput, CursorBuffer, Drain, Refill, WriteMode};
use crate::tls::{RecordTransport, TlsEngine};
use crate::transport::{Channel, apply_deadline};
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

type SharedTransport = Arc<Mutex<RecordTransport<TcpStream>>>;

fn lock(transport: &SharedTransport) -> io::Result<MutexGuard<'_, RecordTransport<TcpStream>>> {
    transport
        .lock()
        .map_err(|_| io::Error::other("TLS transport lock poisoned"))
}

struct TlsRefill(SharedTransport);

impl Refill for TlsRefill {
    fn refill(&mut self, window: &mut CursorBuffer) -> io::Result<Option<usize>> {
        lock(&self.0)?.read(window)
    }
}

struct TlsDrain(SharedTransport);

impl Drain for TlsDrain {
    fn drain(&mut self, window: &mut CursorBuffer, _mode: WriteMode) -> io::Result<()> {
        lock(&self.0)?.write(window)
    }
}

/// A TLS connection whose plaintext streams sit on top of a
/// [`RecordTransport`].
///
/// The input and output adapters share the transport; the channel is still
/// used by one thread at a time.
pub struct TlsChannel {
    stream: TcpStream,
    transport: SharedTransport,
    input: BufferInput<TlsRefill>,
    output: BufferOutput<TlsDrain>,
    peer: Option<SocketAddr>,
    timeouts_set: bool,
    closed: bool,
}

impl TlsChannel {
    /// Runs the handshake over `stream` and wraps it in buffered streams.
    pub fn establish(
        stream: TcpStream,
        engine: Box<dyn TlsEngine>,
        buffer_size: usize,
    ) -> io::Result<Self> {
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr().ok();

        let mut transport = RecordTransport::new(stream.try_clone()?, engine);
        transport.handshake()?;

        let plaintext_size = buffer_size.max(transport.engine().application_buffer_size());
        let transport = Arc::new(Mutex::new(transport));

        Ok(Self {
            input: BufferInput::new(plaintext_size, TlsRefill(transport.clone()))?,
            output: BufferOutput::new(plaintext_size, TlsDrain(transport.clone()))?,
            transport,
            stream,
            peer,
            timeouts_set: false,
            closed: false,
        })
    }
}

impl Channel for TlsChannel {
    fn reader(&mut self) -> &mut dyn Read {
        &mut self.input
    }

    fn writer(&mut self) -> &mut dyn Write {
        &mut self.output
    }

    fn set_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()> {
        if deadline.is_none() && !self.timeouts_set {
            return Ok(());
        }
        apply_deadline(&self.stream, deadline)?;
        self.timeouts_set = deadline.is_some();
        Ok(())
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Sends this side's close notification, then drains the peer's, then
    /// shuts the socket down.
    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Err(err) = self.output.close() {
            tracing::debug!("discarding unsent data on close: {err}");
        }
        self.input.discard_buffered();

        match lock(&self.transport) {
            Ok(mut transport) => {
                if let Err(err) = transport.write_closing_message() {
                    tracing::debug!("TLS close notification not sent: {err}");
                }
                if let Err(err) = transport.read_closing_message() {
                    tracing::debug!("TLS close notification not received: {err}");
                }
            }
            Err(err) => tracing::debug!("skipping TLS closing exchange: {err}"),
        }

        if let Err(err) = self.stream.shutdown(Shutdown::Both) {
            tracing::trace!("socket shutdown failed: {err}");
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for TlsChannel {
    fn drop(&mut self) {
        self.close();
    }
}
