use crate::constants::{TLS_MAX_PLAINTEXT_FRAGMENT, TLS_PACKET_BUFFER_SIZE};
use crate::io::CursorBuffer;
use crate::tls::{EngineResult, EngineStatus, HandshakeStatus, TlsEngine};
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, Connection, ServerConfig, ServerConnection};
use std::io::{self, Read, Write};
use std::sync::Arc;

/// Bytes a record adds on top of its plaintext fragment.
const RECORD_OVERHEAD: usize = TLS_PACKET_BUFFER_SIZE - TLS_MAX_PLAINTEXT_FRAGMENT;

/// [`TlsEngine`] backed by a rustls connection.
///
/// rustls buffers partial records internally, so `unwrap` consumes every
/// ciphertext byte it is given and reports an underflow only when it was
/// given nothing to work with.
pub struct RustlsEngine {
    conn: Connection,
    started: bool,
    outbound_closed: bool,
    inbound_closed: bool,
    peer_closed: bool,
    pending_plaintext: usize,
}

impl RustlsEngine {
    pub fn client(config: Arc<ClientConfig>, server_name: ServerName<'static>) -> io::Result<Self> {
        let conn = ClientConnection::new(config, server_name).map_err(protocol_error)?;
        Ok(Self::from_connection(conn.into()))
    }

    pub fn server(config: Arc<ServerConfig>) -> io::Result<Self> {
        let conn = ServerConnection::new(config).map_err(protocol_error)?;
        Ok(Self::from_connection(conn.into()))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            started: false,
            outbound_closed: false,
            inbound_closed: false,
            peer_closed: false,
            pending_plaintext: 0,
        }
    }

    /// Moves queued records into `dst`. Returns the number of bytes written.
    fn write_pending(&mut self, dst: &mut CursorBuffer) -> io::Result<usize> {
        let mut written = 0;
        while self.conn.wants_write() && dst.has_remaining() {
            let count = {
                let mut out = dst.chunk_mut();
                self.conn.write_tls(&mut out)?
            };
            if count == 0 {
                break;
            }
            dst.advance(count);
            written += count;
        }
        Ok(written)
    }

    fn read_plaintext(&mut self, dst: &mut CursorBuffer) -> io::Result<usize> {
        if self.pending_plaintext == 0 || !dst.has_remaining() {
            return Ok(0);
        }

        match self.conn.reader().read(dst.chunk_mut()) {
            Ok(count) => {
                dst.advance(count);
                self.pending_plaintext = self.pending_plaintext.saturating_sub(count);
                Ok(count)
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                self.pending_plaintext = 0;
                Ok(0)
            }
            Err(err) => Err(err),
        }
    }

    fn result(&self, status: EngineStatus, consumed: usize, produced: usize) -> EngineResult {
        EngineResult {
            status,
            handshake_status: self.handshake_status(),
            bytes_consumed: consumed,
            bytes_produced: produced,
        }
    }
}

impl TlsEngine for RustlsEngine {
    fn begin_handshake(&mut self) -> io::Result<()> {
        self.started = true;
        Ok(())
    }

    fn handshake_status(&self) -> HandshakeStatus {
        if !self.started {
            HandshakeStatus::NotHandshaking
        } else if self.conn.wants_write() {
            HandshakeStatus::NeedWrap
        } else if self.conn.is_handshaking() {
            HandshakeStatus::NeedUnwrap
        } else {
            HandshakeStatus::NotHandshaking
        }
    }

    fn wrap(
        &mut self,
        src: &mut CursorBuffer,
        dst: &mut CursorBuffer,
    ) -> io::Result<EngineResult> {
        let mut produced = self.write_pending(dst)?;
        let mut consumed = 0;

        let accepts_plaintext =
            !self.outbound_closed && !self.conn.is_handshaking() && !self.conn.wants_write();

        if accepts_plaintext && src.has_remaining() {
            let fragment = src
                .remaining()
                .min(TLS_MAX_PLAINTEXT_FRAGMENT)
                .min(dst.remaining().saturating_sub(RECORD_OVERHEAD));

            if fragment > 0 {
                consumed = self.conn.writer().write(&src.chunk()[..fragment])?;
                src.advance(consumed);
                produced += self.write_pending(dst)?;
            }
        }

        let status = if self.outbound_closed && !self.conn.wants_write() {
            EngineStatus::Closed
        } else if produced == 0 && consumed == 0 && (self.conn.wants_write() || src.has_remaining())
        {
            EngineStatus::BufferOverflow
        } else {
            EngineStatus::Ok
        };

        Ok(self.result(status, consumed, produced))
    }

    fn unwrap(
        &mut self,
        src: &mut CursorBuffer,
        dst: &mut CursorBuffer,
    ) -> io::Result<EngineResult> {
        let mut consumed = 0;
        let mut produced = self.read_plaintext(dst)?;

        if produced == 0 && self.pending_plaintext == 0 && src.has_remaining() {
            consumed = {
                let mut data = src.chunk();
                self.conn.read_tls(&mut data)?
            };
            src.advance(consumed);

            let state = self.conn.process_new_packets().map_err(protocol_error)?;
            self.pending_plaintext = state.plaintext_bytes_to_read();
            self.peer_closed |= state.peer_has_closed();

            produced = self.read_plaintext(dst)?;
        }

        let status = if produced > 0 {
            EngineStatus::Ok
        } else if self.pending_plaintext > 0 {
            EngineStatus::BufferOverflow
        } else if self.peer_closed || self.inbound_closed {
            EngineStatus::Closed
        } else if consumed > 0 {
            EngineStatus::Ok
        } else {
            EngineStatus::BufferUnderflow
        };

        Ok(self.result(status, consumed, produced))
    }

    fn run_delegated_task(&mut self) -> io::Result<()> {
        // rustls does all of its work inline.
        Ok(())
    }

    fn close_outbound(&mut self) {
        if !self.outbound_closed {
            self.conn.send_close_notify();
            self.outbound_closed = true;
        }
    }

    fn close_inbound(&mut self) {
        if !self.peer_closed {
            tracing::trace!("closing TLS inbound side before the peer's close_notify arrived");
        }
        self.inbound_closed = true;
    }

    fn is_outbound_done(&self) -> bool {
        self.outbound_closed && !self.conn.wants_write()
    }

    fn is_inbound_done(&self) -> bool {
        self.inbound_closed || self.peer_closed
    }

    fn application_buffer_size(&self) -> usize {
        TLS_MAX_PLAINTEXT_FRAGMENT
    }

    fn packet_buffer_size(&self) -> usize {
        TLS_PACKET_BUFFER_SIZE
    }
}

fn protocol_error(err: rustls::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}
