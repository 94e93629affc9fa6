use crate::io::CursorBuffer;
use crate::tls::{EngineStatus, HandshakeStatus, TlsEngine};
use std::io::{self, Read, Write};
use std::thread;

/// Pumps TLS records between a [`TlsEngine`] and a blocking socket.
///
/// Owns the ciphertext buffers. `net_in` is kept in write mode with unread
/// records compacted at its front; `net_out` is cleared before every wrap.
/// Plaintext buffers belong to the caller.
pub struct RecordTransport<S> {
    socket: S,
    engine: Box<dyn TlsEngine>,
    net_in: CursorBuffer,
    net_out: CursorBuffer,
}

impl<S: Read + Write> RecordTransport<S> {
    pub fn new(socket: S, engine: Box<dyn TlsEngine>) -> Self {
        let packet_size = engine.packet_buffer_size();
        Self {
            socket,
            engine,
            net_in: CursorBuffer::with_capacity(packet_size),
            net_out: CursorBuffer::with_capacity(packet_size),
        }
    }

    pub fn engine(&self) -> &dyn TlsEngine {
        self.engine.as_ref()
    }

    pub fn socket(&self) -> &S {
        &self.socket
    }

    /// Ciphertext received but not yet handed to the engine.
    pub fn buffered_ciphertext(&self) -> usize {
        self.net_in.position()
    }

    /// Runs the handshake to completion.
    ///
    /// End of stream before the handshake completes is an
    /// `UnexpectedEof` error; any unexpected engine status is `InvalidData`.
    pub fn handshake(&mut self) -> io::Result<()> {
        if self.net_in.position() != 0 || self.net_out.position() != 0 {
            return Err(io::Error::other(
                "TLS buffers must be empty before a handshake",
            ));
        }

        // No application data moves during the handshake.
        let mut app_in = CursorBuffer::with_capacity(0);
        let mut app_out = CursorBuffer::with_capacity(0);

        self.engine.begin_handshake()?;

        loop {
            match self.engine.handshake_status() {
                HandshakeStatus::NeedWrap => {
                    self.net_out.clear();
                    let result = self.engine.wrap(&mut app_out, &mut self.net_out)?;
                    if result.status != EngineStatus::Ok {
                        return Err(protocol_violation(format!(
                            "unexpected {:?} while wrapping handshake records",
                            result.status
                        )));
                    }
                    self.send_net_out()?;
                }
                HandshakeStatus::NeedUnwrap => {
                    if self.net_in.position() == 0 {
                        self.receive_handshake_records()?;
                        continue;
                    }

                    self.net_in.flip();
                    let result = self.engine.unwrap(&mut self.net_in, &mut app_in);
                    self.net_in.compact();

                    let result = result?;
                    match result.status {
                        EngineStatus::Ok => {}
                        // Application data arrived right behind the last
                        // handshake record; the engine keeps it for `read`.
                        EngineStatus::BufferOverflow
                            if result.handshake_status != HandshakeStatus::NeedUnwrap => {}
                        EngineStatus::BufferUnderflow => {
                            thread::yield_now();
                            self.receive_handshake_records()?;
                        }
                        status => {
                            return Err(protocol_violation(format!(
                                "unexpected {status:?} while unwrapping handshake records"
                            )));
                        }
                    }
                }
                HandshakeStatus::NeedTask => self.engine.run_delegated_task()?,
                HandshakeStatus::Finished | HandshakeStatus::NotHandshaking => break,
            }
        }

        self.net_out.clear();
        Ok(())
    }

    /// Reads and decrypts application data into `app_in`, which must be in
    /// write mode. On success `app_in` is flipped for reading and the number
    /// of new plaintext bytes is returned; `None` means end of stream.
    pub fn read(&mut self, app_in: &mut CursorBuffer) -> io::Result<Option<usize>> {
        loop {
            self.net_in.flip();
            let result = self.engine.unwrap(&mut self.net_in, app_in);
            self.net_in.compact();
            let result = result?;

            match result.status {
                EngineStatus::Ok if result.bytes_produced > 0 => {
                    app_in.flip();
                    return Ok(Some(result.bytes_produced));
                }
                // Consumed a record that carried no application data.
                EngineStatus::Ok => {}
                EngineStatus::BufferUnderflow => {
                    thread::yield_now();
                    if !self.fill_net_in()? {
                        return Ok(None);
                    }
                }
                EngineStatus::Closed => return Ok(None),
                EngineStatus::BufferOverflow => {
                    return Err(io::Error::other(
                        "plaintext buffer has no room for decrypted data",
                    ));
                }
            }
        }
    }

    /// Encrypts everything remaining in `app_out` (read mode) and sends it.
    pub fn write(&mut self, app_out: &mut CursorBuffer) -> io::Result<()> {
        while app_out.has_remaining() || self.engine.handshake_status() == HandshakeStatus::NeedWrap
        {
            self.net_out.clear();
            let result = self.engine.wrap(app_out, &mut self.net_out)?;

            match result.status {
                EngineStatus::Ok | EngineStatus::BufferOverflow => {}
                EngineStatus::Closed => {
                    return Err(io::Error::new(
                        io::ErrorKind::BrokenPipe,
                        "TLS engine is closed for writing",
                    ));
                }
                EngineStatus::BufferUnderflow => {
                    return Err(protocol_violation(
                        "unexpected BufferUnderflow while wrapping".to_owned(),
                    ));
                }
            }

            if result.bytes_consumed == 0 && result.bytes_produced == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "TLS engine made no progress while wrapping",
                ));
            }

            self.send_net_out()?;
        }

        self.net_out.clear();
        Ok(())
    }

    /// Queues and sends this side's close notification.
    pub fn write_closing_message(&mut self) -> io::Result<()> {
        self.engine.close_outbound();
        let mut app_out = CursorBuffer::with_capacity(0);

        while !self.engine.is_outbound_done() {
            self.net_out.clear();
            let result = self.engine.wrap(&mut app_out, &mut self.net_out)?;
            if result.bytes_produced == 0 && !self.engine.is_outbound_done() {
                return Err(protocol_violation(format!(
                    "unexpected {:?} while wrapping the close notification",
                    result.status
                )));
            }
            self.send_net_out()?;
        }

        self.net_out.clear();
        Ok(())
    }

    /// Drains records until the peer's close notification or end of stream.
    /// Application data that still arrives is discarded.
    pub fn read_closing_message(&mut self) -> io::Result<()> {
        let mut discard = CursorBuffer::with_capacity(self.engine.application_buffer_size());

        while !self.engine.is_inbound_done() {
            discard.clear();
            self.net_in.flip();
            let result = self.engine.unwrap(&mut self.net_in, &mut discard);
            self.net_in.compact();

            match result?.status {
                EngineStatus::Closed => break,
                EngineStatus::Ok | EngineStatus::BufferOverflow => {}
                EngineStatus::BufferUnderflow => {
                    thread::yield_now();
                    if !self.fill_net_in()? {
                        break;
                    }
                }
            }
        }

        self.engine.close_inbound();
        self.net_in.clear();
        Ok(())
    }

    fn receive_handshake_records(&mut self) -> io::Result<()> {
        if self.fill_net_in()? {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "the TLS handshake did not complete: the peer closed the connection",
            ))
        }
    }

    /// Reads more ciphertext into `net_in`. `false` at end of stream.
    fn fill_net_in(&mut self) -> io::Result<bool> {
        if !self.net_in.has_remaining() {
            return Err(protocol_violation(
                "TLS record does not fit the ciphertext buffer".to_owned(),
            ));
        }

        loop {
            match self.socket.read(self.net_in.chunk_mut()) {
                Ok(0) => return Ok(false),
                Ok(count) => {
                    self.net_in.advance(count);
                    return Ok(true);
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }

    fn send_net_out(&mut self) -> io::Result<()> {
        self.net_out.flip();
        self.socket.write_all(self.net_out.chunk())?;
        self.socket.flush()?;
        self.net_out.clear();
        Ok(())
    }
}

fn protocol_violation(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}
