use crate::io::{BufferInput, BufferOutput, CursorBuffer, Drain, Refill, WriteMode};
use crate::transport::{Channel, apply_deadline};
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Instant;

/// Refills a window straight from a blocking reader.
#[derive(Debug)]
pub struct SocketRefill<S>(pub S);

impl<S: Read> Refill for SocketRefill<S> {
    fn refill(&mut self, window: &mut CursorBuffer) -> io::Result<Option<usize>> {
        loop {
            match self.0.read(window.chunk_mut()) {
                Ok(0) => return Ok(None),
                Ok(count) => {
                    window.advance(count);
                    window.flip();
                    return Ok(Some(count));
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }
}

/// Drains a window straight into a blocking writer.
#[derive(Debug)]
pub struct SocketDrain<S>(pub S);

impl<S: Write> Drain for SocketDrain<S> {
    fn drain(&mut self, window: &mut CursorBuffer, mode: WriteMode) -> io::Result<()> {
        self.0.write_all(window.chunk())?;
        window.advance(window.remaining());
        if mode != WriteMode::Write {
            self.0.flush()?;
        }
        Ok(())
    }
}

/// A plain TCP connection with buffered, window-backed streams.
pub struct TcpChannel {
    stream: TcpStream,
    input: BufferInput<SocketRefill<TcpStream>>,
    output: BufferOutput<SocketDrain<TcpStream>>,
    peer: Option<SocketAddr>,
    timeouts_set: bool,
    closed: bool,
}

impl TcpChannel {
    pub fn new(stream: TcpStream, buffer_size: usize) -> io::Result<Self> {
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr().ok();

        Ok(Self {
            input: BufferInput::new(buffer_size, SocketRefill(stream.try_clone()?))?,
            output: BufferOutput::new(buffer_size, SocketDrain(stream.try_clone()?))?,
            stream,
            peer,
            timeouts_set: false,
            closed: false,
        })
    }

    pub fn connect(addr: SocketAddr, buffer_size: usize) -> io::Result<Self> {
        Self::new(TcpStream::connect(addr)?, buffer_size)
    }
}

impl Channel for TcpChannel {
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

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Err(err) = self.output.close() {
            tracing::debug!("discarding unsent data on close: {err}");
        }
        if let Err(err) = self.stream.shutdown(Shutdown::Both) {
            tracing::trace!("socket shutdown failed: {err}");
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for TcpChannel {
    fn drop(&mut self) {
        self.close();
    }
}
