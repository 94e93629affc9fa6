use crate::io::CursorBuffer;
use std::io::{self, Write};

/// Why a [`BufferOutput`] is handing its window to the drain.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WriteMode {
    /// The window is full.
    Write,
    /// An explicit flush.
    Flush,
    /// The stream is being closed.
    Close,
}

/// Consumes bytes buffered by a [`BufferOutput`].
///
/// The window is handed over in read mode; every byte in it must be consumed.
pub trait Drain {
    fn drain(&mut self, window: &mut CursorBuffer, mode: WriteMode) -> io::Result<()>;
}

impl<F> Drain for F
where
    F: FnMut(&mut CursorBuffer, WriteMode) -> io::Result<()>,
{
    fn drain(&mut self, window: &mut CursorBuffer, mode: WriteMode) -> io::Result<()> {
        self(window, mode)
    }
}

/// A `Write` adapter that buffers into a [`CursorBuffer`] and hands full
/// windows, flushes and the final close to a [`Drain`].
#[derive(Debug)]
pub struct BufferOutput<D> {
    window: CursorBuffer,
    sink: D,
    closed: bool,
}

impl<D: Drain> BufferOutput<D> {
    pub fn new(capacity: usize, sink: D) -> io::Result<Self> {
        if capacity == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "buffer capacity must be greater than zero",
            ));
        }

        Ok(Self {
            window: CursorBuffer::with_capacity(capacity),
            sink,
            closed: false,
        })
    }

    pub fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.ensure_open()?;
        // Full windows are drained eagerly, so there is always room here.
        self.window.put_u8(byte);
        if !self.window.has_remaining() {
            self.drain_window(WriteMode::Write)?;
        }
        Ok(())
    }

    /// Bytes buffered and not yet drained.
    pub fn buffered(&self) -> usize {
        self.window.position()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Drains everything that is buffered with [`WriteMode::Close`]. Closing
    /// twice is a no-op.
    pub fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.drain_window(WriteMode::Close)
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut D {
        &mut self.sink
    }

    /// Drops buffered bytes without draining them.
    pub fn discard_buffered(&mut self) {
        self.window.clear();
    }

    fn ensure_open(&self) -> io::Result<()> {
        if self.closed {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "output stream is closed",
            ));
        }
        Ok(())
    }

    fn drain_window(&mut self, mode: WriteMode) -> io::Result<()> {
        self.window.flip();
        let result = self.sink.drain(&mut self.window, mode);
        let left_over = self.window.remaining();
        self.window.clear();
        result?;

        if left_over > 0 {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "Output data could not be written.",
            ));
        }
        Ok(())
    }
}

impl<D: Drain> Write for BufferOutput<D> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.ensure_open()?;

        let mut offset = 0;
        while offset < buf.len() {
            offset += self.window.put_slice(&buf[offset..]);
            if !self.window.has_remaining() {
                self.drain_window(WriteMode::Write)?;
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.ensure_open()?;
        self.drain_window(WriteMode::Flush)
    }
}
