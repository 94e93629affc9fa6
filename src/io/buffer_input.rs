use crate::io::CursorBuffer;
use std::io::{self, BufRead, Read};

/// Supplies bytes to a [`BufferInput`] whenever its window runs dry.
///
/// The window is handed over empty and in write mode. An implementation
/// either fills it, flips it for reading and returns `Some(count)`, or
/// returns `None` to report end of input.
pub trait Refill {
    fn refill(&mut self, window: &mut CursorBuffer) -> io::Result<Option<usize>>;
}

impl<F> Refill for F
where
    F: FnMut(&mut CursorBuffer) -> io::Result<Option<usize>>,
{
    fn refill(&mut self, window: &mut CursorBuffer) -> io::Result<Option<usize>> {
        self(window)
    }
}

/// A `Read` adapter that pulls from a [`CursorBuffer`] and calls back into a
/// [`Refill`] when it is exhausted.
///
/// Mark/reset is not supported.
#[derive(Debug)]
pub struct BufferInput<R> {
    window: CursorBuffer,
    source: R,
}

impl<R: Refill> BufferInput<R> {
    pub fn new(capacity: usize, source: R) -> io::Result<Self> {
        if capacity == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "buffer capacity must be greater than zero",
            ));
        }

        let mut window = CursorBuffer::with_capacity(capacity);
        window.flip(); // Starts empty, in read mode.

        Ok(Self { window, source })
    }

    /// Number of bytes that can be read without calling the refill.
    pub fn available(&self) -> usize {
        self.window.remaining()
    }

    pub fn mark_supported(&self) -> bool {
        false
    }

    /// Reads one byte; `None` at end of input.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if !self.fill()? {
            return Ok(None);
        }
        Ok(self.window.get_u8())
    }

    /// Skips up to `count` bytes, refilling as needed. Returns the number of
    /// bytes actually skipped, which is smaller only at end of input.
    pub fn skip(&mut self, count: u64) -> io::Result<u64> {
        let mut skipped = 0u64;

        while skipped < count {
            if !self.fill()? {
                break;
            }
            let step = (count - skipped).min(self.window.remaining() as u64);
            self.window.advance(step as usize);
            skipped += step;
        }

        Ok(skipped)
    }

    pub fn source(&self) -> &R {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut R {
        &mut self.source
    }

    /// Drops any buffered bytes.
    pub fn discard_buffered(&mut self) {
        self.window.clear();
        self.window.flip();
    }

    /// Ensures at least one byte is buffered. Returns `false` at end of input.
    fn fill(&mut self) -> io::Result<bool> {
        if self.window.has_remaining() {
            return Ok(true);
        }

        self.window.clear();
        match self.source.refill(&mut self.window) {
            Ok(Some(count)) if count > 0 && self.window.has_remaining() => Ok(true),
            Ok(Some(_)) => {
                self.discard_buffered();
                Err(io::Error::other(
                    "No bytes were read even though the end of input has not been reached.",
                ))
            }
            Ok(None) => {
                self.discard_buffered();
                Ok(false)
            }
            Err(err) => {
                self.discard_buffered();
                Err(err)
            }
        }
    }
}

impl<R: Refill> Read for BufferInput<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() || !self.fill()? {
            return Ok(0);
        }
        Ok(self.window.get_slice(buf))
    }
}

impl<R: Refill> BufRead for BufferInput<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.fill()?;
        Ok(self.window.chunk())
    }

    fn consume(&mut self, amt: usize) {
        self.window.advance(amt);
    }
}
