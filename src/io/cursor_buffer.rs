use std::fmt;

/// A fixed-capacity byte window tracked by a `position` and a `limit`.
///
/// In write mode `position..limit` is free space; in read mode it holds the
/// bytes not yet consumed. [`flip`](Self::flip) switches write → read,
/// [`compact`](Self::compact) moves unread bytes to the front and switches
/// back to write mode.
pub struct CursorBuffer {
    buf: Box<[u8]>,
    position: usize,
    limit: usize,
}

impl CursorBuffer {
    /// Creates an empty buffer in write mode.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            position: 0,
            limit: capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Moves the cursor. Values past the limit are clamped to it.
    pub fn set_position(&mut self, position: usize) {
        self.position = position.min(self.limit);
    }

    /// Moves the limit, pulling the cursor back if it would end up past it.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.min(self.capacity());
        self.position = self.position.min(self.limit);
    }

    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    pub fn has_remaining(&self) -> bool {
        self.position < self.limit
    }

    /// Resets to an empty write-mode window.
    pub fn clear(&mut self) {
        self.position = 0;
        self.limit = self.capacity();
    }

    /// Switches from write mode to read mode.
    pub fn flip(&mut self) {
        self.limit = self.position;
        self.position = 0;
    }

    /// Discards consumed bytes, keeps unread ones at the front and switches
    /// to write mode after them.
    pub fn compact(&mut self) {
        let remaining = self.remaining();
        if self.position > 0 {
            self.buf.copy_within(self.position..self.limit, 0);
        }
        self.position = remaining;
        self.limit = self.capacity();
    }

    /// The bytes between position and limit.
    pub fn chunk(&self) -> &[u8] {
        &self.buf[self.position..self.limit]
    }

    /// Mutable view of the bytes between position and limit.
    pub fn chunk_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.position..self.limit]
    }

    /// Advances the cursor by `count` bytes, at most to the limit.
    pub fn advance(&mut self, count: usize) {
        self.position = (self.position + count).min(self.limit);
    }

    /// Copies as much of `src` as fits. Returns the number of bytes copied.
    pub fn put_slice(&mut self, src: &[u8]) -> usize {
        let count = src.len().min(self.remaining());
        self.buf[self.position..self.position + count].copy_from_slice(&src[..count]);
        self.position += count;
        count
    }

    /// Copies as many bytes as available into `dst`. Returns the count.
    pub fn get_slice(&mut self, dst: &mut [u8]) -> usize {
        let count = dst.len().min(self.remaining());
        dst[..count].copy_from_slice(&self.buf[self.position..self.position + count]);
        self.position += count;
        count
    }

    pub fn put_u8(&mut self, byte: u8) -> bool {
        if !self.has_remaining() {
            return false;
        }
        self.buf[self.position] = byte;
        self.position += 1;
        true
    }

    pub fn get_u8(&mut self) -> Option<u8> {
        if !self.has_remaining() {
            return None;
        }
        let byte = self.buf[self.position];
        self.position += 1;
        Some(byte)
    }
}

impl fmt::Debug for CursorBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorBuffer")
            .field("position", &self.position)
            .field("limit", &self.limit)
            .field("capacity", &self.capacity())
            .finish()
    }
}
