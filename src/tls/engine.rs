use crate::io::CursorBuffer;
use std::io;

/// What the engine needs next to make handshake progress.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HandshakeStatus {
    /// No handshake is in progress.
    NotHandshaking,
    /// The handshake just completed.
    Finished,
    /// A delegated computation must run before the engine can continue.
    NeedTask,
    /// The engine has records to send.
    NeedWrap,
    /// The engine needs records from the peer.
    NeedUnwrap,
}

/// Outcome of a single `wrap` or `unwrap` call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EngineStatus {
    Ok,
    /// Not enough ciphertext was available to make progress.
    BufferUnderflow,
    /// The destination buffer has no room for what the engine would produce.
    BufferOverflow,
    /// This side of the engine is closed.
    Closed,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EngineResult {
    pub status: EngineStatus,
    pub handshake_status: HandshakeStatus,
    pub bytes_consumed: usize,
    pub bytes_produced: usize,
}

/// A TLS session that transforms bytes but never touches a socket.
///
/// Source buffers are passed in read mode, destination buffers in write
/// mode; both are advanced by the number of bytes consumed or produced.
pub trait TlsEngine: Send {
    fn begin_handshake(&mut self) -> io::Result<()>;

    fn handshake_status(&self) -> HandshakeStatus;

    /// Encrypts plaintext from `src` into records in `dst`.
    fn wrap(&mut self, src: &mut CursorBuffer, dst: &mut CursorBuffer)
    -> io::Result<EngineResult>;

    /// Decrypts records from `src` into plaintext in `dst`.
    fn unwrap(
        &mut self,
        src: &mut CursorBuffer,
        dst: &mut CursorBuffer,
    ) -> io::Result<EngineResult>;

    /// Runs the pending delegated computation, if any, on the calling thread.
    fn run_delegated_task(&mut self) -> io::Result<()>;

    /// Queues this side's close notification.
    fn close_outbound(&mut self);

    /// Marks the inbound side closed. Bytes arriving afterwards are ignored.
    fn close_inbound(&mut self);

    /// The close notification has been queued and fully wrapped.
    fn is_outbound_done(&self) -> bool;

    /// The peer's close notification was received, or the inbound side was
    /// closed locally.
    fn is_inbound_done(&self) -> bool;

    /// Smallest plaintext buffer that can hold one record's payload.
    fn application_buffer_size(&self) -> usize;

    /// Smallest ciphertext buffer that can hold one record.
    fn packet_buffer_size(&self) -> usize;
}
