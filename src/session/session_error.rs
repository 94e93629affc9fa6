use crate::frame::CodecError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),

    /// An in-out call was sent but the peer closed without answering.
    #[error("no return frame was received")]
    NoResponse,
}
