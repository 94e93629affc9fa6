use crate::frame::{BitcodeFrameCodec, CallFrame, ReturnFrame};
use once_cell::sync::Lazy;
use std::io::{self, Read, Write};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("frame I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("unsupported frame schema version {0}")]
    UnsupportedVersion(u8),

    #[error("frame body of {0} bytes exceeds the limit")]
    FrameTooLarge(usize),

    #[error("the stream ended in the middle of a frame")]
    Truncated,

    #[error("malformed frame: {0}")]
    Malformed(String),
}

/// Turns call frames into bytes and back.
///
/// Implementations are shared by every connection of a connector and must
/// not keep per-stream state.
pub trait CallFrameCodec: Send + Sync {
    fn serialize(&self, frame: &CallFrame, output: &mut dyn Write) -> Result<(), CodecError>;

    /// `Ok(None)` means the stream ended cleanly before the first byte of a
    /// frame. Anything else that is not a whole frame is an error.
    fn deserialize(&self, input: &mut dyn Read) -> Result<Option<CallFrame>, CodecError>;
}

/// Turns return frames into bytes and back. Same contract as
/// [`CallFrameCodec`].
pub trait ReturnFrameCodec: Send + Sync {
    fn serialize(&self, frame: &ReturnFrame, output: &mut dyn Write) -> Result<(), CodecError>;

    fn deserialize(&self, input: &mut dyn Read) -> Result<Option<ReturnFrame>, CodecError>;
}

static DEFAULT_CODEC: Lazy<Arc<BitcodeFrameCodec>> = Lazy::new(|| Arc::new(BitcodeFrameCodec));

/// The codec pair a client or connector uses.
#[derive(Clone)]
pub struct FrameCodecs {
    pub call: Arc<dyn CallFrameCodec>,
    pub ret: Arc<dyn ReturnFrameCodec>,
}

impl FrameCodecs {
    pub fn new(call: Arc<dyn CallFrameCodec>, ret: Arc<dyn ReturnFrameCodec>) -> Self {
        Self { call, ret }
    }
}

impl Default for FrameCodecs {
    fn default() -> Self {
        let codec = DEFAULT_CODEC.clone();
        Self {
            call: codec.clone(),
            ret: codec,
        }
    }
}
