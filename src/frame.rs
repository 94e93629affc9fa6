mod bitcode_codec;
mod call_frame;
pub mod flags;
mod frame_codec;
mod remote_failure;
mod return_frame;
mod value;

pub use bitcode_codec::BitcodeFrameCodec;
pub use call_frame::CallFrame;
pub use flags::ExchangePattern;
pub use frame_codec::{CallFrameCodec, CodecError, FrameCodecs, ReturnFrameCodec};
pub use remote_failure::{FailureOrigin, RemoteFailure};
pub use return_frame::{ReturnFrame, ReturnValue};
pub use value::{Value, ValueType, ValueTypeError};
