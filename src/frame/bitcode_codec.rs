use crate::constants::{
    FRAME_LENGTH_OFFSET, FRAME_PREFIX_SIZE, FRAME_SCHEMA_VERSION, MAX_FRAME_BODY_SIZE,
};
use crate::frame::{
    CallFrame, CallFrameCodec, CodecError, RemoteFailure, ReturnFrame, ReturnFrameCodec,
    ReturnValue, Value, ValueType,
};
use bitcode::{Decode, Encode};
use std::io::{self, Read, Write};

/// Default codec: each frame is `[schema version u8][body length u32 LE]`
/// followed by a bitcode-encoded body.
#[derive(Debug, Default, Clone, Copy)]
pub struct BitcodeFrameCodec;

#[derive(Encode, Decode)]
struct CallFrameBody {
    interface_id: String,
    method_name: String,
    parameter_types: Vec<ValueType>,
    arguments: Vec<Value>,
    flags: u32,
    user_data: Option<Vec<u8>>,
}

#[derive(Encode, Decode)]
enum ReturnBody {
    Value(Value),
    Failure(RemoteFailure),
}

#[derive(Encode, Decode)]
struct ReturnFrameBody {
    result: ReturnBody,
    flags: u32,
    user_data: Option<Vec<u8>>,
}

impl CallFrameCodec for BitcodeFrameCodec {
    fn serialize(&self, frame: &CallFrame, output: &mut dyn Write) -> Result<(), CodecError> {
        let body = CallFrameBody {
            interface_id: frame.interface_id().to_owned(),
            method_name: frame.method_name().to_owned(),
            parameter_types: frame.parameter_types().to_vec(),
            arguments: frame.arguments().to_vec(),
            flags: frame.flags(),
            user_data: frame.user_data().map(<[u8]>::to_vec),
        };
        write_frame(output, &bitcode::encode(&body))
    }

    fn deserialize(&self, input: &mut dyn Read) -> Result<Option<CallFrame>, CodecError> {
        let Some(bytes) = read_frame(input)? else {
            return Ok(None);
        };

        let body: CallFrameBody =
            bitcode::decode(&bytes).map_err(|err| CodecError::Malformed(err.to_string()))?;

        let mut frame = CallFrame::new(
            body.interface_id,
            body.method_name,
            body.parameter_types,
            body.arguments,
        )
        .map_err(|err| CodecError::Malformed(err.to_string()))?;
        frame.set_flags(body.flags);
        frame.set_user_data(body.user_data);

        Ok(Some(frame))
    }
}

impl ReturnFrameCodec for BitcodeFrameCodec {
    fn serialize(&self, frame: &ReturnFrame, output: &mut dyn Write) -> Result<(), CodecError> {
        let result = match frame.result() {
            ReturnValue::Value(value) => ReturnBody::Value(value.clone()),
            ReturnValue::Failure(failure) => ReturnBody::Failure(failure.clone()),
        };
        let body = ReturnFrameBody {
            result,
            flags: frame.flags(),
            user_data: frame.user_data().map(<[u8]>::to_vec),
        };
        write_frame(output, &bitcode::encode(&body))
    }

    fn deserialize(&self, input: &mut dyn Read) -> Result<Option<ReturnFrame>, CodecError> {
        let Some(bytes) = read_frame(input)? else {
            return Ok(None);
        };

        let body: ReturnFrameBody =
            bitcode::decode(&bytes).map_err(|err| CodecError::Malformed(err.to_string()))?;

        let mut frame = ReturnFrame::new(match body.result {
            ReturnBody::Value(value) => ReturnValue::Value(value),
            ReturnBody::Failure(failure) => ReturnValue::Failure(failure),
        });
        frame.set_flags(body.flags);
        frame.set_user_data(body.user_data);

        Ok(Some(frame))
    }
}

fn write_frame(output: &mut dyn Write, body: &[u8]) -> Result<(), CodecError> {
    if body.len() > MAX_FRAME_BODY_SIZE {
        return Err(CodecError::FrameTooLarge(body.len()));
    }

    let mut prefix = [0u8; FRAME_PREFIX_SIZE];
    prefix[0] = FRAME_SCHEMA_VERSION;
    prefix[FRAME_LENGTH_OFFSET..].copy_from_slice(&(body.len() as u32).to_le_bytes());

    output.write_all(&prefix)?;
    output.write_all(body)?;
    Ok(())
}

/// Reads one frame body. `None` if the stream ends before the version byte.
fn read_frame(input: &mut dyn Read) -> Result<Option<Vec<u8>>, CodecError> {
    let mut version = [0u8; 1];
    loop {
        match input.read(&mut version) {
            Ok(0) => return Ok(None),
            Ok(_) => break,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }

    if version[0] != FRAME_SCHEMA_VERSION {
        return Err(CodecError::UnsupportedVersion(version[0]));
    }

    let mut length = [0u8; FRAME_PREFIX_SIZE - FRAME_LENGTH_OFFSET];
    read_exact_or_truncated(input, &mut length)?;

    let length = u32::from_le_bytes(length) as usize;
    if length > MAX_FRAME_BODY_SIZE {
        return Err(CodecError::FrameTooLarge(length));
    }

    let mut body = vec![0u8; length];
    read_exact_or_truncated(input, &mut body)?;

    Ok(Some(body))
}

fn read_exact_or_truncated(input: &mut dyn Read, buf: &mut [u8]) -> Result<(), CodecError> {
    input.read_exact(buf).map_err(|err| match err.kind() {
        io::ErrorKind::UnexpectedEof => CodecError::Truncated,
        _ => CodecError::Io(err),
    })
}
