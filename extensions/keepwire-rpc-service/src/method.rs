use crate::{TransportError, method_signature_id};
use keepwire::frame::{CallFrame, Value, ValueType};
use std::io;

/// A named service interface. Methods attach to it through
/// [`RpcMethod::Interface`].
pub trait RpcInterface: 'static {
    /// Name carried in every call frame, e.g. `"example.Greeting"`.
    const INTERFACE_ID: &'static str;
}

pub trait RpcMethod {
    type Interface: RpcInterface;

    const METHOD_NAME: &'static str;

    /// Declared parameter types, in call order.
    const PARAMETER_TYPES: &'static [ValueType];

    /// Failure kinds callers receive verbatim. Any other remote failure is
    /// reported as a transport failure.
    const DECLARED_FAILURES: &'static [&'static str] = &[];

    /// The high-level input type (e.g. `(i32, i32)`).
    type Input;

    /// The high-level output type returned to the caller.
    type Output;

    /// Encodes the input into one value per declared parameter.
    fn encode_arguments(input: Self::Input) -> Result<Vec<Value>, io::Error>;

    /// Decodes call arguments back into the typed input.
    fn decode_arguments(arguments: Vec<Value>) -> Result<Self::Input, io::Error>;

    fn encode_result(output: Self::Output) -> Result<Value, io::Error>;

    fn decode_result(value: Value) -> Result<Self::Output, io::Error>;

    fn signature_id() -> u64 {
        method_signature_id(Self::METHOD_NAME, Self::PARAMETER_TYPES)
    }

    /// Builds the call frame for `input`. Flags are left to the caller.
    fn call_frame(input: Self::Input) -> Result<CallFrame, TransportError> {
        let arguments = Self::encode_arguments(input)?;
        Ok(CallFrame::new(
            <Self::Interface as RpcInterface>::INTERFACE_ID,
            Self::METHOD_NAME,
            Self::PARAMETER_TYPES.to_vec(),
            arguments,
        )?)
    }
}
