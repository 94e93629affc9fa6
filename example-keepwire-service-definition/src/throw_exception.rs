use keepwire::frame::{Value, ValueType};
use keepwire_rpc_service::{RpcInterface, RpcMethod, decode_value, expect_arguments};
use std::io;

pub struct ThrowException;

impl RpcInterface for ThrowException {
    const INTERFACE_ID: &'static str = "example.ThrowException";
}

/// Failure kind declared by [`ThrowDeclared`].
pub const IO_EXCEPTION: &str = "IOException";

/// Message every implementation of [`ThrowDeclared`] fails with.
pub const TEST_EXCEPTION_MESSAGE: &str = "A test exception.";

/// `throw_exception(String)`, declaring `IOException`.
pub struct ThrowDeclared;

impl RpcMethod for ThrowDeclared {
    type Interface = ThrowException;
    const METHOD_NAME: &'static str = "throw_exception";
    const PARAMETER_TYPES: &'static [ValueType] = &[ValueType::Str];
    const DECLARED_FAILURES: &'static [&'static str] = &[IO_EXCEPTION];

    type Input = String;
    type Output = ();

    fn encode_arguments(input: Self::Input) -> Result<Vec<Value>, io::Error> {
        Ok(vec![input.into()])
    }

    fn decode_arguments(arguments: Vec<Value>) -> Result<Self::Input, io::Error> {
        let [argument] = expect_arguments::<1>(arguments)?;
        decode_value(argument)
    }

    fn encode_result(_: Self::Output) -> Result<Value, io::Error> {
        Ok(Value::Null)
    }

    fn decode_result(value: Value) -> Result<Self::Output, io::Error> {
        decode_value(value)
    }
}
