use keepwire::frame::{Value, ValueType};
use keepwire_rpc_service::{RpcInterface, RpcMethod, decode_value, expect_arguments};
use std::io;

pub struct SomeTestMethods;

impl RpcInterface for SomeTestMethods {
    const INTERFACE_ID: &'static str = "example.SomeTestMethods";
}

/// `add(i32, i32) -> i32`
pub struct Add;

impl RpcMethod for Add {
    type Interface = SomeTestMethods;
    const METHOD_NAME: &'static str = "add";
    const PARAMETER_TYPES: &'static [ValueType] = &[ValueType::Int, ValueType::Int];

    type Input = (i32, i32);
    type Output = i32;

    fn encode_arguments((a, b): Self::Input) -> Result<Vec<Value>, io::Error> {
        Ok(vec![a.into(), b.into()])
    }

    fn decode_arguments(arguments: Vec<Value>) -> Result<Self::Input, io::Error> {
        let [a, b] = expect_arguments::<2>(arguments)?;
        Ok((decode_value(a)?, decode_value(b)?))
    }

    fn encode_result(output: Self::Output) -> Result<Value, io::Error> {
        Ok(output.into())
    }

    fn decode_result(value: Value) -> Result<Self::Output, io::Error> {
        decode_value(value)
    }
}

/// `log(String)`, meant to be sent in-only.
pub struct Log;

impl RpcMethod for Log {
    type Interface = SomeTestMethods;
    const METHOD_NAME: &'static str = "log";
    const PARAMETER_TYPES: &'static [ValueType] = &[ValueType::Str];

    type Input = String;
    type Output = ();

    fn encode_arguments(input: Self::Input) -> Result<Vec<Value>, io::Error> {
        Ok(vec![input.into()])
    }

    fn decode_arguments(arguments: Vec<Value>) -> Result<Self::Input, io::Error> {
        let [message] = expect_arguments::<1>(arguments)?;
        decode_value(message)
    }

    fn encode_result(_: Self::Output) -> Result<Value, io::Error> {
        Ok(Value::Null)
    }

    fn decode_result(value: Value) -> Result<Self::Output, io::Error> {
        decode_value(value)
    }
}

/// `sleep(millis: i64)`: holds the worker for a while.
pub struct Sleep;

impl RpcMethod for Sleep {
    type Interface = SomeTestMethods;
    const METHOD_NAME: &'static str = "sleep";
    const PARAMETER_TYPES: &'static [ValueType] = &[ValueType::Int];

    type Input = i64;
    type Output = ();

    fn encode_arguments(input: Self::Input) -> Result<Vec<Value>, io::Error> {
        Ok(vec![input.into()])
    }

    fn decode_arguments(arguments: Vec<Value>) -> Result<Self::Input, io::Error> {
        let [millis] = expect_arguments::<1>(arguments)?;
        decode_value(millis)
    }

    fn encode_result(_: Self::Output) -> Result<Value, io::Error> {
        Ok(Value::Null)
    }

    fn decode_result(value: Value) -> Result<Self::Output, io::Error> {
        decode_value(value)
    }
}

/// `throw_exception()`: declares nothing, so whatever it raises reaches the
/// caller as a transport failure.
pub struct ThrowUndeclared;

impl RpcMethod for ThrowUndeclared {
    type Interface = SomeTestMethods;
    const METHOD_NAME: &'static str = "throw_exception";
    const PARAMETER_TYPES: &'static [ValueType] = &[];

    type Input = ();
    type Output = ();

    fn encode_arguments(_: Self::Input) -> Result<Vec<Value>, io::Error> {
        Ok(Vec::new())
    }

    fn decode_arguments(arguments: Vec<Value>) -> Result<Self::Input, io::Error> {
        let [] = expect_arguments::<0>(arguments)?;
        Ok(())
    }

    fn encode_result(_: Self::Output) -> Result<Value, io::Error> {
        Ok(Value::Null)
    }

    fn decode_result(value: Value) -> Result<Self::Output, io::Error> {
        decode_value(value)
    }
}
