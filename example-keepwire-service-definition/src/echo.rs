use keepwire::frame::{Value, ValueType};
use keepwire_rpc_service::{RpcInterface, RpcMethod, decode_value, expect_arguments};
use std::io;

pub struct Echo;

impl RpcInterface for Echo {
    const INTERFACE_ID: &'static str = "example.Echo";
}

/// `echo(String) -> String`
pub struct EchoText;

impl RpcMethod for EchoText {
    type Interface = Echo;
    const METHOD_NAME: &'static str = "echo";
    const PARAMETER_TYPES: &'static [ValueType] = &[ValueType::Str];

    type Input = String;
    type Output = String;

    fn encode_arguments(input: Self::Input) -> Result<Vec<Value>, io::Error> {
        Ok(vec![input.into()])
    }

    fn decode_arguments(arguments: Vec<Value>) -> Result<Self::Input, io::Error> {
        let [text] = expect_arguments::<1>(arguments)?;
        decode_value(text)
    }

    fn encode_result(output: Self::Output) -> Result<Value, io::Error> {
        Ok(output.into())
    }

    fn decode_result(value: Value) -> Result<Self::Output, io::Error> {
        decode_value(value)
    }
}

/// `echo(Vec<u8>) -> Vec<u8>`: the same method name, overloaded on the
/// parameter type.
pub struct EchoBytes;

impl RpcMethod for EchoBytes {
    type Interface = Echo;
    const METHOD_NAME: &'static str = "echo";
    const PARAMETER_TYPES: &'static [ValueType] = &[ValueType::Bytes];

    type Input = Vec<u8>;
    type Output = Vec<u8>;

    fn encode_arguments(input: Self::Input) -> Result<Vec<Value>, io::Error> {
        Ok(vec![input.into()])
    }

    fn decode_arguments(arguments: Vec<Value>) -> Result<Self::Input, io::Error> {
        let [bytes] = expect_arguments::<1>(arguments)?;
        decode_value(bytes)
    }

    fn encode_result(output: Self::Output) -> Result<Value, io::Error> {
        Ok(output.into())
    }

    fn decode_result(value: Value) -> Result<Self::Output, io::Error> {
        decode_value(value)
    }
}
