use keepwire::frame::{Value, ValueType};
use keepwire_rpc_service::{RpcInterface, RpcMethod, decode_value, expect_arguments};
use std::io;

pub struct Greeting;

impl RpcInterface for Greeting {
    const INTERFACE_ID: &'static str = "example.Greeting";
}

/// `greet() -> String`
pub struct Greet;

impl RpcMethod for Greet {
    type Interface = Greeting;
    const METHOD_NAME: &'static str = "greet";
    const PARAMETER_TYPES: &'static [ValueType] = &[];

    type Input = ();
    type Output = String;

    fn encode_arguments(_: Self::Input) -> Result<Vec<Value>, io::Error> {
        Ok(Vec::new())
    }

    fn decode_arguments(arguments: Vec<Value>) -> Result<Self::Input, io::Error> {
        let [] = expect_arguments::<0>(arguments)?;
        Ok(())
    }

    fn encode_result(output: Self::Output) -> Result<Value, io::Error> {
        Ok(output.into())
    }

    fn decode_result(value: Value) -> Result<Self::Output, io::Error> {
        decode_value(value)
    }
}
