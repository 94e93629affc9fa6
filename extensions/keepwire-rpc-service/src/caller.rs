use crate::{CallError, RpcMethod, TransportError};
use keepwire::frame::{CallFrame, ReturnValue, Value};

/// Anything that can carry a call frame to a session handler: a socket
/// client, an in-process client, a test double.
pub trait RpcCaller {
    /// Sends an in-out call and returns its result.
    ///
    /// Remote failures that are a kind in `declared_failures`, or a subtype
    /// of one, come back as [`CallError::Remote`]; all others as a transport
    /// failure.
    fn invoke(&self, call: CallFrame, declared_failures: &[&str]) -> Result<Value, CallError>;

    /// Sends an in-only call. Nothing is read back.
    fn invoke_in_only(&self, call: CallFrame) -> Result<(), CallError>;
}

/// Maps a return frame's payload onto the caller's view of it.
pub fn resolve_return(result: ReturnValue, declared_failures: &[&str]) -> Result<Value, CallError> {
    match result {
        ReturnValue::Value(value) => Ok(value),
        ReturnValue::Failure(failure)
            if !failure.is_framework_failure()
                && declared_failures
                    .iter()
                    .any(|declared| failure.is_kind_of(declared)) =>
        {
            Err(CallError::Remote(failure))
        }
        ReturnValue::Failure(failure) => {
            Err(TransportError::UndeclaredFailure(failure).into())
        }
    }
}

/// Performs a typed in-out call of method `T` through `caller`.
pub fn call_rpc<T, C>(caller: &C, input: T::Input) -> Result<T::Output, CallError>
where
    T: RpcMethod,
    C: RpcCaller + ?Sized,
{
    let value = caller.invoke(T::call_frame(input)?, T::DECLARED_FAILURES)?;
    T::decode_result(value).map_err(|err| TransportError::ResultType(err).into())
}

/// `.call()` sugar for every [`RpcMethod`].
pub trait RpcCall: RpcMethod {
    fn call<C>(caller: &C, input: Self::Input) -> Result<Self::Output, CallError>
    where
        C: RpcCaller + ?Sized;

    fn call_in_only<C>(caller: &C, input: Self::Input) -> Result<(), CallError>
    where
        C: RpcCaller + ?Sized;
}

impl<T: RpcMethod> RpcCall for T {
    fn call<C>(caller: &C, input: Self::Input) -> Result<Self::Output, CallError>
    where
        C: RpcCaller + ?Sized,
    {
        call_rpc::<T, C>(caller, input)
    }

    fn call_in_only<C>(caller: &C, input: Self::Input) -> Result<(), CallError>
    where
        C: RpcCaller + ?Sized,
    {
        caller.invoke_in_only(T::call_frame(input)?)
    }
}
