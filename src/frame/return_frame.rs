use crate::frame::flags;
use crate::frame::{RemoteFailure, Value};

/// The payload of a [`ReturnFrame`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnValue {
    Value(Value),
    Failure(RemoteFailure),
}

/// One RPC response.
///
/// The only meaningful flag is `KEEP_ALIVE`: the server's final say on
/// whether the connection survives this round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnFrame {
    result: ReturnValue,
    flags: u32,
    user_data: Option<Vec<u8>>,
}

impl ReturnFrame {
    pub fn new(result: ReturnValue) -> Self {
        Self {
            result,
            flags: flags::NO_FLAGS,
            user_data: None,
        }
    }

    pub fn success(value: impl Into<Value>) -> Self {
        Self::new(ReturnValue::Value(value.into()))
    }

    pub fn failure(failure: RemoteFailure) -> Self {
        Self::new(ReturnValue::Failure(failure))
    }

    pub fn is_exception_result(&self) -> bool {
        matches!(self.result, ReturnValue::Failure(_))
    }

    pub fn result(&self) -> &ReturnValue {
        &self.result
    }

    pub fn into_result(self) -> ReturnValue {
        self.result
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn set_flags(&mut self, flags: u32) {
        self.flags = flags;
    }

    pub fn is_keep_alive(&self) -> bool {
        flags::is_keep_alive(self.flags)
    }

    pub fn set_keep_alive(&mut self, keep_alive: bool) {
        self.flags = flags::with_keep_alive(self.flags, keep_alive);
    }

    pub fn user_data(&self) -> Option<&[u8]> {
        self.user_data.as_deref()
    }

    pub fn has_user_data(&self) -> bool {
        self.user_data.is_some()
    }

    pub fn set_user_data(&mut self, user_data: Option<Vec<u8>>) {
        self.user_data = user_data;
    }

    /// Splits the frame into its result and user data.
    pub fn into_parts(self) -> (ReturnValue, Option<Vec<u8>>) {
        (self.result, self.user_data)
    }
}
