use crate::ConfigurationError;
use crate::frame::flags::{self, ExchangePattern};
use crate::frame::{Value, ValueType};

/// One RPC request.
///
/// Everything except `flags` and `user_data` is fixed at construction.
/// Equality is structural over all fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CallFrame {
    interface_id: String,
    method_name: String,
    parameter_types: Vec<ValueType>,
    arguments: Vec<Value>,
    flags: u32,
    user_data: Option<Vec<u8>>,
}

impl CallFrame {
    /// Builds a frame with no flags and no user data.
    ///
    /// Fails when a name is empty or when the number of parameter types does
    /// not match the number of arguments.
    pub fn new(
        interface_id: impl Into<String>,
        method_name: impl Into<String>,
        parameter_types: Vec<ValueType>,
        arguments: Vec<Value>,
    ) -> Result<Self, ConfigurationError> {
        let interface_id = interface_id.into();
        let method_name = method_name.into();

        if interface_id.is_empty() {
            return Err(ConfigurationError::MissingInterface);
        }
        if method_name.is_empty() {
            return Err(ConfigurationError::MissingMethodName);
        }
        if parameter_types.len() != arguments.len() {
            return Err(ConfigurationError::ArityMismatch {
                types: parameter_types.len(),
                arguments: arguments.len(),
            });
        }

        Ok(Self {
            interface_id,
            method_name,
            parameter_types,
            arguments,
            flags: flags::NO_FLAGS,
            user_data: None,
        })
    }

    pub fn interface_id(&self) -> &str {
        &self.interface_id
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn parameter_types(&self) -> &[ValueType] {
        &self.parameter_types
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub fn has_parameters(&self) -> bool {
        !self.parameter_types.is_empty()
    }

    /// Hands the arguments over to a dispatcher.
    pub fn take_arguments(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.arguments)
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

    pub fn exchange_pattern(&self) -> Option<ExchangePattern> {
        flags::exchange_pattern(self.flags)
    }

    pub fn is_in_out(&self) -> bool {
        self.exchange_pattern() == Some(ExchangePattern::InOut)
    }

    pub fn is_in_only(&self) -> bool {
        self.exchange_pattern() == Some(ExchangePattern::InOnly)
    }

    pub fn set_exchange_pattern(&mut self, pattern: ExchangePattern) {
        self.flags = flags::with_exchange_pattern(self.flags, pattern);
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

    /// `interface#method`, as used in log lines.
    pub fn qualified_method_name(&self) -> String {
        format!("{}#{}", self.interface_id, self.method_name)
    }
}
