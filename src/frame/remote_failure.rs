use bitcode::{Decode, Encode};
use thiserror::Error;

/// Where a [`RemoteFailure`] was raised.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Encode, Decode)]
pub enum FailureOrigin {
    /// Raised by the endpoint implementation itself.
    Endpoint,
    /// Raised by the dispatch machinery around the endpoint (unknown
    /// interface or method, bad arguments, a panicking handler).
    Framework,
}

/// A failure propagated from the server to the caller inside a return frame.
#[derive(Debug, Clone, PartialEq, Encode, Decode, Error)]
#[error("{kind}: {message}")]
pub struct RemoteFailure {
    pub kind: String,
    /// Broader kinds this failure also counts as, most specific first. A
    /// caller that declares any of them receives the failure as declared.
    pub supertypes: Vec<String>,
    pub message: String,
    pub trace: Vec<String>,
    pub origin: FailureOrigin,
}

impl RemoteFailure {
    pub const NO_INTERFACE: &'static str = "NoInterface";
    pub const NO_SUCH_METHOD: &'static str = "NoSuchMethod";
    pub const INVALID_ARGUMENTS: &'static str = "InvalidArguments";
    pub const PANIC: &'static str = "Panic";

    /// A failure raised by endpoint code.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            supertypes: Vec::new(),
            message: message.into(),
            trace: Vec::new(),
            origin: FailureOrigin::Endpoint,
        }
    }

    /// A failure raised by the dispatch machinery.
    pub fn framework(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            origin: FailureOrigin::Framework,
            ..Self::new(kind, message)
        }
    }

    /// Marks this failure as also being a `supertype`.
    pub fn with_supertype(mut self, supertype: impl Into<String>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }

    /// `true` if this failure is `kind` or one of its subtypes.
    pub fn is_kind_of(&self, kind: &str) -> bool {
        self.kind == kind || self.supertypes.iter().any(|supertype| supertype == kind)
    }

    pub fn with_trace_line(mut self, line: impl Into<String>) -> Self {
        self.trace.push(line.into());
        self
    }

    pub fn is_framework_failure(&self) -> bool {
        self.origin == FailureOrigin::Framework
    }
}
