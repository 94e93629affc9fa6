use keepwire::ConfigurationError;
use keepwire::frame::{CodecError, RemoteFailure};
use keepwire::session::SessionError;
use std::io;
use thiserror::Error;

/// Anything that went wrong around a call, as opposed to inside it.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("the server closed the connection without a response")]
    NoResponse,

    /// The server raised a failure the method does not declare.
    #[error("undeclared remote failure: {0}")]
    UndeclaredFailure(RemoteFailure),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("the result has an unexpected type: {0}")]
    ResultType(#[source] io::Error),
}

impl From<SessionError> for TransportError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Io(err) | SessionError::Codec(CodecError::Io(err)) => {
                TransportError::Io(err)
            }
            SessionError::Codec(err) => TransportError::Codec(err),
            SessionError::NoResponse => TransportError::NoResponse,
        }
    }
}

#[derive(Debug, Error)]
pub enum CallError {
    /// A failure the method declares, exactly as the endpoint raised it.
    #[error(transparent)]
    Remote(RemoteFailure),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl CallError {
    pub fn remote_failure(&self) -> Option<&RemoteFailure> {
        match self {
            CallError::Remote(failure) => Some(failure),
            CallError::Transport(TransportError::UndeclaredFailure(failure)) => Some(failure),
            CallError::Transport(_) => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, CallError::Transport(_))
    }
}

impl From<SessionError> for CallError {
    fn from(err: SessionError) -> Self {
        CallError::Transport(err.into())
    }
}

impl From<io::Error> for CallError {
    fn from(err: io::Error) -> Self {
        CallError::Transport(err.into())
    }
}

impl From<ConfigurationError> for CallError {
    fn from(err: ConfigurationError) -> Self {
        CallError::Transport(err.into())
    }
}
