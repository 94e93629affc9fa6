use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Raised synchronously while configuring a component or starting it.
/// Never produced from inside a worker loop.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("{name} must be at least 1, got {value}")]
    InvalidPoolSize { name: &'static str, value: usize },

    #[error("{name} must be greater than zero")]
    InvalidTimeout { name: &'static str },

    #[error("the component is already running")]
    AlreadyRunning,

    #[error("the component is not running")]
    NotRunning,

    #[error("no session handler is attached")]
    MissingHandler,

    #[error("no binding address is configured")]
    MissingBindAddress,

    #[error("no service address is configured")]
    MissingServiceAddress,

    #[error("no port is configured")]
    MissingPort,

    #[error("cannot resolve address `{0}`")]
    UnresolvableAddress(String),

    #[error("no interface name")]
    MissingInterface,

    #[error("no method name")]
    MissingMethodName,

    #[error(
        "the number of parameter types ({types}) does not match the number of arguments ({arguments})"
    )]
    ArityMismatch { types: usize, arguments: usize },

    #[error("{0} is already registered as an interface")]
    AlreadyRegistered(String),

    #[error("{0} does not implement an interface")]
    NoInterface(String),

    #[error("{0} implements multiple interfaces")]
    MultipleInterfaces(String),

    #[error("unknown TLS protocol name `{0}`")]
    UnknownTlsProtocol(String),

    #[error("invalid TLS material: {0}")]
    TlsMaterial(String),

    #[error("cannot read TLS material from {path}: {source}")]
    TlsMaterialIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("TLS configuration rejected: {0}")]
    Tls(#[from] rustls::Error),
}
