use keepwire::ConfigurationError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Binding the listening socket or spawning a worker failed.
    #[error("connector I/O failed: {0}")]
    Io(#[from] io::Error),
}
