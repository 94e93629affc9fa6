#[cfg(doctest)]
doc_comment::doctest!("../README.md");

pub mod constants;
pub mod cookie;
pub mod error;
pub mod frame;
pub mod io;
pub mod session;
pub mod tls;
pub mod transport;

pub use error::ConfigurationError;
