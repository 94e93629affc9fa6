//! TLS over blocking sockets, driven through an engine-style session.
//!
//! A [`TlsEngine`] only transforms bytes: `wrap` turns plaintext into TLS
//! records and `unwrap` does the reverse. [`RecordTransport`] owns the socket
//! and the two ciphertext buffers and pumps bytes between the engine and the
//! network for the handshake, application data and the closing exchange.

mod engine;
mod engine_factory;
mod record_transport;
mod rustls_engine;
mod tls_settings;

pub use engine::{EngineResult, EngineStatus, HandshakeStatus, TlsEngine};
pub use engine_factory::{RustlsEngineFactory, TlsEngineFactory};
pub use record_transport::RecordTransport;
pub use rustls_engine::RustlsEngine;
pub use tls_settings::{KeyMaterial, StoreFormat, TlsProtocol, TlsSettings, TrustMaterial};
