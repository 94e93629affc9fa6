mod connector_config;
pub use connector_config::*;

mod connector_error;
pub use connector_error::*;

mod connection_security;
pub use connection_security::*;

mod socket_connector;
pub use socket_connector::*;

mod worker_pool;
