mod client_config;
pub use client_config::*;

mod socket_client;
pub use socket_client::*;

mod local_client;
pub use local_client::*;
