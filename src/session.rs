//! The one-frame-each-way request/response protocol.
//!
//! A call frame travels from client to server; an in-out call gets exactly one
//! return frame back. The connection survives the round trip only if both the
//! call and the return frame carry `KEEP_ALIVE`.

mod call_handler;
mod client_exchange;
mod server_loop;
mod session_error;

pub use call_handler::CallHandler;
pub use client_exchange::{Exchange, effective_keep_alive, exchange, send_in_only};
pub use server_loop::{serve_connection, serve_while_running};
pub use session_error::SessionError;
