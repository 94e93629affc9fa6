//! Established, exclusively owned byte channels the session protocol runs on.

mod channel;
mod tcp_channel;
mod tls_channel;

pub use channel::{Channel, apply_deadline};
pub use tcp_channel::{SocketDrain, SocketRefill, TcpChannel};
pub use tls_channel::TlsChannel;
