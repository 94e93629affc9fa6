use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Instant;

/// One established connection, used by exactly one thread at a time.
pub trait Channel: Send {
    fn reader(&mut self) -> &mut dyn Read;

    fn writer(&mut self) -> &mut dyn Write;

    /// Bounds every blocking read and write until `deadline`. `None` lifts
    /// the bound.
    fn set_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()>;

    fn peer_addr(&self) -> Option<SocketAddr>;

    /// Closes the channel, running any closing exchange first. Failures are
    /// logged; closing twice is a no-op.
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}

/// Turns a deadline into socket timeouts on `stream`. Fails with `TimedOut`
/// if the deadline already passed.
pub fn apply_deadline(stream: &TcpStream, deadline: Option<Instant>) -> io::Result<()> {
    let timeout = match deadline {
        Some(deadline) => {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "the call deadline has passed",
                ));
            }
            Some(left)
        }
        None => None,
    };

    stream.set_read_timeout(timeout)?;
    stream.set_write_timeout(timeout)
}
