use crate::frame::{CallFrame, FrameCodecs, ReturnFrame, flags};
use crate::session::SessionError;
use crate::transport::Channel;
use std::time::Instant;

/// Result of one in-out round trip.
#[derive(Debug)]
pub struct Exchange {
    pub return_frame: ReturnFrame,
    /// Whether the connection may carry the next call.
    pub keep_alive: bool,
}

/// Keep-alive for a round trip: both the request and the response must ask
/// for it.
pub fn effective_keep_alive(request_flags: u32, response_flags: u32) -> bool {
    flags::is_keep_alive(request_flags) && flags::is_keep_alive(response_flags)
}

/// Sends `call` and waits for its return frame.
///
/// `deadline` bounds every blocking read and write of this round trip.
pub fn exchange(
    channel: &mut dyn Channel,
    codecs: &FrameCodecs,
    call: &CallFrame,
    deadline: Option<Instant>,
) -> Result<Exchange, SessionError> {
    channel.set_deadline(deadline)?;

    codecs.call.serialize(call, channel.writer())?;
    channel.writer().flush()?;

    let return_frame = codecs
        .ret
        .deserialize(channel.reader())?
        .ok_or(SessionError::NoResponse)?;

    let keep_alive = effective_keep_alive(call.flags(), return_frame.flags());

    Ok(Exchange {
        return_frame,
        keep_alive,
    })
}

/// Sends an in-only `call`. Nothing is read back.
pub fn send_in_only(
    channel: &mut dyn Channel,
    codecs: &FrameCodecs,
    call: &CallFrame,
    deadline: Option<Instant>,
) -> Result<(), SessionError> {
    channel.set_deadline(deadline)?;

    codecs.call.serialize(call, channel.writer())?;
    channel.writer().flush()?;
    Ok(())
}
