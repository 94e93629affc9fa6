use crate::frame::FrameCodecs;
use crate::session::{CallHandler, SessionError};
use crate::transport::Channel;
use std::sync::atomic::{AtomicBool, Ordering};

/// Serves call frames on `channel` until the peer closes it or a round trip
/// ends without keep-alive. Returns the number of calls dispatched.
///
/// The return frame of an in-out call carries `KEEP_ALIVE` only if the call
/// asked for it and `can_keep_alive` allows it, so both ends reach the same
/// decision. The caller closes the channel afterwards.
pub fn serve_connection(
    channel: &mut dyn Channel,
    codecs: &FrameCodecs,
    handler: &dyn CallHandler,
    can_keep_alive: bool,
) -> Result<usize, SessionError> {
    serve_while_running(channel, codecs, handler, &AtomicBool::new(can_keep_alive))
}

/// Like [`serve_connection`], with keep-alive allowed only while `running`
/// is set.
///
/// Once `running` is cleared no further call is read after the current one,
/// and the reply to a call still in flight tells the client not to keep the
/// connection. The first call on a connection is always read.
pub fn serve_while_running(
    channel: &mut dyn Channel,
    codecs: &FrameCodecs,
    handler: &dyn CallHandler,
    running: &AtomicBool,
) -> Result<usize, SessionError> {
    let mut served = 0;

    loop {
        if served > 0 && !running.load(Ordering::SeqCst) {
            tracing::trace!("stopped serving after {served} calls");
            break;
        }

        let Some(call) = codecs.call.deserialize(channel.reader())? else {
            tracing::trace!("peer closed the connection between calls");
            break;
        };

        let in_out = call.is_in_out();
        let asked_keep_alive = call.is_keep_alive();

        let mut ret = handler.process(call);
        served += 1;

        let keep_alive = asked_keep_alive && running.load(Ordering::SeqCst);
        if in_out {
            ret.set_keep_alive(keep_alive);
            codecs.ret.serialize(&ret, channel.writer())?;
            channel.writer().flush()?;
        }

        if !keep_alive {
            break;
        }
    }

    Ok(served)
}
