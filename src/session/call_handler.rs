use crate::frame::{CallFrame, ReturnFrame};

/// Server-side dispatcher a session loop hands each call to.
///
/// Implementations never fail: endpoint failures are reported through an
/// exception [`ReturnFrame`].
pub trait CallHandler: Send + Sync {
    fn process(&self, call: CallFrame) -> ReturnFrame;
}

impl<F> CallHandler for F
where
    F: Fn(CallFrame) -> ReturnFrame + Send + Sync,
{
    fn process(&self, call: CallFrame) -> ReturnFrame {
        self(call)
    }
}
