use keepwire::cookie;
use keepwire::frame::{CallFrame, ExchangePattern, Value};
use keepwire::session::CallHandler;
use keepwire_rpc_service::{CallError, RpcCaller, resolve_return};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Calls a session handler in the same process, on the calling thread.
///
/// Frames are flagged and cookies exchanged exactly as [`SocketClient`]
/// does, and a simulated session follows the same keep-alive rule, so code
/// written against a socket client behaves the same here.
///
/// [`SocketClient`]: crate::SocketClient
pub struct LocalClient {
    handler: Arc<dyn CallHandler>,
    keep_alive: bool,
    send_cookies: bool,
    accept_cookies: bool,
    connected: AtomicBool,
    sessions_opened: AtomicUsize,
}

impl LocalClient {
    pub fn new(handler: Arc<dyn CallHandler>) -> Self {
        Self {
            handler,
            keep_alive: true,
            send_cookies: false,
            accept_cookies: false,
            connected: AtomicBool::new(false),
            sessions_opened: AtomicUsize::new(0),
        }
    }

    pub fn with_keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn with_cookies(mut self, send_cookies: bool, accept_cookies: bool) -> Self {
        self.send_cookies = send_cookies;
        self.accept_cookies = accept_cookies;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Sessions started over the client's lifetime.
    pub fn connection_count(&self) -> usize {
        self.sessions_opened.load(Ordering::SeqCst)
    }

    pub fn dispose(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    fn open_session(&self) {
        if !self.connected.swap(true, Ordering::SeqCst) {
            self.sessions_opened.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Runs `call` through the handler. The caller's cookie is restored
    /// afterwards; a handler that installs its own must not leak it here.
    fn dispatch(&self, mut call: CallFrame, pattern: ExchangePattern) -> keepwire::frame::ReturnFrame {
        call.set_exchange_pattern(pattern);
        call.set_keep_alive(self.keep_alive);

        let caller_cookie = cookie::get();
        if self.send_cookies {
            call.set_user_data(caller_cookie.clone());
        }

        self.open_session();
        let mut ret = self.handler.process(call);
        cookie::set(caller_cookie);

        ret.set_keep_alive(self.keep_alive);
        if !self.keep_alive {
            self.dispose();
        }
        ret
    }
}

impl RpcCaller for LocalClient {
    fn invoke(&self, call: CallFrame, declared_failures: &[&str]) -> Result<Value, CallError> {
        let ret = self.dispatch(call, ExchangePattern::InOut);

        let (result, user_data) = ret.into_parts();
        if self.accept_cookies {
            cookie::set(user_data);
        }
        resolve_return(result, declared_failures)
    }

    fn invoke_in_only(&self, call: CallFrame) -> Result<(), CallError> {
        self.dispatch(call, ExchangePattern::InOnly);
        Ok(())
    }
}
