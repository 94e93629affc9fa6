use crate::EndpointRegistry;
use keepwire::cookie;
use keepwire::frame::{CallFrame, ExchangePattern, RemoteFailure, ReturnFrame, Value};
use keepwire::session::CallHandler;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// How an [`RpcServiceEndpoint`] treats cookies and failure logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointPolicy {
    /// Install the caller's cookie on the worker thread for each dispatch.
    pub accept_cookies: bool,
    /// Return the worker thread's cookie in each successful return frame.
    pub send_cookies: bool,
    pub log_in_only_failures: bool,
    pub log_in_out_failures: bool,
}

impl Default for EndpointPolicy {
    fn default() -> Self {
        Self {
            accept_cookies: false,
            send_cookies: false,
            log_in_only_failures: true,
            log_in_out_failures: true,
        }
    }
}

impl EndpointPolicy {
    /// Whether a failed call with this exchange pattern is logged. Calls
    /// flagged neither in-only nor in-out never are.
    pub fn logs_failures_of(&self, pattern: Option<ExchangePattern>) -> bool {
        match pattern {
            Some(ExchangePattern::InOnly) => self.log_in_only_failures,
            Some(ExchangePattern::InOut) => self.log_in_out_failures,
            None => false,
        }
    }
}

/// Dispatches call frames to the implementations in an [`EndpointRegistry`].
///
/// Never fails: unknown interfaces and methods, undecodable arguments,
/// endpoint failures and panics all become exception return frames.
#[derive(Debug, Clone)]
pub struct RpcServiceEndpoint {
    registry: Arc<EndpointRegistry>,
    policy: EndpointPolicy,
}

impl RpcServiceEndpoint {
    pub fn new(registry: Arc<EndpointRegistry>) -> Self {
        Self::with_policy(registry, EndpointPolicy::default())
    }

    pub fn with_policy(registry: Arc<EndpointRegistry>, policy: EndpointPolicy) -> Self {
        Self { registry, policy }
    }

    pub fn registry(&self) -> &Arc<EndpointRegistry> {
        &self.registry
    }

    pub fn policy(&self) -> EndpointPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: EndpointPolicy) {
        self.policy = policy;
    }

    fn dispatch(&self, call: &mut CallFrame) -> Result<Value, RemoteFailure> {
        let table = self.registry.lookup(call.interface_id()).ok_or_else(|| {
            RemoteFailure::framework(
                RemoteFailure::NO_INTERFACE,
                format!(
                    "{} is not a registered service endpoint interface.",
                    call.interface_id()
                ),
            )
        })?;

        let method = table
            .find(call.method_name(), call.parameter_types())
            .ok_or_else(|| {
                RemoteFailure::framework(
                    RemoteFailure::NO_SUCH_METHOD,
                    format!(
                        "{}({:?})",
                        call.qualified_method_name(),
                        call.parameter_types()
                    ),
                )
            })?;

        method.invoke(call.take_arguments())
    }

}

impl CallHandler for RpcServiceEndpoint {
    fn process(&self, mut call: CallFrame) -> ReturnFrame {
        if self.policy.accept_cookies {
            cookie::set(call.user_data().map(<[u8]>::to_vec));
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(&mut call)))
            .unwrap_or_else(|payload| {
                Err(RemoteFailure::framework(
                    RemoteFailure::PANIC,
                    panic_message(payload.as_ref()),
                ))
            });

        // Only a successful reply carries the worker's cookie back.
        let ret = match result {
            Ok(value) => {
                let mut ret = ReturnFrame::success(value);
                if self.policy.send_cookies {
                    ret.set_user_data(cookie::get());
                }
                ret
            }
            Err(failure) => {
                if self.policy.logs_failures_of(call.exchange_pattern()) {
                    tracing::error!(
                        failure = %failure,
                        framework = failure.is_framework_failure(),
                        "error in call to {}",
                        call.qualified_method_name()
                    );
                }
                ReturnFrame::failure(failure)
            }
        };

        if self.policy.accept_cookies || self.policy.send_cookies {
            cookie::clear();
        }

        ret
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "endpoint panicked".to_owned()
    }
}
