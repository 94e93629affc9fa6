//! Thread-local correlation payload ("cookie").
//!
//! Clients that send cookies attach the current thread's value to each call
//! frame; servers that accept them install the caller's value on the worker
//! thread for the duration of one dispatch.

use std::cell::RefCell;

thread_local! {
    static COOKIE: RefCell<Option<Vec<u8>>> = const { RefCell::new(None) };
}

/// Returns a copy of this thread's cookie.
pub fn get() -> Option<Vec<u8>> {
    COOKIE.with(|cookie| cookie.borrow().clone())
}

/// Replaces this thread's cookie. `None` clears it.
pub fn set(value: Option<Vec<u8>>) {
    COOKIE.with(|cookie| *cookie.borrow_mut() = value);
}

pub fn clear() {
    set(None);
}

pub fn is_set() -> bool {
    COOKIE.with(|cookie| cookie.borrow().is_some())
}
