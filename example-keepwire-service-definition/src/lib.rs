//! Interfaces shared by the example app, the benches and the integration
//! tests of the socket crates.

pub mod echo;
pub mod greeting;
pub mod some_test_methods;
pub mod throw_exception;
