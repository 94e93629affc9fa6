mod method;
pub use method::*;

mod arguments;
pub use arguments::*;

mod caller;
pub use caller::*;

pub mod error;
pub use error::{CallError, TransportError};

mod signature;
pub use signature::*;
