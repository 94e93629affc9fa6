//! Stream adapters over bounded, position/limit byte windows.
//!
//! Codecs speak `Read`/`Write`; the transports underneath speak in windows.
//! [`BufferInput`] and [`BufferOutput`] bridge the two through an injected
//! [`Refill`] or [`Drain`] callback.

mod buffer_input;
mod buffer_output;
mod cursor_buffer;

pub use buffer_input::{BufferInput, Refill};
pub use buffer_output::{BufferOutput, Drain, WriteMode};
pub use cursor_buffer::CursorBuffer;
