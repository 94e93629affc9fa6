//! Bit flags carried by call and return frames.
//!
//! The low byte holds connection flags, bits 8-9 the message exchange
//! pattern, and the upper 16 bits are reserved for extensions.

pub const NO_FLAGS: u32 = 0;

/// The sender wishes to reuse the connection after this round trip.
pub const KEEP_ALIVE: u32 = 0x0000_0001;

/// The caller expects a return frame.
pub const MEP_IN_OUT: u32 = 0x0000_0100;

/// The caller expects no return frame.
pub const MEP_IN_ONLY: u32 = 0x0000_0200;

pub const MEP_MASK: u32 = MEP_IN_OUT | MEP_IN_ONLY;

/// Reserved for extension-defined flags.
pub const CUSTOM_MASK: u32 = 0xFFFF_0000;

/// Message exchange pattern of a call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExchangePattern {
    InOut,
    InOnly,
}

impl ExchangePattern {
    pub fn bits(self) -> u32 {
        match self {
            ExchangePattern::InOut => MEP_IN_OUT,
            ExchangePattern::InOnly => MEP_IN_ONLY,
        }
    }
}

pub fn is_keep_alive(flags: u32) -> bool {
    flags & KEEP_ALIVE != 0
}

pub fn with_keep_alive(flags: u32, keep_alive: bool) -> u32 {
    if keep_alive {
        flags | KEEP_ALIVE
    } else {
        flags & !KEEP_ALIVE
    }
}

/// `None` when neither pattern bit is set.
pub fn exchange_pattern(flags: u32) -> Option<ExchangePattern> {
    match flags & MEP_MASK {
        MEP_IN_OUT => Some(ExchangePattern::InOut),
        MEP_IN_ONLY => Some(ExchangePattern::InOnly),
        _ => None,
    }
}

/// Replaces whatever pattern is set with `pattern`.
pub fn with_exchange_pattern(flags: u32, pattern: ExchangePattern) -> u32 {
    (flags & !MEP_MASK) | pattern.bits()
}

pub fn custom_bits(flags: u32) -> u32 {
    flags & CUSTOM_MASK
}
