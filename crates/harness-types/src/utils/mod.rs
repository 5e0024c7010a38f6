//! Utility functions for hex strings and token amounts.

pub mod formatting;

pub use formatting::{format_units, truncate_id, with_0x_prefix, without_0x_prefix};

/// Decimals of the native token on every EVM chain the harness targets.
pub const NATIVE_DECIMALS: u8 = 18;
