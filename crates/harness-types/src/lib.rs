//! Common types for the EVM transaction test harness.
//!
//! This crate defines the data model shared by every harness component:
//! transaction hashes and receipts, decoded transaction records, blocks as
//! returned by a chain node, network descriptors and secret handling.

/// Canonical address normalization.
pub mod address;
/// Transaction hashes, receipts and submission requests.
pub mod delivery;
/// Network descriptors keyed by network name.
pub mod networks;
/// Decoded transaction records and raw blocks.
pub mod record;
/// Redacting wrapper for private keys.
pub mod secret_string;
/// Formatting helpers for hex strings and token amounts.
pub mod utils;

pub use address::{canonical_hex, normalize_address};
pub use delivery::*;
pub use networks::{NetworkConfig, NetworksConfig};
pub use record::{Block, MatchMode, RecordError, TransactionRecord};
pub use secret_string::SecretString;
pub use utils::{
	format_units, truncate_id, with_0x_prefix, without_0x_prefix, NATIVE_DECIMALS,
};

pub use alloy::primitives::{Address, B256, U256};
