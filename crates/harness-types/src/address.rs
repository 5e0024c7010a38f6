//! Address normalization for comparing senders and recipients.
//!
//! Nodes and client libraries disagree on how an address is rendered: some
//! return checksummed hex, some lowercase, some without the `0x` prefix, and
//! some hand back the raw 20 bytes. Every representation is decoded into an
//! [`Address`] so that comparisons are byte-wise and therefore case-insensitive.

use crate::record::RecordError;
use crate::utils::without_0x_prefix;
use alloy::primitives::Address;
use serde_json::Value;

const ADDRESS_LEN: usize = 20;

/// Decodes an address from any representation found in a transaction record.
///
/// Accepted shapes:
/// - a hex string of 40 digits, with or without `0x`, in any letter case
/// - a JSON array of exactly 20 byte values
pub fn normalize_address(value: &Value) -> Result<Address, RecordError> {
	match value {
		Value::String(s) => {
			let digits = without_0x_prefix(s.trim());
			if digits.len() != ADDRESS_LEN * 2 {
				return Err(RecordError::InvalidField {
					field: "address",
					reason: format!("expected 40 hex digits, got {}", digits.len()),
				});
			}
			let bytes = hex::decode(digits).map_err(|e| RecordError::InvalidField {
				field: "address",
				reason: e.to_string(),
			})?;
			Ok(Address::from_slice(&bytes))
		}
		Value::Array(items) => {
			if items.len() != ADDRESS_LEN {
				return Err(RecordError::InvalidField {
					field: "address",
					reason: format!("expected 20 raw bytes, got {}", items.len()),
				});
			}
			let mut bytes = [0u8; ADDRESS_LEN];
			for (slot, item) in bytes.iter_mut().zip(items) {
				*slot = item
					.as_u64()
					.and_then(|b| u8::try_from(b).ok())
					.ok_or_else(|| RecordError::InvalidField {
						field: "address",
						reason: format!("{} is not a byte", item),
					})?;
			}
			Ok(Address::from(bytes))
		}
		other => Err(RecordError::InvalidField {
			field: "address",
			reason: format!("unexpected JSON type: {}", other),
		}),
	}
}

/// Renders an address in its canonical comparable form: lowercase `0x` hex.
pub fn canonical_hex(address: &Address) -> String {
	format!("0x{}", hex::encode(address.as_slice()))
}
