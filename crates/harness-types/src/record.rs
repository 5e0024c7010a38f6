//! Transaction records and blocks as returned by a chain node.
//!
//! Blocks keep their transactions as raw JSON. Each entry is decoded on its
//! own with [`TransactionRecord::from_json`], so a single entry with a missing
//! or oddly shaped field only costs that entry, not the whole block.

use crate::address::normalize_address;
use crate::delivery::TransactionHash;
use crate::utils::without_0x_prefix;
use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use thiserror::Error;

/// Reasons a single transaction entry could not be decoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
	/// The entry is not a JSON object (e.g. a bare hash).
	#[error("Transaction entry is not an object: {0}")]
	NotAnObject(String),
	/// A required field is absent or null.
	#[error("Missing field: {0}")]
	MissingField(&'static str),
	/// A field is present but cannot be decoded.
	#[error("Invalid value for field '{field}': {reason}")]
	InvalidField { field: &'static str, reason: String },
}

/// One decoded transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
	pub hash: TransactionHash,
	pub from: Address,
	/// `None` for contract creation.
	pub to: Option<Address>,
	/// Value transferred in wei.
	pub value: U256,
	/// Gas limit.
	pub gas: u64,
	/// Legacy gas price, or the fee cap for dynamic-fee transactions.
	pub gas_price: Option<u128>,
	pub block_number: Option<u64>,
	pub transaction_index: Option<u64>,
}

impl TransactionRecord {
	/// Decodes a transaction object from an `eth_getBlockByNumber` response.
	///
	/// `hash`, `from`, `value` and `gas` are required. The remaining fields
	/// are best effort: absent or undecodable values become `None`, so an odd
	/// recipient or index never hides an otherwise usable entry.
	pub fn from_json(entry: &Value) -> Result<Self, RecordError> {
		let obj = entry
			.as_object()
			.ok_or_else(|| RecordError::NotAnObject(entry.to_string()))?;

		let hash = required(obj, "hash")?
			.as_str()
			.and_then(|s| B256::from_str(s).ok())
			.map(TransactionHash)
			.ok_or_else(|| invalid("hash", "expected 32-byte hex string"))?;

		let from = normalize_address(required(obj, "from")?).map_err(|e| retag(e, "from"))?;

		let value = quantity_u256(required(obj, "value")?, "value")?;
		let gas = quantity_u64(required(obj, "gas")?, "gas")?;

		let to = lenient(optional(obj, "to", |v, _| normalize_address(v)));
		let gas_price = lenient(optional(obj, "gasPrice", quantity_u128))
			.or_else(|| lenient(optional(obj, "maxFeePerGas", quantity_u128)));

		Ok(Self {
			hash,
			from,
			to,
			value,
			gas,
			gas_price,
			block_number: lenient(optional(obj, "blockNumber", quantity_u64)),
			transaction_index: lenient(optional(obj, "transactionIndex", quantity_u64)),
		})
	}

	/// Whether `address` sent this transaction.
	pub fn is_sent_by(&self, address: &Address) -> bool {
		self.from == *address
	}

	/// Whether `address` sent or received this transaction.
	pub fn involves(&self, address: &Address) -> bool {
		self.is_sent_by(address) || self.to.as_ref() == Some(address)
	}
}

/// Which side of a transaction must equal the address being looked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
	/// Only transactions sent by the address.
	#[default]
	Sender,
	/// Transactions sent or received by the address.
	SenderOrRecipient,
}

impl MatchMode {
	pub fn matches(self, record: &TransactionRecord, address: &Address) -> bool {
		match self {
			MatchMode::Sender => record.is_sent_by(address),
			MatchMode::SenderOrRecipient => record.involves(address),
		}
	}
}

/// A block and its undecoded transaction entries in in-block order.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
	pub number: u64,
	pub transactions: Vec<Value>,
}

impl Block {
	pub fn new(number: u64, transactions: Vec<Value>) -> Self {
		Self {
			number,
			transactions,
		}
	}

	/// Builds a block from a raw RPC response for `height`.
	///
	/// A missing or non-array `transactions` field yields an empty block, and
	/// an absent `number` falls back to the requested height.
	pub fn from_rpc(height: u64, raw: Value) -> Self {
		let number = raw
			.get("number")
			.and_then(|n| quantity_u64(n, "number").ok())
			.unwrap_or(height);
		let transactions = match raw {
			Value::Object(mut obj) => match obj.remove("transactions") {
				Some(Value::Array(entries)) => entries,
				_ => Vec::new(),
			},
			_ => Vec::new(),
		};
		Self::new(number, transactions)
	}
}

fn required<'a>(obj: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value, RecordError> {
	match obj.get(field) {
		None | Some(Value::Null) => Err(RecordError::MissingField(field)),
		Some(value) => Ok(value),
	}
}

fn invalid(field: &'static str, reason: &str) -> RecordError {
	RecordError::InvalidField {
		field,
		reason: reason.to_string(),
	}
}

fn retag(err: RecordError, field: &'static str) -> RecordError {
	match err {
		RecordError::InvalidField { reason, .. } => RecordError::InvalidField { field, reason },
		other => other,
	}
}

fn quantity_str<'a>(value: &'a Value, field: &'static str) -> Result<&'a str, RecordError> {
	value
		.as_str()
		.map(without_0x_prefix)
		.filter(|digits| !digits.is_empty())
		.ok_or_else(|| invalid(field, "expected hex quantity string"))
}

fn quantity_u256(value: &Value, field: &'static str) -> Result<U256, RecordError> {
	U256::from_str_radix(quantity_str(value, field)?, 16).map_err(|e| RecordError::InvalidField {
		field,
		reason: e.to_string(),
	})
}

fn quantity_u64(value: &Value, field: &'static str) -> Result<u64, RecordError> {
	if let Some(n) = value.as_u64() {
		return Ok(n);
	}
	u64::from_str_radix(quantity_str(value, field)?, 16).map_err(|e| RecordError::InvalidField {
		field,
		reason: e.to_string(),
	})
}

fn quantity_u128(value: &Value, field: &'static str) -> Result<u128, RecordError> {
	u128::from_str_radix(quantity_str(value, field)?, 16).map_err(|e| RecordError::InvalidField {
		field,
		reason: e.to_string(),
	})
}

/// Decodes `field` with `decode` when it is present and not null.
fn optional<T>(
	obj: &Map<String, Value>,
	field: &'static str,
	decode: impl FnOnce(&Value, &'static str) -> Result<T, RecordError>,
) -> Result<Option<T>, RecordError> {
	match obj.get(field) {
		None | Some(Value::Null) => Ok(None),
		Some(value) => decode(value, field)
			.map(Some)
			.map_err(|e| retag(e, field)),
	}
}

fn lenient<T>(decoded: Result<Option<T>, RecordError>) -> Option<T> {
	decoded.unwrap_or_else(|e| {
		tracing::debug!(error = %e, "Ignoring undecodable transaction field");
		None
	})
}
