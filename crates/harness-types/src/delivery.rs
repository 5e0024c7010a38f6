//! Transaction submission and confirmation types.
//!
//! This module defines the identifier returned when a transaction is submitted,
//! the receipt produced once it is mined, and the minimal request the wallet
//! turns into a signed transaction.

use crate::utils::truncate_id;
use alloy::primitives::{Address, Bytes, TxKind, B256, U256};
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Blockchain transaction hash.
///
/// A fixed-width 32-byte identifier issued on submission and used to look up
/// the receipt later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionHash(pub B256);

impl TransactionHash {
	/// Returns the hash as lowercase `0x` hex.
	pub fn to_hex(&self) -> String {
		format!("0x{}", hex::encode(self.0.as_slice()))
	}

	/// Shortened form for log lines.
	pub fn short(&self) -> String {
		truncate_id(&self.to_hex())
	}
}

impl fmt::Display for TransactionHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_hex())
	}
}

impl FromStr for TransactionHash {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		B256::from_str(s.trim())
			.map(TransactionHash)
			.map_err(|e| format!("Invalid transaction hash '{}': {}", s, e))
	}
}

impl From<B256> for TransactionHash {
	fn from(hash: B256) -> Self {
		Self(hash)
	}
}

/// Receipt for a mined transaction.
///
/// A receipt only exists once the transaction has been included in a block;
/// its status is terminal from that point on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub hash: TransactionHash,
	/// The block number where the transaction was included.
	pub block_number: u64,
	/// Whether the transaction executed successfully.
	pub success: bool,
	/// Gas consumed by execution.
	pub gas_used: u64,
	/// Price actually paid per unit of gas, when the node reports it.
	pub effective_gas_price: Option<u128>,
}

/// A transaction to be signed and submitted by a wallet.
///
/// Only the intent of the transaction is described here. Nonce, gas and fee
/// fields are filled in by the wallet's provider stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
	/// Recipient; `None` deploys a contract.
	pub to: Option<Address>,
	/// Value transferred in wei.
	pub value: U256,
	/// Call data.
	pub data: Vec<u8>,
	/// Explicit gas limit, if the caller does not want it estimated.
	pub gas_limit: Option<u64>,
}

impl Transaction {
	/// Plain native-token transfer.
	pub fn transfer(to: Address, value: U256) -> Self {
		Self {
			to: Some(to),
			value,
			..Default::default()
		}
	}
}

impl From<Transaction> for TransactionRequest {
	fn from(tx: Transaction) -> Self {
		TransactionRequest {
			to: Some(tx.to.map(TxKind::Call).unwrap_or(TxKind::Create)),
			value: Some(tx.value),
			input: TransactionInput::new(Bytes::from(tx.data)),
			gas: tx.gas_limit,
			..Default::default()
		}
	}
}
