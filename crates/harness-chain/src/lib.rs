//! Chain-reader capability for the EVM transaction test harness.
//!
//! This module defines the read side of the harness: head height, blocks with
//! their full transaction lists, receipts and balances. It also owns the
//! receipt polling loop, so callers that need a terminal receipt make a single
//! suspending call instead of polling themselves.

use async_trait::async_trait;
use harness_types::{Address, Block, TransactionHash, TransactionReceipt, U256};
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

/// Errors that can occur while reading chain state.
#[derive(Debug, Error)]
pub enum ChainError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// The node has no block at the requested height.
	#[error("Block {0} not found")]
	BlockNotFound(u64),
	/// No receipt appeared within the polling budget.
	#[error("Timeout waiting for receipt of {hash} after {waited_secs} seconds")]
	ReceiptTimeout {
		hash: TransactionHash,
		waited_secs: u64,
	},
}

/// How often and for how long to poll for a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptPolling {
	pub interval: Duration,
	pub timeout: Duration,
}

impl ReceiptPolling {
	pub fn new(interval: Duration, timeout: Duration) -> Self {
		Self { interval, timeout }
	}
}

impl Default for ReceiptPolling {
	fn default() -> Self {
		Self {
			interval: Duration::from_secs(2),
			timeout: Duration::from_secs(120),
		}
	}
}

/// Trait defining the interface for chain readers.
#[async_trait]
pub trait ChainReader: Send + Sync {
	/// Height of the current chain head.
	async fn get_block_number(&self) -> Result<u64, ChainError>;

	/// Block at `height` with full transaction objects.
	async fn get_block(&self, height: u64) -> Result<Block, ChainError>;

	/// Receipt for `hash` if the transaction has been mined.
	///
	/// Returns `Ok(None)` while the transaction is unknown or pending; the
	/// two are not distinguished.
	async fn get_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, ChainError>;

	/// Suspends until `hash` has a receipt.
	async fn wait_for_receipt(&self, hash: &TransactionHash)
		-> Result<TransactionReceipt, ChainError>;

	/// Native token balance of `address` in wei.
	async fn get_balance(&self, address: &Address) -> Result<U256, ChainError>;
}

/// Polls `reader` for a receipt until one appears or `polling.timeout` elapses.
///
/// Transport errors end the wait immediately.
#[instrument(skip_all, fields(tx_hash = %hash.short()))]
pub async fn poll_for_receipt<R>(
	reader: &R,
	hash: &TransactionHash,
	polling: ReceiptPolling,
) -> Result<TransactionReceipt, ChainError>
where
	R: ChainReader + ?Sized,
{
	let start_time = tokio::time::Instant::now();

	tracing::debug!(
		timeout_secs = polling.timeout.as_secs(),
		"Waiting for transaction receipt"
	);

	loop {
		if let Some(receipt) = reader.get_receipt(hash).await? {
			tracing::debug!(
				block = receipt.block_number,
				success = receipt.success,
				elapsed_ms = start_time.elapsed().as_millis() as u64,
				"Receipt available"
			);
			return Ok(receipt);
		}

		if start_time.elapsed() >= polling.timeout {
			return Err(ChainError::ReceiptTimeout {
				hash: *hash,
				waited_secs: polling.timeout.as_secs(),
			});
		}

		tracing::trace!(
			elapsed_secs = start_time.elapsed().as_secs(),
			"Transaction not yet mined"
		);
		tokio::time::sleep(polling.interval).await;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use harness_types::B256;
	use std::sync::atomic::{AtomicUsize, Ordering};

	/// Reader whose receipt appears after a fixed number of lookups.
	struct SlowMiner {
		lookups_until_mined: usize,
		lookups: AtomicUsize,
		fail: bool,
	}

	impl SlowMiner {
		fn new(lookups_until_mined: usize) -> Self {
			Self {
				lookups_until_mined,
				lookups: AtomicUsize::new(0),
				fail: false,
			}
		}
	}

	#[async_trait]
	impl ChainReader for SlowMiner {
		async fn get_block_number(&self) -> Result<u64, ChainError> {
			Ok(0)
		}

		async fn get_block(&self, height: u64) -> Result<Block, ChainError> {
			Err(ChainError::BlockNotFound(height))
		}

		async fn get_receipt(
			&self,
			hash: &TransactionHash,
		) -> Result<Option<TransactionReceipt>, ChainError> {
			if self.fail {
				return Err(ChainError::Network("connection refused".into()));
			}
			let seen = self.lookups.fetch_add(1, Ordering::SeqCst) + 1;
			Ok((seen >= self.lookups_until_mined).then(|| TransactionReceipt {
				hash: *hash,
				block_number: 42,
				success: true,
				gas_used: 21_000,
				effective_gas_price: Some(1),
			}))
		}

		async fn wait_for_receipt(
			&self,
			hash: &TransactionHash,
		) -> Result<TransactionReceipt, ChainError> {
			poll_for_receipt(self, hash, ReceiptPolling::default()).await
		}

		async fn get_balance(&self, _address: &Address) -> Result<U256, ChainError> {
			Ok(U256::ZERO)
		}
	}

	fn hash() -> TransactionHash {
		TransactionHash(B256::repeat_byte(0x42))
	}

	#[tokio::test(start_paused = true)]
	async fn test_polls_until_mined() {
		let reader = SlowMiner::new(3);
		let receipt = reader.wait_for_receipt(&hash()).await.unwrap();
		assert_eq!(receipt.block_number, 42);
		assert_eq!(reader.lookups.load(Ordering::SeqCst), 3);
	}

	#[tokio::test(start_paused = true)]
	async fn test_times_out_when_never_mined() {
		let reader = SlowMiner::new(usize::MAX);
		let polling = ReceiptPolling::new(Duration::from_secs(1), Duration::from_secs(5));
		let err = poll_for_receipt(&reader, &hash(), polling).await.unwrap_err();
		match err {
			ChainError::ReceiptTimeout { hash: h, waited_secs } => {
				assert_eq!(h, hash());
				assert_eq!(waited_secs, 5);
			}
			other => panic!("unexpected error: {other}"),
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_transport_error_is_not_retried() {
		let mut reader = SlowMiner::new(1);
		reader.fail = true;
		let err = reader.wait_for_receipt(&hash()).await.unwrap_err();
		assert!(matches!(err, ChainError::Network(_)));
	}
}
