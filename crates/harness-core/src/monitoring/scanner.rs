//! Backward scan for an address's most recent transaction.
//!
//! Nodes offer no "transactions by sender" index, so the scanner reads the
//! head height once and walks blocks from the head down to genesis. Within a
//! block, entries are examined last to first. The first entry that matches
//! wins, which makes the result the most recent transaction of the address as
//! observed at the time the head was read. Blocks mined after that point are
//! not visited by the running scan.
//!
//! The time budget is checked for every candidate entry and before every
//! block fetch, and each fetch is bounded by the remaining budget. Running out
//! of time is reported as [`HarnessError::ScanTimeout`], never as "not found".

use crate::HarnessError;
use harness_chain::ChainReader;
use harness_types::{canonical_hex, Address, MatchMode, TransactionRecord};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::instrument;

pub struct TransactionScanner {
	chain: Arc<dyn ChainReader>,
	match_mode: MatchMode,
}

/// State of one scan call.
struct ScanState {
	deadline: Instant,
	timeout: Duration,
	blocks_scanned: u64,
}

impl ScanState {
	fn start(timeout: Duration) -> Self {
		Self {
			deadline: Instant::now() + timeout,
			timeout,
			blocks_scanned: 0,
		}
	}

	fn check(&self) -> Result<(), HarnessError> {
		if Instant::now() >= self.deadline {
			Err(self.timed_out())
		} else {
			Ok(())
		}
	}

	fn timed_out(&self) -> HarnessError {
		HarnessError::ScanTimeout {
			timeout: self.timeout,
			blocks_scanned: self.blocks_scanned,
		}
	}
}

impl TransactionScanner {
	/// Scanner matching on the sender only.
	pub fn new(chain: Arc<dyn ChainReader>) -> Self {
		Self {
			chain,
			match_mode: MatchMode::default(),
		}
	}

	pub fn with_match_mode(mut self, match_mode: MatchMode) -> Self {
		self.match_mode = match_mode;
		self
	}

	pub fn match_mode(&self) -> MatchMode {
		self.match_mode
	}

	/// Finds the most recent transaction of `address` within `timeout`.
	///
	/// Returns `Ok(None)` when every block from the head down to genesis was
	/// examined without a match. Entries that cannot be decoded are skipped.
	/// Errors from the chain reader are returned unchanged.
	#[instrument(skip_all, fields(address = %canonical_hex(address), timeout = ?timeout, mode = ?self.match_mode))]
	pub async fn find_last_transaction_from(
		&self,
		address: &Address,
		timeout: Duration,
	) -> Result<Option<TransactionRecord>, HarnessError> {
		let mut state = ScanState::start(timeout);

		let head = tokio::time::timeout_at(state.deadline, self.chain.get_block_number())
			.await
			.map_err(|_| state.timed_out())??;
		tracing::debug!(head, "Scanning backward from head");

		for height in (0..=head).rev() {
			state.check()?;

			let block = tokio::time::timeout_at(state.deadline, self.chain.get_block(height))
				.await
				.map_err(|_| state.timed_out())??;
			state.blocks_scanned += 1;

			for entry in block.transactions.iter().rev() {
				state.check()?;

				let record = match TransactionRecord::from_json(entry) {
					Ok(record) => record,
					Err(e) => {
						tracing::debug!(block = block.number, error = %e, "Skipping malformed transaction");
						continue;
					}
				};

				if self.match_mode.matches(&record, address) {
					tracing::info!(
						block = block.number,
						tx_hash = %record.hash.short(),
						blocks_scanned = state.blocks_scanned,
						"Found transaction"
					);
					return Ok(Some(record));
				}
			}
		}

		tracing::info!(blocks_scanned = state.blocks_scanned, "No transaction found");
		Ok(None)
	}
}
