//! Core of the EVM transaction test harness.
//!
//! This crate ties the wallet and chain-reader capabilities together:
//! - [`monitoring::confirmation`] waits for a submitted transaction's receipt
//!   and turns a failed status into an error carrying an explorer link
//! - [`monitoring::scanner`] walks the chain backward from the head to find an
//!   address's most recent transaction within a time budget
//! - [`report`] computes cost and balance for the located transaction
//! - [`harness`] runs a transactional test body through all of the above

use harness_account::AccountError;
use harness_chain::ChainError;
use harness_config::ConfigError;
use harness_types::TransactionHash;
use std::time::Duration;
use thiserror::Error;

pub mod fixtures;
pub mod harness;
pub mod monitoring;
pub mod report;

#[cfg(test)]
pub(crate) mod test_support;

pub use harness::TransactionTest;
pub use monitoring::{ConfirmationMonitor, TransactionScanner};
pub use report::{ConsoleSink, ReportSink, TracingSink, TransactionReport, TransactionReporter};

/// Errors surfaced by harness operations.
#[derive(Debug, Error)]
pub enum HarnessError {
	/// The transaction was mined but reverted.
	#[error("Transaction failed to complete. See more details: {explorer_url}")]
	TransactionFailed {
		hash: TransactionHash,
		explorer_url: String,
	},
	/// The historical scan ran out of time before finding a match. Nothing is
	/// known about whether a match exists.
	#[error(
		"Transaction scan exceeded its {timeout:?} budget after {blocks_scanned} blocks without a result"
	)]
	ScanTimeout {
		timeout: Duration,
		blocks_scanned: u64,
	},
	/// Error reading chain state.
	#[error(transparent)]
	Chain(#[from] ChainError),
	/// Error from the wallet.
	#[error(transparent)]
	Account(#[from] AccountError),
	/// Error loading or using configuration.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
