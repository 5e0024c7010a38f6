//! Wallet capability for the EVM transaction test harness.
//!
//! A wallet knows its public address and the network it is bound to, and can
//! submit a transaction, returning the hash the network assigned to it.
//! Construction and signing of the transaction stay inside the implementation.

use async_trait::async_trait;
use harness_types::{Address, NetworkConfig, Transaction, TransactionHash};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

/// Environment variable read when no private key is configured.
pub const PRIVATE_KEY_ENV: &str = "TEST_PRIVATE_KEY";

/// Errors that can occur during wallet operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// No private key was configured or found in the environment.
	#[error("No private key configured and {0} is not set")]
	MissingKey(&'static str),
	/// The private key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// The network endpoint could not be used.
	#[error("Network error: {0}")]
	Network(String),
	/// The node rejected the transaction or the request failed in transit.
	#[error("Submission failed: {0}")]
	Submission(String),
}

/// Trait defining the interface for wallet implementations.
#[async_trait]
pub trait WalletInterface: Send + Sync {
	/// Public address transactions are sent from.
	fn address(&self) -> Address;

	/// Network the wallet submits to.
	fn network(&self) -> &NetworkConfig;

	/// Signs and submits a transaction, returning its hash.
	///
	/// Returns as soon as the node has accepted the transaction; it does not
	/// wait for inclusion.
	async fn submit(&self, tx: Transaction) -> Result<TransactionHash, AccountError>;
}

/// Service wrapping a wallet implementation.
pub struct WalletService {
	implementation: Box<dyn WalletInterface>,
}

impl WalletService {
	pub fn new(implementation: Box<dyn WalletInterface>) -> Self {
		Self { implementation }
	}

	pub fn address(&self) -> Address {
		self.implementation.address()
	}

	pub fn network(&self) -> &NetworkConfig {
		self.implementation.network()
	}

	/// Block-explorer page for `hash` on this wallet's network.
	pub fn explorer_url(&self, hash: &TransactionHash) -> String {
		self.network().explorer_tx_url(hash)
	}

	/// Submits a transaction through the underlying wallet.
	pub async fn submit(&self, tx: Transaction) -> Result<TransactionHash, AccountError> {
		let network = self.network().name.clone();
		match self.implementation.submit(tx).await {
			Ok(hash) => {
				tracing::info!(tx_hash = %hash.short(), network = %network, "Submitted transaction");
				Ok(hash)
			}
			Err(e) => {
				tracing::warn!(network = %network, error = %e, "Transaction submission failed");
				Err(e)
			}
		}
	}
}
