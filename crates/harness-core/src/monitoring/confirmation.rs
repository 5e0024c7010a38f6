//! Confirmation of submitted transactions.
//!
//! Wraps an arbitrary submission operation: the operation runs unchanged, and
//! its hash is then held until the chain reports a terminal receipt. A
//! reverted transaction becomes [`HarnessError::TransactionFailed`] with an
//! explorer link the operator can follow.

use crate::HarnessError;
use harness_account::WalletService;
use harness_chain::ChainReader;
use harness_types::{TransactionHash, TransactionReceipt};
use std::future::Future;
use std::sync::Arc;
use tracing::instrument;

pub struct ConfirmationMonitor {
	wallet: Arc<WalletService>,
	chain: Arc<dyn ChainReader>,
}

impl ConfirmationMonitor {
	pub fn new(wallet: Arc<WalletService>, chain: Arc<dyn ChainReader>) -> Self {
		Self { wallet, chain }
	}

	/// Runs `submit`, then waits for its transaction to be mined.
	///
	/// Returns the hash produced by `submit` when the receipt reports success.
	/// Errors from `submit` and from the chain reader are passed through.
	pub async fn confirm<F, Fut, E>(&self, submit: F) -> Result<TransactionHash, HarnessError>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<TransactionHash, E>>,
		E: Into<HarnessError>,
	{
		let hash = submit().await.map_err(Into::into)?;
		self.check(&hash).await?;
		Ok(hash)
	}

	/// Waits for the receipt of an already submitted transaction and checks
	/// its status.
	#[instrument(skip_all, fields(tx_hash = %hash.short(), network = %self.wallet.network().name))]
	pub async fn check(&self, hash: &TransactionHash) -> Result<TransactionReceipt, HarnessError> {
		let receipt = self.chain.wait_for_receipt(hash).await?;

		if receipt.success {
			tracing::info!(block = receipt.block_number, "Confirmed");
			Ok(receipt)
		} else {
			let explorer_url = self.wallet.explorer_url(hash);
			tracing::error!(
				block = receipt.block_number,
				explorer_url = %explorer_url,
				"Transaction reverted"
			);
			Err(HarnessError::TransactionFailed {
				hash: *hash,
				explorer_url,
			})
		}
	}
}
