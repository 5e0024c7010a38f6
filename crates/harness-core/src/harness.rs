//! Transaction test orchestration.
//!
//! A [`TransactionTest`] runs a test body that submits one transaction, holds
//! the test until that transaction is confirmed and then reports what it cost.
//! The test outcome is decided by the confirmation alone: reporting problems
//! are logged and never turn a passing test into a failing one.

use crate::monitoring::ConfirmationMonitor;
use crate::report::{ReportSink, TracingSink, TransactionReporter};
use crate::HarnessError;
use harness_account::WalletService;
use harness_chain::implementations::evm::alloy::AlloyChainReader;
use harness_chain::{ChainReader, ReceiptPolling};
use harness_config::Config;
use harness_types::{MatchMode, TransactionHash};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

pub struct TransactionTest {
	wallet: Arc<WalletService>,
	monitor: ConfirmationMonitor,
	reporter: TransactionReporter,
	sink: Box<dyn ReportSink>,
}

impl TransactionTest {
	pub fn new(
		wallet: Arc<WalletService>,
		chain: Arc<dyn ChainReader>,
		scan_timeout: Duration,
		match_mode: MatchMode,
	) -> Self {
		Self {
			monitor: ConfirmationMonitor::new(wallet.clone(), chain.clone()),
			reporter: TransactionReporter::new(wallet.clone(), chain, scan_timeout, match_mode),
			wallet,
			sink: Box::new(TracingSink),
		}
	}

	/// Connects a chain reader to the wallet's network using the confirmation
	/// and scanner settings from `config`.
	pub fn from_config(wallet: Arc<WalletService>, config: &Config) -> Result<Self, HarnessError> {
		let polling = ReceiptPolling::new(
			Duration::from_secs(config.confirmation.poll_interval_seconds),
			Duration::from_secs(config.confirmation.timeout_seconds),
		);
		let chain = AlloyChainReader::connect(wallet.network(), polling)?;

		Ok(Self::new(
			wallet,
			Arc::new(chain),
			Duration::from_secs(config.scanner.timeout_seconds),
			config.scanner.match_mode,
		))
	}

	/// Replaces the default [`TracingSink`].
	pub fn with_sink(mut self, sink: impl ReportSink + 'static) -> Self {
		self.sink = Box::new(sink);
		self
	}

	pub fn wallet(&self) -> &Arc<WalletService> {
		&self.wallet
	}

	/// Runs `body`, waits for the transaction it submitted and reports on it.
	///
	/// Fails when `body` fails or the transaction reverts. Once the
	/// transaction is confirmed the hash is returned whatever the report
	/// step does.
	#[instrument(skip_all, fields(network = %self.wallet.network().name))]
	pub async fn run<F, Fut, E>(&self, body: F) -> Result<TransactionHash, HarnessError>
	where
		F: FnOnce(Arc<WalletService>) -> Fut,
		Fut: Future<Output = Result<TransactionHash, E>>,
		E: Into<HarnessError>,
	{
		let wallet = self.wallet.clone();
		let hash = self.monitor.confirm(|| body(wallet)).await?;
		self.report(&hash).await;
		Ok(hash)
	}

	async fn report(&self, confirmed: &TransactionHash) {
		match self.reporter.build().await {
			Ok(Some(report)) => {
				if report.tx_hash != *confirmed {
					tracing::warn!(
						confirmed = %confirmed.short(),
						located = %report.tx_hash.short(),
						"Reported transaction differs from the confirmed one"
					);
				}
				self.sink.emit(&report);
			}
			Ok(None) => {}
			Err(e @ HarnessError::ScanTimeout { .. }) => {
				tracing::warn!(error = %e, "Skipped transaction report");
			}
			Err(e) => {
				tracing::warn!(
					error = %e,
					"There was an error while getting information about transaction"
				);
			}
		}
	}
}
