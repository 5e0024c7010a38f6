//! Post-confirmation report of what a transaction cost and what is left.
//!
//! The reporter locates the wallet's most recent transaction with the
//! [`TransactionScanner`], prices it from its receipt and reads the wallet's
//! balance. Sinks decide where the resulting [`TransactionReport`] goes.

use crate::monitoring::TransactionScanner;
use crate::HarnessError;
use harness_account::WalletService;
use harness_chain::ChainReader;
use harness_types::{
	format_units, Address, MatchMode, TransactionHash, TransactionReceipt, TransactionRecord, U256,
	NATIVE_DECIMALS,
};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Cost and balance summary for one located transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionReport {
	pub sender: Address,
	pub tx_hash: TransactionHash,
	pub explorer_url: String,
	/// Value plus fees, in wei.
	pub cost_wei: U256,
	pub balance_wei: U256,
	pub token: String,
	pub network: String,
}

impl TransactionReport {
	/// Cost in whole native tokens.
	pub fn cost(&self) -> String {
		format_units(self.cost_wei, NATIVE_DECIMALS)
	}

	/// Balance in whole native tokens.
	pub fn balance(&self) -> String {
		format_units(self.balance_wei, NATIVE_DECIMALS)
	}
}

impl fmt::Display for TransactionReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "From: {}", self.sender)?;
		writeln!(f, "Transaction: {}", self.explorer_url)?;
		writeln!(f, "Costs: {} {}", self.cost(), self.token)?;
		writeln!(f, "Balance: {} {}", self.balance(), self.token)?;
		write!(f, "Network: {}", self.network)
	}
}

/// Total spent by `record`: its value plus the fee.
///
/// The fee is `gas_used * effective_gas_price` when a receipt is available.
/// Without one it falls back to the gas limit times the declared gas price,
/// which is an upper bound.
pub fn transaction_cost(record: &TransactionRecord, receipt: Option<&TransactionReceipt>) -> U256 {
	let declared_price = record.gas_price.unwrap_or_default();
	let fee = match receipt {
		Some(receipt) => {
			let price = receipt.effective_gas_price.unwrap_or(declared_price);
			U256::from(receipt.gas_used) * U256::from(price)
		}
		None => U256::from(record.gas) * U256::from(declared_price),
	};
	record.value.saturating_add(fee)
}

/// Builds [`TransactionReport`]s for a wallet.
pub struct TransactionReporter {
	wallet: Arc<WalletService>,
	chain: Arc<dyn ChainReader>,
	scanner: TransactionScanner,
	scan_timeout: Duration,
}

impl TransactionReporter {
	pub fn new(
		wallet: Arc<WalletService>,
		chain: Arc<dyn ChainReader>,
		scan_timeout: Duration,
		match_mode: MatchMode,
	) -> Self {
		let scanner = TransactionScanner::new(chain.clone()).with_match_mode(match_mode);
		Self {
			wallet,
			chain,
			scanner,
			scan_timeout,
		}
	}

	/// Locates the wallet's last transaction and summarizes it.
	///
	/// Returns `Ok(None)` when the wallet has no transaction on the chain.
	pub async fn build(&self) -> Result<Option<TransactionReport>, HarnessError> {
		let sender = self.wallet.address();
		let Some(record) = self
			.scanner
			.find_last_transaction_from(&sender, self.scan_timeout)
			.await?
		else {
			tracing::info!(address = %sender, "No transaction to report");
			return Ok(None);
		};

		let receipt = self.chain.get_receipt(&record.hash).await?;
		if receipt.is_none() {
			tracing::debug!(tx_hash = %record.hash.short(), "No receipt, pricing from gas limit");
		}
		let balance_wei = self.chain.get_balance(&sender).await?;

		let network = self.wallet.network();
		Ok(Some(TransactionReport {
			sender,
			tx_hash: record.hash,
			explorer_url: network.explorer_tx_url(&record.hash),
			cost_wei: transaction_cost(&record, receipt.as_ref()),
			balance_wei,
			token: network.token.clone(),
			network: network.label().to_string(),
		}))
	}
}

/// Destination for transaction reports.
pub trait ReportSink: Send + Sync {
	fn emit(&self, report: &TransactionReport);
}

/// Emits reports as structured log events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ReportSink for TracingSink {
	fn emit(&self, report: &TransactionReport) {
		tracing::info!(
			sender = %report.sender,
			tx_hash = %report.tx_hash.short(),
			explorer_url = %report.explorer_url,
			cost = %report.cost(),
			balance = %report.balance(),
			token = %report.token,
			network = %report.network,
			"Transaction report"
		);
	}
}

/// Prints reports to stdout as a readable block.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ReportSink for ConsoleSink {
	fn emit(&self, report: &TransactionReport) {
		println!();
		println!("{}", report);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::{addr, hash, receipt, tx, wallet, MockChain, ALICE, BOB};

	fn record(n: u8) -> TransactionRecord {
		TransactionRecord::from_json(&tx(n, ALICE, BOB)).unwrap()
	}

	#[test]
	fn test_cost_from_receipt() {
		// 0.01 ETH value + 21000 gas at 10 gwei
		let cost = transaction_cost(&record(1), Some(&receipt(1, true)));
		assert_eq!(format_units(cost, NATIVE_DECIMALS), "0.01021");
	}

	#[test]
	fn test_cost_without_receipt_uses_gas_limit() {
		// 0.01 ETH value + 21000 gas at 30 gwei
		let cost = transaction_cost(&record(1), None);
		assert_eq!(format_units(cost, NATIVE_DECIMALS), "0.01063");
	}

	#[test]
	fn test_cost_receipt_without_effective_price() {
		let mut r = receipt(1, true);
		r.effective_gas_price = None;
		let cost = transaction_cost(&record(1), Some(&r));
		assert_eq!(format_units(cost, NATIVE_DECIMALS), "0.01063");
	}

	#[test]
	fn test_display_lists_every_line() {
		let report = TransactionReport {
			sender: addr(ALICE),
			tx_hash: hash(1),
			explorer_url: "https://explorer.test/tx/0x01".into(),
			cost_wei: U256::from(1_000_000_000_000_000u64),
			balance_wei: U256::from(2_500_000_000_000_000_000u128),
			token: "ETH".into(),
			network: "Test Network".into(),
		};

		let text = report.to_string();
		let lines: Vec<&str> = text.lines().collect();
		assert_eq!(lines.len(), 5);
		assert!(lines[0].starts_with("From: 0x"));
		assert_eq!(lines[1], "Transaction: https://explorer.test/tx/0x01");
		assert_eq!(lines[2], "Costs: 0.001 ETH");
		assert_eq!(lines[3], "Balance: 2.5 ETH");
		assert_eq!(lines[4], "Network: Test Network");
	}

	#[tokio::test]
	async fn test_build_report() {
		let chain = Arc::new(
			MockChain::new(vec![vec![tx(1, BOB, ALICE)], vec![tx(2, ALICE, BOB)]])
				.with_receipt(receipt(2, true))
				.with_balance(U256::from(3_000_000_000_000_000_000u128)),
		);
		let reporter =
			TransactionReporter::new(wallet(None), chain, Duration::from_secs(5), MatchMode::Sender);

		let report = reporter.build().await.unwrap().unwrap();
		assert_eq!(report.sender, addr(ALICE));
		assert_eq!(report.tx_hash, hash(2));
		assert_eq!(report.explorer_url, format!("https://explorer.test/tx/{}", hash(2).to_hex()));
		assert_eq!(report.cost(), "0.01021");
		assert_eq!(report.balance(), "3");
		assert_eq!(report.token, "ETH");
		assert_eq!(report.network, "Test Network");
	}

	#[tokio::test]
	async fn test_build_without_history() {
		let chain = Arc::new(MockChain::new(vec![vec![tx(1, BOB, BOB)]]));
		let reporter =
			TransactionReporter::new(wallet(None), chain, Duration::from_secs(5), MatchMode::Sender);

		assert!(reporter.build().await.unwrap().is_none());
	}

	#[tokio::test(start_paused = true)]
	async fn test_build_surfaces_scan_timeout() {
		let chain = Arc::new(
			MockChain::new(vec![vec![tx(1, ALICE, BOB)], vec![], vec![]])
				.with_latency(Duration::from_secs(2)),
		);
		let reporter =
			TransactionReporter::new(wallet(None), chain, Duration::from_secs(1), MatchMode::Sender);

		let err = reporter.build().await.unwrap_err();
		assert!(matches!(err, HarnessError::ScanTimeout { .. }));
	}
}
