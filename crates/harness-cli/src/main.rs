//! Command-line entry point for the EVM transaction test harness.
//!
//! Loads the harness configuration, sets up logging and runs one of the
//! harness operations against the selected network: locating an address's
//! last transaction, waiting on a submitted transaction, reading a balance or
//! running a full transfer test.

use clap::{Parser, Subcommand};
use harness_chain::implementations::evm::alloy::AlloyChainReader;
use harness_chain::{ChainReader, ReceiptPolling};
use harness_config::Config;
use harness_core::fixtures::{default_transfer_amount, wallet_from_config, ZERO_ADDRESS};
use harness_core::{ConfirmationMonitor, ConsoleSink, TransactionScanner, TransactionTest};
use harness_types::{
	format_units, Address, MatchMode, Transaction, TransactionHash, U256, NATIVE_DECIMALS,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Command-line arguments for the harness.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "harness.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	/// Network to use instead of the configured default
	#[arg(short, long, global = true)]
	network: Option<String>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Find the most recent transaction of an address
	LastTx {
		#[arg(long)]
		address: Address,

		/// Scan budget in seconds, overriding the configured one
		#[arg(long)]
		timeout: Option<u64>,

		/// Also match transactions received by the address
		#[arg(long)]
		include_recipient: bool,
	},
	/// Wait for a submitted transaction and check its status
	Wait {
		#[arg(long)]
		tx_hash: TransactionHash,
	},
	/// Show the native balance of an address
	Balance {
		#[arg(long)]
		address: Address,
	},
	/// Send a transfer from the configured wallet, confirm it and report on it
	Transfer {
		/// Recipient, the zero address when omitted
		#[arg(long)]
		to: Option<Address>,

		/// Amount in wei, 0.001 of the native token when omitted
		#[arg(long)]
		amount_wei: Option<u128>,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
	fmt().with_env_filter(env_filter).with_target(true).init();

	dotenv::dotenv().ok();

	let config = Config::from_file(&args.config).await?;
	let network = args.network.as_deref();
	tracing::info!(
		network = %config.network(network)?.name,
		"Loaded configuration"
	);

	match args.command {
		Command::LastTx {
			address,
			timeout,
			include_recipient,
		} => {
			let chain = connect(&config, network)?;
			let match_mode = if include_recipient {
				MatchMode::SenderOrRecipient
			} else {
				config.scanner.match_mode
			};
			let timeout =
				Duration::from_secs(timeout.unwrap_or(config.scanner.timeout_seconds));

			let scanner = TransactionScanner::new(chain).with_match_mode(match_mode);
			match scanner.find_last_transaction_from(&address, timeout).await? {
				Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
				None => println!("No transaction found for {}", address),
			}
		}
		Command::Wait { tx_hash } => {
			let wallet = wallet_from_config(&config, network)?;
			let chain = connect(&config, network)?;
			let receipt = ConfirmationMonitor::new(wallet, chain)
				.check(&tx_hash)
				.await?;
			println!(
				"Transaction {} confirmed in block {}",
				receipt.hash, receipt.block_number
			);
		}
		Command::Balance { address } => {
			let chain = connect(&config, network)?;
			let token = &config.network(network)?.token;
			let balance = chain.get_balance(&address).await?;
			println!("{} {}", format_units(balance, NATIVE_DECIMALS), token);
		}
		Command::Transfer { to, amount_wei } => {
			let to = to.unwrap_or(ZERO_ADDRESS);
			let amount = amount_wei
				.map(U256::from)
				.unwrap_or_else(default_transfer_amount);

			let wallet = wallet_from_config(&config, network)?;
			let test = TransactionTest::from_config(wallet, &config)?.with_sink(ConsoleSink);
			let hash = test
				.run(|wallet| async move {
					wallet.submit(Transaction::transfer(to, amount)).await
				})
				.await?;
			tracing::info!(tx_hash = %hash, "Transfer test passed");
		}
	}

	Ok(())
}

/// Chain reader for the selected network with the configured receipt polling.
fn connect(
	config: &Config,
	network: Option<&str>,
) -> Result<Arc<dyn ChainReader>, Box<dyn std::error::Error>> {
	let network = config.network(network)?;
	let polling = ReceiptPolling::new(
		Duration::from_secs(config.confirmation.poll_interval_seconds),
		Duration::from_secs(config.confirmation.timeout_seconds),
	);
	Ok(Arc::new(AlloyChainReader::connect(network, polling)?))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_last_tx() {
		let args = Args::parse_from([
			"evm-harness",
			"--network",
			"sepolia",
			"last-tx",
			"--address",
			"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
			"--include-recipient",
		]);
		assert_eq!(args.network.as_deref(), Some("sepolia"));
		assert_eq!(args.config, PathBuf::from("harness.toml"));
		match args.command {
			Command::LastTx {
				timeout,
				include_recipient,
				..
			} => {
				assert!(timeout.is_none());
				assert!(include_recipient);
			}
			other => panic!("unexpected command {other:?}"),
		}
	}

	#[test]
	fn test_parse_transfer_defaults() {
		let args = Args::parse_from(["evm-harness", "transfer"]);
		match args.command {
			Command::Transfer { to, amount_wei } => {
				assert!(to.is_none());
				assert!(amount_wei.is_none());
			}
			other => panic!("unexpected command {other:?}"),
		}
	}

	#[test]
	fn test_rejects_bad_address() {
		let result = Args::try_parse_from(["evm-harness", "balance", "--address", "0x1234"]);
		assert!(result.is_err());
	}
}
