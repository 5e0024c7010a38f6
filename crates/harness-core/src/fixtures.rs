//! Shared building blocks for transactional tests.

use crate::HarnessError;
use harness_account::implementations::local::create_wallet;
use harness_account::WalletService;
use harness_config::Config;
use harness_types::{Address, NetworkConfig, SecretString, U256};
use std::sync::Arc;

/// The all-zero address, a common sink for test transfers.
pub const ZERO_ADDRESS: Address = Address::ZERO;

/// 0.001 of the native token, in wei.
pub fn default_transfer_amount() -> U256 {
	U256::from(1_000_000_000_000_000u64)
}

/// Wallet on `network` signing with `private_key`, or with the key in
/// `TEST_PRIVATE_KEY` when none is given.
pub fn make_wallet(
	network: &NetworkConfig,
	private_key: Option<&SecretString>,
) -> Result<Arc<WalletService>, HarnessError> {
	let wallet = create_wallet(network, private_key)?;
	tracing::debug!(address = %wallet.address(), network = %network.name, "Created test wallet");
	Ok(Arc::new(wallet))
}

/// Wallet for the named network (or the default one) using the configured
/// private key.
pub fn wallet_from_config(
	config: &Config,
	network: Option<&str>,
) -> Result<Arc<WalletService>, HarnessError> {
	let network = config.network(network)?;
	make_wallet(network, config.wallet.private_key.as_ref())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::network;
	use harness_types::{format_units, NATIVE_DECIMALS};

	const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	#[test]
	fn test_default_transfer_amount() {
		assert_eq!(
			format_units(default_transfer_amount(), NATIVE_DECIMALS),
			"0.001"
		);
	}

	#[test]
	fn test_zero_address() {
		assert_eq!(
			ZERO_ADDRESS.to_string(),
			"0x0000000000000000000000000000000000000000"
		);
	}

	#[test]
	fn test_make_wallet_with_explicit_key() {
		let key = SecretString::from(ANVIL_KEY);
		let wallet = make_wallet(&network(), Some(&key)).unwrap();
		assert_eq!(
			wallet.address(),
			"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
				.parse::<Address>()
				.unwrap()
		);
		assert_eq!(wallet.network().name, "testnet");
	}

	#[test]
	fn test_make_wallet_rejects_bad_key() {
		let key = SecretString::from("not-a-key");
		let err = make_wallet(&network(), Some(&key)).err().unwrap();
		assert!(matches!(err, HarnessError::Account(_)));
	}

	#[test]
	fn test_wallet_from_config() {
		let config: Config = format!(
			r#"
[harness]
default_network = "testnet"

[wallet]
private_key = "{ANVIL_KEY}"

[networks.testnet]
chain_id = 31337
rpc_url = "http://127.0.0.1:8545"
explorer_url = "https://explorer.test"
token = "ETH"
"#
		)
		.parse()
		.unwrap();

		let wallet = wallet_from_config(&config, None).unwrap();
		assert_eq!(wallet.network().chain_id, 31337);

		let err = wallet_from_config(&config, Some("mainnet")).err().unwrap();
		assert!(matches!(err, HarnessError::Config(_)));
	}
}
