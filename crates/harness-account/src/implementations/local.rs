//! Local private-key wallet.
//!
//! Signs with an in-process [`PrivateKeySigner`] and submits over HTTP
//! through an alloy provider whose fillers take care of nonce, gas and fees.

use crate::{AccountError, WalletInterface, WalletService, PRIVATE_KEY_ENV};
use alloy::network::EthereumWallet;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use harness_types::{
	with_0x_prefix, Address, NetworkConfig, SecretString, Transaction, TransactionHash,
};

/// Wallet backed by a private key held in memory.
pub struct LocalWallet {
	address: Address,
	network: NetworkConfig,
	provider: DynProvider,
}

impl LocalWallet {
	/// Creates a wallet for `network` from a hex private key.
	pub fn new(private_key: &SecretString, network: NetworkConfig) -> Result<Self, AccountError> {
		let signer = parse_signer(private_key)?.with_chain_id(Some(network.chain_id));
		let address = signer.address();

		let url: Url = network.rpc_url.parse().map_err(|e| {
			AccountError::Network(format!("Invalid RPC URL for network {}: {}", network.name, e))
		})?;

		let provider = ProviderBuilder::new()
			.wallet(EthereumWallet::from(signer))
			.connect_http(url)
			.erased();

		tracing::debug!(address = %address, network = %network.name, "Created local wallet");

		Ok(Self {
			address,
			network,
			provider,
		})
	}
}

#[async_trait]
impl WalletInterface for LocalWallet {
	fn address(&self) -> Address {
		self.address
	}

	fn network(&self) -> &NetworkConfig {
		&self.network
	}

	async fn submit(&self, tx: Transaction) -> Result<TransactionHash, AccountError> {
		let mut request: TransactionRequest = tx.into();
		request.from = Some(self.address);

		let pending = self
			.provider
			.send_transaction(request)
			.await
			.map_err(|e| AccountError::Submission(format!("Failed to send transaction: {}", e)))?;

		Ok(TransactionHash(*pending.tx_hash()))
	}
}

fn parse_signer(private_key: &SecretString) -> Result<PrivateKeySigner, AccountError> {
	private_key.with_exposed(|key| {
		with_0x_prefix(key.trim())
			.parse::<PrivateKeySigner>()
			.map_err(|_| AccountError::InvalidKey("Invalid private key format".to_string()))
	})
}

/// Builds a wallet service for `network`.
///
/// Uses `private_key` when given, otherwise the `TEST_PRIVATE_KEY`
/// environment variable.
pub fn create_wallet(
	network: &NetworkConfig,
	private_key: Option<&SecretString>,
) -> Result<WalletService, AccountError> {
	let from_env;
	let key = match private_key {
		Some(key) => key,
		None => {
			from_env = std::env::var(PRIVATE_KEY_ENV)
				.map(SecretString::from)
				.map_err(|_| AccountError::MissingKey(PRIVATE_KEY_ENV))?;
			&from_env
		}
	};

	let wallet = LocalWallet::new(key, network.clone())?;
	Ok(WalletService::new(Box::new(wallet)))
}
