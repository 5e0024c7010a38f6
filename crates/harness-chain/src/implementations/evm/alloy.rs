//! Alloy-based chain reader.
//!
//! Reads EVM chain state over HTTP JSON-RPC. Blocks are fetched with a raw
//! `eth_getBlockByNumber` call and kept as JSON so that transaction entries
//! can be decoded one by one; the typed block decoder would reject the whole
//! block over a single odd entry (or over the oversized `extraData` of
//! proof-of-authority chains).

use crate::{poll_for_receipt, ChainError, ChainReader, ReceiptPolling};
use alloy::network::ReceiptResponse;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use harness_types::{Address, Block, NetworkConfig, TransactionHash, TransactionReceipt, U256};
use serde_json::Value;

/// Alloy-based EVM chain reader bound to a single network.
pub struct AlloyChainReader {
	provider: DynProvider,
	network: String,
	polling: ReceiptPolling,
}

impl AlloyChainReader {
	/// Wraps an existing provider.
	pub fn new(provider: DynProvider, network: impl Into<String>, polling: ReceiptPolling) -> Self {
		Self {
			provider,
			network: network.into(),
			polling,
		}
	}

	/// Opens an HTTP connection to `network`'s RPC endpoint.
	pub fn connect(network: &NetworkConfig, polling: ReceiptPolling) -> Result<Self, ChainError> {
		let url: Url = network.rpc_url.parse().map_err(|e| {
			ChainError::Network(format!("Invalid RPC URL for network {}: {}", network.name, e))
		})?;

		let provider = ProviderBuilder::new().connect_http(url).erased();

		tracing::debug!(network = %network.name, "Connected chain reader");

		Ok(Self::new(provider, network.name.clone(), polling))
	}
}

#[async_trait]
impl ChainReader for AlloyChainReader {
	async fn get_block_number(&self) -> Result<u64, ChainError> {
		self.provider.get_block_number().await.map_err(|e| {
			ChainError::Network(format!(
				"Failed to get block number on {}: {}",
				self.network, e
			))
		})
	}

	async fn get_block(&self, height: u64) -> Result<Block, ChainError> {
		let raw: Value = self
			.provider
			.raw_request(
				"eth_getBlockByNumber".into(),
				(format!("{:#x}", height), true),
			)
			.await
			.map_err(|e| {
				ChainError::Network(format!(
					"Failed to get block {} on {}: {}",
					height, self.network, e
				))
			})?;

		if raw.is_null() {
			return Err(ChainError::BlockNotFound(height));
		}

		Ok(Block::from_rpc(height, raw))
	}

	async fn get_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, ChainError> {
		let receipt = self
			.provider
			.get_transaction_receipt(hash.0)
			.await
			.map_err(|e| {
				ChainError::Network(format!(
					"Failed to get receipt on {}: {}",
					self.network, e
				))
			})?;

		Ok(receipt.map(|receipt| TransactionReceipt {
			hash: TransactionHash(receipt.transaction_hash),
			block_number: receipt.block_number.unwrap_or(0),
			success: ReceiptResponse::status(&receipt),
			gas_used: receipt.gas_used,
			effective_gas_price: Some(receipt.effective_gas_price),
		}))
	}

	async fn wait_for_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, ChainError> {
		poll_for_receipt(self, hash, self.polling).await
	}

	async fn get_balance(&self, address: &Address) -> Result<U256, ChainError> {
		self.provider.get_balance(*address).await.map_err(|e| {
			ChainError::Network(format!("Failed to get balance on {}: {}", self.network, e))
		})
	}
}
