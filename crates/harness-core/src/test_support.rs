//! In-memory wallet and chain used by the unit tests.

use async_trait::async_trait;
use harness_account::{AccountError, WalletInterface, WalletService};
use harness_chain::{ChainError, ChainReader};
use harness_types::{
	Address, Block, NetworkConfig, Transaction, TransactionHash, TransactionReceipt, B256, U256,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ALICE: &str = "0xe977fa8d8ae7d3d6e28c17a868ef04bd301c583f";
pub const BOB: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";
pub const CAROL: &str = "0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc";

pub fn addr(s: &str) -> Address {
	s.parse().unwrap()
}

pub fn hash(n: u8) -> TransactionHash {
	TransactionHash(B256::repeat_byte(n))
}

/// Transaction entry as a node would return it inside a block.
pub fn tx(n: u8, from: &str, to: &str) -> Value {
	json!({
		"hash": hash(n).to_hex(),
		"from": from,
		"to": to,
		"value": "0x2386f26fc10000",
		"gas": "0x5208",
		"gasPrice": "0x6fc23ac00",
	})
}

pub fn network() -> NetworkConfig {
	NetworkConfig {
		name: "testnet".into(),
		chain_id: 31337,
		rpc_url: "http://127.0.0.1:8545".into(),
		explorer_url: "https://explorer.test".into(),
		token: "ETH".into(),
		display_name: Some("Test Network".into()),
	}
}

pub fn receipt(n: u8, success: bool) -> TransactionReceipt {
	TransactionReceipt {
		hash: hash(n),
		block_number: 1,
		success,
		gas_used: 21_000,
		effective_gas_price: Some(10_000_000_000),
	}
}

/// Chain whose block at height `h` is `blocks[h]`.
#[derive(Default)]
pub struct MockChain {
	blocks: Mutex<Vec<Vec<Value>>>,
	mined_after_snapshot: Mutex<Option<Vec<Value>>>,
	receipts: Mutex<HashMap<TransactionHash, TransactionReceipt>>,
	balance: U256,
	latency: Option<Duration>,
	fetched: Mutex<Vec<u64>>,
}

impl MockChain {
	pub fn new(blocks: Vec<Vec<Value>>) -> Self {
		Self {
			blocks: Mutex::new(blocks),
			..Default::default()
		}
	}

	/// Every block fetch takes `latency` of (tokio) time.
	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = Some(latency);
		self
	}

	pub fn with_receipt(self, receipt: TransactionReceipt) -> Self {
		self.receipts.lock().unwrap().insert(receipt.hash, receipt);
		self
	}

	pub fn with_balance(mut self, balance: U256) -> Self {
		self.balance = balance;
		self
	}

	/// Appends a block holding `txs` as soon as the first block is fetched,
	/// i.e. right after a scan has read the head height.
	pub fn mine_after_snapshot(self, txs: Vec<Value>) -> Self {
		*self.mined_after_snapshot.lock().unwrap() = Some(txs);
		self
	}

	pub fn fetched(&self) -> Vec<u64> {
		self.fetched.lock().unwrap().clone()
	}

	pub fn head(&self) -> u64 {
		self.blocks.lock().unwrap().len().saturating_sub(1) as u64
	}
}

#[async_trait]
impl ChainReader for MockChain {
	async fn get_block_number(&self) -> Result<u64, ChainError> {
		Ok(self.head())
	}

	async fn get_block(&self, height: u64) -> Result<Block, ChainError> {
		if let Some(latency) = self.latency {
			tokio::time::sleep(latency).await;
		}
		if let Some(txs) = self.mined_after_snapshot.lock().unwrap().take() {
			self.blocks.lock().unwrap().push(txs);
		}
		self.fetched.lock().unwrap().push(height);
		self.blocks
			.lock()
			.unwrap()
			.get(height as usize)
			.cloned()
			.map(|txs| Block::new(height, txs))
			.ok_or(ChainError::BlockNotFound(height))
	}

	async fn get_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, ChainError> {
		Ok(self.receipts.lock().unwrap().get(hash).cloned())
	}

	async fn wait_for_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, ChainError> {
		self.get_receipt(hash)
			.await?
			.ok_or(ChainError::ReceiptTimeout {
				hash: *hash,
				waited_secs: 0,
			})
	}

	async fn get_balance(&self, _address: &Address) -> Result<U256, ChainError> {
		Ok(self.balance)
	}
}

/// Wallet that "submits" by returning a preset hash.
pub struct MockWallet {
	address: Address,
	network: NetworkConfig,
	next_hash: Option<TransactionHash>,
	pub submitted: Mutex<Vec<Transaction>>,
}

#[async_trait]
impl WalletInterface for MockWallet {
	fn address(&self) -> Address {
		self.address
	}

	fn network(&self) -> &NetworkConfig {
		&self.network
	}

	async fn submit(&self, tx: Transaction) -> Result<TransactionHash, AccountError> {
		self.submitted.lock().unwrap().push(tx);
		self.next_hash
			.ok_or_else(|| AccountError::Submission("insufficient funds for gas".into()))
	}
}

/// Wallet service for `ALICE` whose submissions return `next_hash`, or fail
/// when it is `None`.
pub fn wallet(next_hash: Option<TransactionHash>) -> Arc<WalletService> {
	Arc::new(WalletService::new(Box::new(MockWallet {
		address: addr(ALICE),
		network: network(),
		next_hash,
		submitted: Mutex::new(Vec::new()),
	})))
}
