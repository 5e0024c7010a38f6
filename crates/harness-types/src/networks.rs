//! Network descriptors.
//!
//! A network is identified by a short name (`polygon`, `sepolia`, ...) and
//! carries everything the harness needs to reach it and to point an operator
//! at a block explorer.

use crate::delivery::TransactionHash;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Configuration for a single EVM network.
///
/// # Fields
///
/// * `name` - Key under which the network is configured, filled in on load
/// * `chain_id` - EIP-155 chain id used when signing
/// * `rpc_url` - HTTP(S) JSON-RPC endpoint
/// * `explorer_url` - Base URL of a block explorer (e.g. `https://polygonscan.com`)
/// * `token` - Symbol of the native token (e.g. `MATIC`)
/// * `display_name` - Human-readable name used in reports, defaults to `name`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkConfig {
	#[serde(default)]
	pub name: String,
	pub chain_id: u64,
	pub rpc_url: String,
	pub explorer_url: String,
	pub token: String,
	#[serde(default)]
	pub display_name: Option<String>,
}

impl NetworkConfig {
	/// Explorer page for a transaction.
	pub fn explorer_tx_url(&self, hash: &TransactionHash) -> String {
		format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), hash)
	}

	/// Name shown to operators.
	pub fn label(&self) -> &str {
		self.display_name.as_deref().unwrap_or(&self.name)
	}
}

/// Networks keyed by name.
pub type NetworksConfig = HashMap<String, NetworkConfig>;

/// Deserializes the `[networks.<name>]` tables and copies each key into the
/// network's `name` field.
pub fn deserialize_networks<'de, D>(deserializer: D) -> Result<NetworksConfig, D::Error>
where
	D: Deserializer<'de>,
{
	let raw: HashMap<String, NetworkConfig> = HashMap::deserialize(deserializer)?;
	Ok(raw
		.into_iter()
		.map(|(name, mut network)| {
			network.name = name.clone();
			(name, network)
		})
		.collect())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn polygon() -> NetworkConfig {
		NetworkConfig {
			name: "polygon".into(),
			chain_id: 137,
			rpc_url: "https://polygon-rpc.com".into(),
			explorer_url: "https://polygonscan.com/".into(),
			token: "MATIC".into(),
			display_name: None,
		}
	}

	#[test]
	fn test_explorer_tx_url_strips_trailing_slash() {
		let hash: TransactionHash =
			"0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060"
				.parse()
				.unwrap();
		assert_eq!(
			polygon().explorer_tx_url(&hash),
			"https://polygonscan.com/tx/0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060"
		);
	}

	#[test]
	fn test_label_prefers_display_name() {
		let mut network = polygon();
		assert_eq!(network.label(), "polygon");
		network.display_name = Some("Polygon PoS".into());
		assert_eq!(network.label(), "Polygon PoS");
	}
}
