//! Configuration module for the EVM transaction test harness.
//!
//! Configuration is a single TOML file. `${VAR}` and `${VAR:-default}` are
//! replaced with environment variables before parsing, which is how private
//! keys are usually supplied:
//!
//! ```toml
//! [harness]
//! default_network = "polygon"
//!
//! [wallet]
//! private_key = "${TEST_PRIVATE_KEY}"
//!
//! [networks.polygon]
//! chain_id = 137
//! rpc_url = "https://polygon-rpc.com"
//! explorer_url = "https://polygonscan.com"
//! token = "MATIC"
//! ```

use harness_types::{
	networks::deserialize_networks, MatchMode, NetworkConfig, NetworksConfig, SecretString,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message only; the full error echoes the input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level harness configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// General harness settings.
	pub harness: HarnessConfig,
	/// Wallet used by transactional tests.
	#[serde(default)]
	pub wallet: WalletConfig,
	/// Receipt polling behaviour.
	#[serde(default)]
	pub confirmation: ConfirmationConfig,
	/// Historical scan behaviour.
	#[serde(default)]
	pub scanner: ScannerConfig,
	/// Networks keyed by name.
	#[serde(deserialize_with = "deserialize_networks")]
	pub networks: NetworksConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HarnessConfig {
	/// Network used when a command does not name one.
	pub default_network: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WalletConfig {
	/// Hex private key. When absent, `TEST_PRIVATE_KEY` is read at wallet
	/// construction time.
	pub private_key: Option<SecretString>,
}

/// Configuration for waiting on receipts.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConfirmationConfig {
	/// Delay between receipt lookups.
	#[serde(default = "default_poll_interval_seconds")]
	pub poll_interval_seconds: u64,
	/// Give up waiting for a receipt after this long.
	#[serde(default = "default_confirmation_timeout_seconds")]
	pub timeout_seconds: u64,
}

impl Default for ConfirmationConfig {
	fn default() -> Self {
		Self {
			poll_interval_seconds: default_poll_interval_seconds(),
			timeout_seconds: default_confirmation_timeout_seconds(),
		}
	}
}

/// Configuration for the backward block scan.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScannerConfig {
	/// Budget for a single scan.
	#[serde(default = "default_scan_timeout_seconds")]
	pub timeout_seconds: u64,
	/// Whether the recipient side counts as a match too.
	#[serde(default)]
	pub match_mode: MatchMode,
}

impl Default for ScannerConfig {
	fn default() -> Self {
		Self {
			timeout_seconds: default_scan_timeout_seconds(),
			match_mode: MatchMode::default(),
		}
	}
}

fn default_poll_interval_seconds() -> u64 {
	2
}

fn default_confirmation_timeout_seconds() -> u64 {
	120
}

fn default_scan_timeout_seconds() -> u64 {
	30
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut missing = Vec::new();
	let mut resolved = String::with_capacity(input.len());
	for line in input.split_inclusive('\n') {
		// Placeholders in comment lines are left as written.
		if line.trim_start().starts_with('#') {
			resolved.push_str(line);
			continue;
		}
		let substituted = re.replace_all(line, |caps: &regex::Captures<'_>| {
			let var_name = &caps[1];
			match (std::env::var(var_name), caps.get(2)) {
				(Ok(value), _) => value,
				(Err(_), Some(default)) => default.as_str().to_string(),
				(Err(_), None) => {
					missing.push(var_name.to_string());
					String::new()
				}
			}
		});
		resolved.push_str(&substituted);
	}

	if let Some(var_name) = missing.first() {
		return Err(ConfigError::Validation(format!(
			"Environment variable '{}' not found",
			var_name
		)));
	}

	Ok(resolved)
}

impl Config {
	/// Loads configuration from a TOML file.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read {}: {}", path.display(), e),
			))
		})?;
		let config: Config = content.parse()?;
		tracing::debug!(
			path = %path.display(),
			networks = config.networks.len(),
			"Loaded harness configuration"
		);
		Ok(config)
	}

	/// Looks up a network by name, falling back to `harness.default_network`.
	pub fn network(&self, name: Option<&str>) -> Result<&NetworkConfig, ConfigError> {
		let name = name.unwrap_or(&self.harness.default_network);
		self.networks.get(name).ok_or_else(|| {
			let mut known: Vec<&str> = self.networks.keys().map(String::as_str).collect();
			known.sort_unstable();
			ConfigError::Validation(format!(
				"Unknown network '{}' (configured: {})",
				name,
				known.join(", ")
			))
		})
	}

	/// Validates the configuration:
	/// - at least one network, and the default network exists
	/// - every network has an http(s) RPC URL, an explorer URL and a token symbol
	/// - timeouts and the poll interval are non-zero, and polling fits in the timeout
	fn validate(&self) -> Result<(), ConfigError> {
		if self.networks.is_empty() {
			return Err(ConfigError::Validation(
				"Networks configuration cannot be empty".into(),
			));
		}
		if !self.networks.contains_key(&self.harness.default_network) {
			return Err(ConfigError::Validation(format!(
				"Default network '{}' not found in networks",
				self.harness.default_network
			)));
		}

		for (name, network) in &self.networks {
			if !(network.rpc_url.starts_with("http://") || network.rpc_url.starts_with("https://"))
			{
				return Err(ConfigError::Validation(format!(
					"Network {} rpc_url must be an http(s) URL",
					name
				)));
			}
			if network.explorer_url.trim().is_empty() {
				return Err(ConfigError::Validation(format!(
					"Network {} must have explorer_url",
					name
				)));
			}
			if network.token.trim().is_empty() {
				return Err(ConfigError::Validation(format!(
					"Network {} must have a token symbol",
					name
				)));
			}
		}

		if self.confirmation.poll_interval_seconds == 0 {
			return Err(ConfigError::Validation(
				"confirmation.poll_interval_seconds must be greater than 0".into(),
			));
		}
		if self.confirmation.timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"confirmation.timeout_seconds must be greater than 0".into(),
			));
		}
		if self.confirmation.poll_interval_seconds > self.confirmation.timeout_seconds {
			return Err(ConfigError::Validation(
				"confirmation.poll_interval_seconds cannot exceed timeout_seconds".into(),
			));
		}
		if self.scanner.timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"scanner.timeout_seconds must be greater than 0".into(),
			));
		}

		if let Some(key) = &self.wallet.private_key {
			if key.is_empty() {
				return Err(ConfigError::Validation(
					"wallet.private_key is set but empty".into(),
				));
			}
		}

		Ok(())
	}
}

/// Parses a TOML string, resolving environment variables and validating.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
