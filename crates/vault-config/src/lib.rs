//! Configuration loading for the vault client.
//!
//! The client reads two static inputs at start-up: a TOML file describing
//! networks, platform deployments and client policy, and a JSON artifact file
//! mapping logical contract names to their ABI and per-network addresses.

use regex::Regex;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};
use vault_types::ChainId;

pub mod serde_helpers;
pub mod types;

pub use types::*;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader {
	file_path: Option<String>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "VAULT_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_string_lossy().to_string());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	/// Loads, overrides and validates the configuration file.
	pub async fn load(&self) -> Result<VaultConfig, ConfigError> {
		let file_path = self.file_path.as_ref().ok_or_else(|| {
			ConfigError::FileNotFound("No configuration file specified".to_string())
		})?;

		info!("Loading configuration from {}", file_path);
		let content = tokio::fs::read_to_string(file_path).await.map_err(|e| {
			if e.kind() == std::io::ErrorKind::NotFound {
				ConfigError::FileNotFound(file_path.clone())
			} else {
				ConfigError::IoError(e)
			}
		})?;

		self.load_from_str(&content)
	}

	/// Parses configuration text, applying substitution, overrides and validation.
	pub fn load_from_str(&self, content: &str) -> Result<VaultConfig, ConfigError> {
		let substituted_content = substitute_env_vars(content)?;

		let mut config: VaultConfig = toml::from_str(&substituted_content)
			.map_err(|e| ConfigError::ParseError(e.to_string()))?;

		self.apply_env_overrides(&mut config)?;
		validate_config(&config)?;

		Ok(config)
	}

	fn apply_env_overrides(&self, config: &mut VaultConfig) -> Result<(), ConfigError> {
		if let Ok(log_level) = env::var(format!("{}LOG_LEVEL", self.env_prefix)) {
			config.client.log_level = log_level;
		}

		if let Ok(network_id) = env::var(format!("{}DEFAULT_NETWORK_ID", self.env_prefix)) {
			let network_id = network_id.parse::<ChainId>().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid default network id: {}", e))
			})?;
			debug!("Overriding default network id to {} from environment", network_id);
			config.client.default_network_id = Some(network_id);
		}

		let rpc_prefix = format!("{}RPC_URL_", self.env_prefix);
		for (key, url) in env::vars() {
			if let Some(chain_id) = key.strip_prefix(&rpc_prefix) {
				if let Ok(id) = chain_id.parse::<ChainId>() {
					if let Some(chain) = config.chains.get_mut(&id) {
						debug!("Overriding RPC URL for chain {} from environment", id);
						chain.rpc_url = url;
					}
				}
			}
		}

		Ok(())
	}
}

/// Replaces `${VAR_NAME}` patterns with the corresponding environment values.
fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([^}]+)\}")
		.map_err(|e| ConfigError::ParseError(format!("Invalid substitution pattern: {}", e)))?;

	let mut result = content.to_string();
	for cap in re.captures_iter(content) {
		let full_match = &cap[0];
		let var_name = &cap[1];

		let env_value =
			env::var(var_name).map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

		result = result.replace(full_match, &env_value);
	}

	Ok(result)
}

fn validate_config(config: &VaultConfig) -> Result<(), ConfigError> {
	if config.chains.is_empty() {
		return Err(ConfigError::ValidationError(
			"At least one chain must be configured".to_string(),
		));
	}

	for (chain_id, chain) in &config.chains {
		if chain_id.0 == 0 {
			return Err(ConfigError::ValidationError(
				"Chain id 0 is not a valid network".to_string(),
			));
		}
		if !(chain.rpc_url.starts_with("http://") || chain.rpc_url.starts_with("https://")) {
			return Err(ConfigError::ValidationError(format!(
				"RPC URL for chain {} must start with http:// or https://",
				chain_id
			)));
		}
	}

	let confirmation = &config.confirmation;
	if confirmation.timeout_secs == 0 {
		return Err(ConfigError::ValidationError(
			"Confirmation timeout must be greater than zero".to_string(),
		));
	}
	if confirmation.poll_interval_ms == 0 {
		return Err(ConfigError::ValidationError(
			"Confirmation poll interval must be greater than zero".to_string(),
		));
	}
	if confirmation.poll_interval() > confirmation.timeout() {
		return Err(ConfigError::ValidationError(
			"Confirmation poll interval must not exceed the timeout".to_string(),
		));
	}
	if confirmation.confirmations == 0 {
		return Err(ConfigError::ValidationError(
			"At least one confirmation is required".to_string(),
		));
	}

	Ok(())
}

/// Reads the contract artifact file.
pub async fn load_contract_artifacts<P: AsRef<Path>>(
	path: P,
) -> Result<ContractArtifacts, ConfigError> {
	let path = path.as_ref();
	info!("Loading contract artifacts from {:?}", path);

	let content = tokio::fs::read_to_string(path).await.map_err(|e| {
		if e.kind() == std::io::ErrorKind::NotFound {
			ConfigError::FileNotFound(path.to_string_lossy().to_string())
		} else {
			ConfigError::IoError(e)
		}
	})?;

	parse_contract_artifacts(&content)
}

/// Parses contract artifacts from JSON text.
pub fn parse_contract_artifacts(content: &str) -> Result<ContractArtifacts, ConfigError> {
	serde_json::from_str(content)
		.map_err(|e| ConfigError::ParseError(format!("Invalid contract artifacts: {}", e)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use vault_types::Address;

	const BASE_CONFIG: &str = r#"
[client]
name = "test-client"
contracts_path = "config/contracts.json"

[chains.1]
name = "Ethereum"
rpc_url = "https://eth.example.com"
executor_address = "0x00000000000000000000000000000000000000e1"

[chains.1.platforms.uniswapV3]
factory_address = "0x1F98431c8aD98523631AE4a59f267346ea31F984"
position_manager_address = "0xC36442b4a4522E871399CD717aBDD847Ab11FE88"
enabled = true

[chains.42161]
name = "Arbitrum One"
rpc_url = "https://arb.example.com"

[chains.42161.platforms.uniswapV3]
factory_address = "0x1F98431c8aD98523631AE4a59f267346ea31F984"
position_manager_address = "0xC36442b4a4522E871399CD717aBDD847Ab11FE88"
"#;

	fn loader() -> ConfigLoader {
		// Unique prefix so ambient VAULT_* variables never leak into tests.
		ConfigLoader::new().with_env_prefix("VAULT_CONFIG_TEST_NONE_")
	}

	#[test]
	fn test_toml_parsing_with_chain_id_maps() {
		let config = loader().load_from_str(BASE_CONFIG).unwrap();

		assert_eq!(config.client.name, "test-client");
		assert_eq!(config.client.log_level, "info");
		assert_eq!(config.client.default_network_id, None);
		assert_eq!(config.chains.len(), 2);

		let mainnet = &config.chains[&ChainId(1)];
		assert_eq!(mainnet.name, "Ethereum");
		assert_eq!(
			mainnet.executor_address,
			Some(Address::with_last_byte(0xe1))
		);
		assert!(mainnet.platforms["uniswapV3"].enabled);

		// `enabled` defaults to false when omitted.
		let arbitrum = &config.chains[&ChainId(42161)];
		assert!(!arbitrum.platforms["uniswapV3"].enabled);
		assert_eq!(arbitrum.executor_address, None);
	}

	#[test]
	fn test_confirmation_defaults_are_finite() {
		let config = loader().load_from_str(BASE_CONFIG).unwrap();
		assert_eq!(config.confirmation, ConfirmationSettings::default());
		assert!(config.confirmation.timeout() > config.confirmation.poll_interval());
	}

	#[test]
	fn test_env_substitution() {
		env::set_var("VAULT_CONFIG_TEST_RPC", "https://substituted.example.com");
		let toml = BASE_CONFIG.replace(
			"https://eth.example.com",
			"${VAULT_CONFIG_TEST_RPC}",
		);

		let config = loader().load_from_str(&toml).unwrap();
		assert_eq!(
			config.chains[&ChainId(1)].rpc_url,
			"https://substituted.example.com"
		);
	}

	#[test]
	fn test_missing_env_var_fails() {
		let toml = BASE_CONFIG.replace(
			"https://eth.example.com",
			"${VAULT_CONFIG_TEST_DOES_NOT_EXIST}",
		);

		let err = loader().load_from_str(&toml).unwrap_err();
		assert!(matches!(err, ConfigError::EnvVarNotFound(name) if name == "VAULT_CONFIG_TEST_DOES_NOT_EXIST"));
	}

	#[test]
	fn test_env_overrides() {
		env::set_var("VAULT_OVR_TEST_DEFAULT_NETWORK_ID", "1337");
		env::set_var("VAULT_OVR_TEST_RPC_URL_42161", "http://localhost:8545");
		env::set_var("VAULT_OVR_TEST_LOG_LEVEL", "debug");

		let config = ConfigLoader::new()
			.with_env_prefix("VAULT_OVR_TEST_")
			.load_from_str(BASE_CONFIG)
			.unwrap();

		assert_eq!(config.client.default_network_id, Some(ChainId::LOCAL));
		assert_eq!(
			config.chains[&ChainId(42161)].rpc_url,
			"http://localhost:8545"
		);
		assert_eq!(config.client.log_level, "debug");
	}

	#[test]
	fn test_validation_rejects_bad_rpc_url() {
		let toml = BASE_CONFIG.replace("https://arb.example.com", "ws://arb.example.com");
		let err = loader().load_from_str(&toml).unwrap_err();
		assert!(err.to_string().contains("must start with http"));
	}

	#[test]
	fn test_validation_requires_chains() {
		let toml = r#"
chains = {}

[client]
name = "empty"
contracts_path = "contracts.json"
"#;
		let err = loader().load_from_str(toml).unwrap_err();
		assert!(err.to_string().contains("At least one chain"));
	}

	#[test]
	fn test_validation_rejects_poll_longer_than_timeout() {
		let toml = format!(
			"{}\n[confirmation]\ntimeout_secs = 1\npoll_interval_ms = 5000\n",
			BASE_CONFIG
		);
		let err = loader().load_from_str(&toml).unwrap_err();
		assert!(err.to_string().contains("poll interval must not exceed"));
	}

	#[tokio::test]
	async fn test_load_from_file() {
		let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
		file.write_all(BASE_CONFIG.as_bytes()).unwrap();

		let config = loader().with_file(file.path()).load().await.unwrap();
		assert_eq!(config.chains.len(), 2);
	}

	#[tokio::test]
	async fn test_load_missing_file() {
		let err = loader()
			.with_file("/definitely/not/here.toml")
			.load()
			.await
			.unwrap_err();
		assert!(matches!(err, ConfigError::FileNotFound(_)));
	}

	#[test]
	fn test_parse_contract_artifacts() {
		let json = r#"{
			"VaultFactory": {
				"abi": [
					{
						"type": "function",
						"name": "getVaults",
						"inputs": [{ "name": "user", "type": "address" }],
						"outputs": [{ "name": "", "type": "address[]" }],
						"stateMutability": "view"
					}
				],
				"addresses": { "1337": "0x5FbDB2315678afecb367f032d93F642f64180aa3" }
			},
			"PositionVault": { "abi": [] }
		}"#;

		let artifacts = parse_contract_artifacts(json).unwrap();
		let factory = &artifacts["VaultFactory"];
		assert!(factory.abi.function("getVaults").is_some());
		assert_eq!(
			factory.addresses[&ChainId::LOCAL],
			"0x5FbDB2315678afecb367f032d93F642f64180aa3"
				.parse::<Address>()
				.unwrap()
		);
		assert!(artifacts["PositionVault"].addresses.is_empty());
	}

	#[test]
	fn test_parse_contract_artifacts_rejects_bad_address() {
		let json = r#"{ "BatchExecutor": { "abi": [], "addresses": { "1": "0x1234" } } }"#;
		assert!(matches!(
			parse_contract_artifacts(json),
			Err(ConfigError::ParseError(_))
		));
	}
}
