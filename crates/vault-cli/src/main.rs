use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vault_account::{AccountInterface, LocalWallet};
use vault_config::{load_contract_artifacts, ConfigLoader, VaultConfig};
use vault_core::VaultClient;
use vault_types::{Address, BlockNumber, ChainId};

#[derive(Parser)]
#[command(name = "vault-client")]
#[command(about = "Multi-chain vault client", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[arg(short, long, value_name = "FILE", default_value = "config/local.toml")]
	config: PathBuf,

	#[arg(long, env = "VAULT_LOG_LEVEL", default_value = "info")]
	log_level: String,
}

#[derive(Subcommand)]
enum Commands {
	/// Validate the configuration and contract artifact files
	Validate,
	/// List configured networks
	Chains,
	/// List platform adapters available on a network
	Platforms {
		#[arg(long)]
		chain: ChainId,
	},
	/// List the vaults owned by an address
	Vaults {
		#[arg(long)]
		chain: ChainId,
		#[arg(long)]
		owner: Address,
	},
	/// Show factory metadata for a vault
	VaultInfo {
		#[arg(long)]
		chain: ChainId,
		#[arg(long)]
		vault: Address,
	},
	/// Show events emitted by a vault
	History {
		#[arg(long)]
		chain: ChainId,
		#[arg(long)]
		vault: Address,
		#[arg(long, default_value_t = 0)]
		from_block: BlockNumber,
		#[arg(long)]
		to_block: Option<BlockNumber>,
	},
	/// Deploy a new vault through the factory
	CreateVault {
		#[arg(long)]
		chain: ChainId,
		#[arg(long)]
		name: String,
		#[arg(long, env = "VAULT_PRIVATE_KEY", hide_env_values = true)]
		private_key: String,
	},
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	// Initialize tracing
	setup_tracing(&cli.log_level)?;

	let config = load_config(&cli.config).await?;

	match cli.command {
		Commands::Validate => validate_config(config).await,
		Commands::Chains => list_chains(client(config).await?),
		Commands::Platforms { chain } => list_platforms(client(config).await?, chain),
		Commands::Vaults { chain, owner } => {
			let client = client(config).await?;
			let connection = client.connect(chain)?;
			let vaults = client
				.get_user_vaults(owner, &connection, Some(chain))
				.await
				.context("Failed to fetch vaults")?;

			info!("Found {} vaults for {}", vaults.len(), owner);
			for vault in vaults {
				println!("{}", vault);
			}
			Ok(())
		}
		Commands::VaultInfo { chain, vault } => {
			let client = client(config).await?;
			let connection = client.connect(chain)?;
			let vault_info = client
				.get_vault_info(vault, &connection, Some(chain))
				.await
				.context("Failed to fetch vault info")?;

			println!("owner:         {}", vault_info.owner);
			println!("name:          {}", vault_info.name);
			println!("creation_time: {}", vault_info.creation_time);
			Ok(())
		}
		Commands::History {
			chain,
			vault,
			from_block,
			to_block,
		} => {
			let client = client(config).await?;
			let connection = client.connect(chain)?;
			let events = client
				.get_vault_history(vault, from_block, to_block, &connection, Some(chain))
				.await
				.context("Failed to fetch vault history")?;

			for event in events {
				let arguments: Vec<String> = event
					.arguments
					.iter()
					.map(|arg| format!("{}={:?}", arg.name, arg.value))
					.collect();
				println!(
					"{} {} [{}]",
					event.log_index.map_or("-".to_string(), |index| index.to_string()),
					event.name,
					arguments.join(", ")
				);
			}
			Ok(())
		}
		Commands::CreateVault {
			chain,
			name,
			private_key,
		} => {
			let client = client(config).await?;
			let rpc_url = client
				.chains()
				.rpc_url(chain)
				.with_context(|| format!("Chain {} is not configured", chain))?;
			let wallet = LocalWallet::connect(&private_key, rpc_url).context("Invalid signer")?;
			info!("Creating vault {:?} from {}", name, wallet.address());

			let vault = client
				.create_vault(&name, Arc::new(wallet), Some(chain))
				.await
				.context("Failed to create vault")?;

			println!("{}", vault);
			Ok(())
		}
	}
}

async fn load_config(path: &PathBuf) -> Result<VaultConfig> {
	info!("Loading configuration from: {:?}", path);
	ConfigLoader::new()
		.with_file(path)
		.load()
		.await
		.context("Failed to load configuration")
}

async fn client(config: VaultConfig) -> Result<VaultClient> {
	VaultClient::from_config(config)
		.await
		.context("Failed to build vault client")
}

async fn validate_config(config: VaultConfig) -> Result<()> {
	let artifacts = load_contract_artifacts(&config.client.contracts_path)
		.await
		.context("Failed to load contract artifacts")?;

	info!("Configuration is valid");
	info!("Client name: {}", config.client.name);
	match config.client.default_network_id {
		Some(chain_id) => info!("Default network: {}", chain_id),
		None => info!("Default network: none"),
	}

	for (name, artifact) in &artifacts {
		let mut networks: Vec<ChainId> = artifact.addresses.keys().copied().collect();
		networks.sort();
		info!("  Contract: {} deployed on {:?}", name, networks);
	}

	Ok(())
}

fn list_chains(client: VaultClient) -> Result<()> {
	let chains = client.chains();
	for chain_id in chains.supported_chain_ids() {
		println!(
			"{:>8}  {:<20} {}  platforms: [{}]",
			chain_id.to_string(),
			chains.chain_name(chain_id),
			chains.rpc_url(chain_id).unwrap_or("-"),
			chains.chain_platform_ids(chain_id).join(", ")
		);
	}
	Ok(())
}

fn list_platforms(client: VaultClient, chain: ChainId) -> Result<()> {
	let connection = client.connect(chain)?;
	let adapters = client.get_adapters_for_chain(chain, &connection);

	if adapters.is_empty() {
		info!("No platform adapters available on {}", client.chains().chain_name(chain));
	}

	for adapter in adapters {
		let deployment = adapter
			.deployment()
			.with_context(|| format!("Platform {} has no deployment", adapter.platform_id()))?;
		println!(
			"{} ({})  factory: {}  position manager: {}  fee tiers: {:?}",
			adapter.platform_name(),
			adapter.platform_id(),
			deployment.factory_address,
			deployment.position_manager_address,
			adapter.fee_tiers()
		);
	}
	Ok(())
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.init();

	Ok(())
}
