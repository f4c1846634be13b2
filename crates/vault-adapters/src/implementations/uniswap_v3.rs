//! Uniswap V3 concentrated liquidity adapter.

use crate::{lookup_deployment, AdapterContext, AdapterError, AdapterInterface};
use vault_contracts::Connection;
use vault_types::{ChainId, PlatformDeployment};

const FEE_TIERS: [u32; 4] = [100, 500, 3000, 10000];

pub struct UniswapV3Adapter {
	context: AdapterContext,
}

impl UniswapV3Adapter {
	pub const PLATFORM_ID: &'static str = "uniswapV3";
	pub const PLATFORM_NAME: &'static str = "Uniswap V3";

	pub fn new(context: AdapterContext) -> Self {
		Self { context }
	}

	pub fn connection(&self) -> &Connection {
		&self.context.connection
	}
}

impl AdapterInterface for UniswapV3Adapter {
	fn platform_id(&self) -> &str {
		Self::PLATFORM_ID
	}

	fn platform_name(&self) -> &str {
		Self::PLATFORM_NAME
	}

	fn chain_id(&self) -> Option<ChainId> {
		self.context.chain_id
	}

	fn fee_tiers(&self) -> &[u32] {
		&FEE_TIERS
	}

	fn deployment_on(&self, chain_id: ChainId) -> Result<PlatformDeployment, AdapterError> {
		lookup_deployment(&self.context.chains, Self::PLATFORM_ID, chain_id)
	}
}
