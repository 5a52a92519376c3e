use alloy_primitives::Address;
use tracing::info;

use crate::{rpc::RpcClient, DaoError, DaoResult};

/// Wallet session: the account every read and write is made on behalf of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
	account: Address,
	chain_id: u64,
}

impl Session {
	/// Create a session for an already known account
	pub fn new(account: Address, chain_id: u64) -> Self {
		Self { account, chain_id }
	}

	/// Ask the wallet behind `client` for its accounts and chain.
	/// `preferred` wins over the wallet's first account.
	pub async fn connect(
		client: &RpcClient,
		preferred: Option<Address>,
	) -> DaoResult<Self> {
		let account = match preferred {
			Some(account) => account,
			None => client
				.accounts()
				.await?
				.first()
				.copied()
				.ok_or(DaoError::NoAccount)?,
		};
		let chain_id = client.chain_id().await?;

		info!("Connected {} on chain {}", account, chain_id);

		Ok(Self::new(account, chain_id))
	}

	/// The connected account
	pub fn account(&self) -> Address {
		self.account
	}

	/// The chain the wallet is connected to
	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}
}
