use std::{fs::read_to_string, path::Path, time::Duration};

use alloy_primitives::{address, Address};
use serde::{de::DeserializeOwned, Deserialize};
use url::Url;

use crate::{
	contract::RpcDao,
	rpc::RpcClient,
	session::Session,
	DaoResult,
};

/// Address of the deployed DAO contract
pub const DEFAULT_CONTRACT_ADDRESS: Address =
	address!("A6E782af1b182329282CC67f1ce0f4680030E12F");

const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;

/// The `[dao]` table. Both the CLI and the watcher read the contract
/// address from here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DaoConfig {
	/// Wallet or node JSON-RPC endpoint
	pub rpc_url: Url,

	/// DAO contract address
	#[serde(default = "default_contract_address")]
	pub contract_address: Address,

	/// Account to act as, the wallet's first account otherwise
	#[serde(default)]
	pub account: Option<Address>,

	/// How long to wait for a write to be mined
	#[serde(default = "default_confirmation_timeout_secs")]
	pub confirmation_timeout_secs: u64,
}

fn default_contract_address() -> Address {
	DEFAULT_CONTRACT_ADDRESS
}

fn default_confirmation_timeout_secs() -> u64 {
	DEFAULT_CONFIRMATION_TIMEOUT_SECS
}

impl DaoConfig {
	/// Confirmation timeout as a duration
	pub fn confirmation_timeout(&self) -> Duration {
		Duration::from_secs(self.confirmation_timeout_secs)
	}

	/// JSON-RPC client for `rpc_url`
	pub fn rpc_client(&self) -> RpcClient {
		RpcClient::new(self.rpc_url.clone(), reqwest::Client::new())
	}

	/// Contract handle for the configured DAO
	pub fn contract(&self) -> RpcDao {
		RpcDao::new(
			self.rpc_client(),
			self.contract_address,
			self.confirmation_timeout(),
		)
	}

	/// Connect to the wallet with the configured account
	pub async fn connect(&self, client: &RpcClient) -> DaoResult<Session> {
		Session::connect(client, self.account).await
	}
}

/// Read a TOML config file
pub fn read_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> DaoResult<T> {
	let contents = read_to_string(path)?;
	Ok(toml::from_str(&contents)?)
}
