//! Watcher configuration

use std::{path::PathBuf, time::Duration};

use alloy_primitives::Address;
use clap::Parser;
use dao_core::config::{read_config, DaoConfig};
use url::Url;

/// BTC proposal watcher
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
	/// Where the config file is located
	#[arg(short, long, value_name = "FILE")]
	pub config_file: PathBuf,
}

/// Watcher configuration, read once at startup
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
	/// DAO contract and the node to reach it through
	pub dao: DaoConfig,

	/// Polling settings
	#[serde(default)]
	pub watcher: PollConfig,

	/// Token relay executing accepted proposals, log only when absent
	#[serde(default)]
	pub relay: Option<RelayConfig>,
}

/// How often and how many times to poll
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct PollConfig {
	/// Number of polls before the watcher stops by itself
	pub poll_limit: u64,

	/// Seconds between two polls
	pub poll_interval_secs: u64,
}

impl Default for PollConfig {
	fn default() -> Self {
		Self {
			poll_limit: 3,
			poll_interval_secs: 10,
		}
	}
}

impl PollConfig {
	/// Interval between two polls
	pub fn poll_interval(&self) -> Duration {
		Duration::from_secs(self.poll_interval_secs)
	}
}

/// ERC-20 token used to execute accepted proposals on another chain
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct RelayConfig {
	/// Node of the relay chain
	pub rpc_url: Url,

	/// Token contract
	pub token_address: Address,

	/// Chain id of the relay chain
	pub chain_id: u64,

	/// Account holding the tokens, managed by the node's wallet
	pub account: Address,
}

impl Config {
	/// Read the config file specified in the CLI args
	pub fn from_args(args: Cli) -> anyhow::Result<Self> {
		let config: Self = read_config(&args.config_file)?;

		anyhow::ensure!(
			config.watcher.poll_limit > 0,
			"watcher.poll_limit must be at least 1"
		);

		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use super::*;

	#[test]
	fn should_default_to_three_polls_every_ten_seconds() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[dao]\nrpc_url = \"http://127.0.0.1:8545\"").unwrap();

		let config = Config::from_args(Cli {
			config_file: file.path().to_path_buf(),
		})
		.unwrap();

		assert_eq!(config.watcher.poll_limit, 3);
		assert_eq!(config.watcher.poll_interval(), Duration::from_secs(10));
		assert!(config.relay.is_none());
	}

	#[test]
	fn should_read_relay_table() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[dao]
rpc_url = "http://127.0.0.1:8545"

[watcher]
poll_limit = 5

[relay]
rpc_url = "http://127.0.0.1:9545"
token_address = "0x63A0bfd6a5cdCF446ae12135E2CD86b908659568"
chain_id = 11155420
account = "0x2222222222222222222222222222222222222222"
"#
		)
		.unwrap();

		let config = Config::from_args(Cli {
			config_file: file.path().to_path_buf(),
		})
		.unwrap();

		assert_eq!(config.watcher.poll_limit, 5);
		assert_eq!(config.watcher.poll_interval_secs, 10);

		let relay = config.relay.unwrap();
		assert_eq!(relay.chain_id, 11155420);
		assert_eq!(relay.account, Address::repeat_byte(0x22));
	}

	#[test]
	fn should_refuse_zero_poll_limit() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			"[dao]\nrpc_url = \"http://127.0.0.1:8545\"\n\n[watcher]\npoll_limit = 0"
		)
		.unwrap();

		let err = Config::from_args(Cli {
			config_file: file.path().to_path_buf(),
		})
		.unwrap_err();

		assert!(err.to_string().contains("poll_limit"));
	}
}
