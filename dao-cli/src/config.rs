//! Config file handling

use std::{
	fs::{create_dir_all, OpenOptions},
	io::Write,
	path::{Path, PathBuf},
};

use anyhow::Context;
use dao_core::config::DaoConfig;
use serde::Deserialize;

/// Template written by `btc-dao init`
pub const GENERATED_CONFIG: &str = include_str!("../generated_config.toml");

/// The parts of the config file the CLI reads
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	/// DAO contract and wallet endpoint
	pub dao: DaoConfig,
}

/// `~/.config/btc-dao/config.toml`
pub fn default_config_path() -> anyhow::Result<PathBuf> {
	let home_path =
		dirs::home_dir().context("Could not find the home directory")?;

	Ok(home_path.join(".config/btc-dao/config.toml"))
}

/// Write the template to `config_path` unless a file is already there.
/// Returns whether the file was created.
pub fn generate_config(config_path: &Path) -> anyhow::Result<bool> {
	if let Some(parent) = config_path.parent() {
		create_dir_all(parent)?;
	}

	if config_path.exists() {
		return Ok(false);
	}

	let mut config_file = OpenOptions::new()
		.create_new(true)
		.write(true)
		.open(config_path)
		.with_context(|| {
			format!("Could not create {}", config_path.display())
		})?;

	config_file.write_all(GENERATED_CONFIG.as_bytes())?;
	config_file.flush()?;

	Ok(true)
}

/// Read the config file at `config_path`
pub fn read_config(config_path: &Path) -> anyhow::Result<Config> {
	dao_core::config::read_config(config_path).with_context(|| {
		format!(
			"Could not read {}, run `btc-dao init` to create it",
			config_path.display()
		)
	})
}

#[cfg(test)]
mod tests {
	use dao_core::config::DEFAULT_CONTRACT_ADDRESS;

	use super::*;

	#[test]
	fn should_generate_readable_config_once() {
		let dir = tempfile::tempdir().unwrap();
		let config_path = dir.path().join("btc-dao/config.toml");

		assert!(generate_config(&config_path).unwrap());
		assert!(!generate_config(&config_path).unwrap());

		let config = read_config(&config_path).unwrap();
		assert_eq!(config.dao.contract_address, DEFAULT_CONTRACT_ADDRESS);
		assert_eq!(config.dao.account, None);
		assert_eq!(config.dao.rpc_url.as_str(), "http://127.0.0.1:8545/");
	}

	#[test]
	fn should_point_at_init_when_missing() {
		let dir = tempfile::tempdir().unwrap();

		let err = read_config(&dir.path().join("config.toml")).unwrap_err();

		assert!(err.to_string().contains("btc-dao init"));
	}
}
