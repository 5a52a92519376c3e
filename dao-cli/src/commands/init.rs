//! `btc-dao init`

use std::path::Path;

use crate::config::generate_config;

/// Write the config template to `config_path`
pub fn init(config_path: &Path) -> anyhow::Result<()> {
	if generate_config(config_path)? {
		println!(
			"Config file created at {}, make sure to update it before using",
			config_path.display()
		);
	} else {
		println!("Config file already exists at {}", config_path.display());
	}

	Ok(())
}
