//! Helpers shared by the subcommands

use anyhow::Context;
use dao_core::{
	board::{BoardView, ProposalBoard},
	contract::{Confirmation, RpcDao},
};
use serde::Serialize;

use crate::config::Config;

/// Printed after a confirmed write
#[derive(Debug, Clone, Serialize)]
pub struct WriteReport {
	/// The mined transaction
	pub confirmation: Confirmation,
	/// The board as refreshed after the write
	pub board: BoardView,
}

/// Connect to the configured wallet and build an empty board
pub async fn connect_board(
	config: &Config,
) -> anyhow::Result<ProposalBoard<RpcDao>> {
	let contract = config.dao.contract();
	let session = config
		.dao
		.connect(contract.client())
		.await
		.with_context(|| {
			format!("Could not connect to {}", config.dao.rpc_url)
		})?;

	Ok(ProposalBoard::new(contract, session))
}
