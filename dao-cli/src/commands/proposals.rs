//! `btc-dao proposals`

use anyhow::Context;
use dao_core::{
	board::{BoardView, ProposalBoard},
	contract::DaoContract,
};

/// Load every proposal of the DAO
pub async fn list_proposals<C: DaoContract>(
	board: &mut ProposalBoard<C>,
) -> anyhow::Result<BoardView> {
	board.refresh().await.context("Could not load the proposals")?;

	Ok(board.view())
}
