//! `btc-dao vote`

use anyhow::Context;
use clap::Parser;
use dao_core::{
	board::ProposalBoard, contract::DaoContract, proposal::ProposalId,
};
use tracing::info;

use crate::commands::utils::WriteReport;

/// Arguments of `btc-dao vote`
#[derive(Parser, Debug, Clone)]
pub struct VoteArgs {
	/// Proposal to vote in favor of
	pub id: u64,
}

/// Vote in favor of a listed proposal and wait for the vote to be mined
pub async fn vote<C: DaoContract>(
	board: &mut ProposalBoard<C>,
	args: &VoteArgs,
) -> anyhow::Result<WriteReport> {
	board.refresh().await.context("Could not load the proposals")?;

	let id = ProposalId(args.id);
	if args.id >= board.view().proposal_count {
		anyhow::bail!("Proposal #{} does not exist", id);
	}

	let confirmation = board
		.vote(id)
		.await
		.with_context(|| format!("Could not vote on proposal #{}", id))?;

	info!("Voted on proposal #{} in {}", id, confirmation.tx_hash);

	board.refresh().await.context("Could not reload the proposals")?;

	Ok(WriteReport {
		confirmation,
		board: board.view(),
	})
}

#[cfg(test)]
mod tests {
	use alloy_primitives::{Address, U256};
	use assert_matches::assert_matches;
	use dao_core::{
		session::Session,
		testing::{MockDao, Write},
		DaoError,
	};

	use super::*;

	fn board(proposals: u64) -> ProposalBoard<MockDao> {
		let dao = MockDao::default();
		for i in 0..proposals {
			dao.push_proposal(format!("bc1q{i}"), U256::from(i));
		}

		ProposalBoard::new(dao, Session::new(Address::repeat_byte(0x11), 1))
	}

	#[tokio::test]
	async fn should_vote_on_listed_proposal() {
		let mut board = board(3);

		let report = vote(&mut board, &VoteArgs { id: 2 }).await.unwrap();

		assert_eq!(board.contract().writes(), vec![Write::Vote(ProposalId(2))]);
		assert_eq!(report.board.cards.len(), 3);
		assert!(report.board.error.is_none());
	}

	#[tokio::test]
	async fn should_not_vote_on_unknown_proposal() {
		let mut board = board(2);

		assert!(vote(&mut board, &VoteArgs { id: 2 }).await.is_err());
		assert!(board.contract().writes().is_empty());
	}

	#[tokio::test]
	async fn should_surface_wallet_rejection() {
		let mut board = board(1);
		board.contract().reject_writes("User rejected");

		let err = vote(&mut board, &VoteArgs { id: 0 }).await.unwrap_err();

		assert_matches!(
			err.downcast_ref::<DaoError>(),
			Some(DaoError::UserRejected { message }) if message == "User rejected"
		);
		assert_eq!(board.view().error.unwrap().message, "User rejected");
	}
}
