//! `btc-dao create`

use anyhow::Context;
use clap::Parser;
use dao_core::{board::ProposalBoard, contract::DaoContract};
use tracing::info;

use crate::commands::utils::WriteReport;

/// Arguments of `btc-dao create`
#[derive(Parser, Debug, Clone)]
pub struct CreateArgs {
	/// BTC address the proposal pays to
	#[arg(long)]
	pub btc_address: String,
	/// Amount to pay, in decimal
	#[arg(long, default_value = "0")]
	pub value: String,
}

/// Submit a new proposal and wait for it to be mined
pub async fn create_proposal<C: DaoContract>(
	board: &mut ProposalBoard<C>,
	args: &CreateArgs,
) -> anyhow::Result<WriteReport> {
	board.set_btc_address(args.btc_address.as_str());
	board.set_value(args.value.as_str());

	let confirmation = board
		.create_proposal()
		.await
		.context("Could not create the proposal")?;

	info!("Proposal created in {}", confirmation.tx_hash);

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

	fn board() -> ProposalBoard<MockDao> {
		ProposalBoard::new(
			MockDao::default(),
			Session::new(Address::repeat_byte(0x11), 1),
		)
	}

	fn args(btc_address: &str, value: &str) -> CreateArgs {
		CreateArgs {
			btc_address: btc_address.to_string(),
			value: value.to_string(),
		}
	}

	#[tokio::test]
	async fn should_list_created_proposal() {
		let mut board = board();

		let report = create_proposal(&mut board, &args("bc1qdest", "1500"))
			.await
			.unwrap();

		assert_eq!(report.board.proposal_count, 1);
		assert_eq!(report.board.cards[0].btc_address, "bc1qdest");
		assert_eq!(report.board.cards[0].amount, "1500");
		assert_eq!(
			board.contract().writes(),
			vec![Write::CreateProposal {
				btc_address: "bc1qdest".to_string(),
				amount: U256::from(1500),
			}]
		);
	}

	#[tokio::test]
	async fn should_refuse_unparseable_value() {
		let mut board = board();

		let err = create_proposal(&mut board, &args("bc1qdest", "lots"))
			.await
			.unwrap_err();

		assert_matches!(
			err.downcast_ref::<DaoError>(),
			Some(DaoError::InvalidInput("value"))
		);
		assert!(board.contract().writes().is_empty());
	}
}
