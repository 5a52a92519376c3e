//! Headless proposal board.
//!
//! The board lists every proposal of the DAO, lets the connected account
//! create a new one from a draft and vote in favor of any listed proposal.
//! Reads are cached by proposal id; only a confirmed write invalidates
//! the cache.

use std::str::FromStr;

use alloy_primitives::U256;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
	cache::ProposalCache,
	contract::{Confirmation, DaoContract},
	proposal::ProposalId,
	session::Session,
	DaoError, DaoResult,
};

/// Label of the action attached to every card
pub const VOTE_LABEL: &str = "Vote in favor";

/// Form fields for a new proposal. Kept as typed after a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Draft {
	/// Destination BTC address
	pub btc_address: String,
	/// Amount, as typed
	pub value: String,
}

impl Default for Draft {
	fn default() -> Self {
		Self {
			btc_address: String::new(),
			value: "0".to_string(),
		}
	}
}

/// The last failure, as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorArea {
	/// Error variant, see [`DaoError::kind`]
	pub kind: &'static str,
	/// Error message
	pub message: String,
}

impl From<&DaoError> for ErrorArea {
	fn from(err: &DaoError) -> Self {
		Self {
			kind: err.kind(),
			message: err.to_string(),
		}
	}
}

/// A listed proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposalCard {
	/// Id to vote with
	pub id: ProposalId,
	/// Card title
	pub title: String,
	/// Destination BTC address
	pub btc_address: String,
	/// Amount in decimal
	pub amount: String,
	/// Vote action label
	pub vote_label: &'static str,
}

/// Everything the board displays
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
	/// Proposal count last read from the contract
	pub proposal_count: u64,
	/// One card per proposal, in id order
	pub cards: Vec<ProposalCard>,
	/// Current draft
	pub draft: Draft,
	/// Last failure, if any
	pub error: Option<ErrorArea>,
}

/// Proposal board bound to a contract and a wallet session
#[derive(Debug)]
pub struct ProposalBoard<C> {
	contract: C,
	session: Session,
	cache: ProposalCache,
	proposal_count: u64,
	draft: Draft,
	error: Option<ErrorArea>,
}

impl<C: DaoContract> ProposalBoard<C> {
	/// Create an empty board, call [`ProposalBoard::refresh`] to load it
	pub fn new(contract: C, session: Session) -> Self {
		Self {
			contract,
			session,
			cache: ProposalCache::new(),
			proposal_count: 0,
			draft: Draft::default(),
			error: None,
		}
	}

	/// The contract this board talks to
	pub fn contract(&self) -> &C {
		&self.contract
	}

	/// The wallet session used for every call
	pub fn session(&self) -> &Session {
		&self.session
	}

	/// Read the proposal count and every proposal not cached yet
	pub async fn refresh(&mut self) -> DaoResult<()> {
		self.error = None;
		let result = self.load().await;
		self.record(result)
	}

	async fn load(&mut self) -> DaoResult<()> {
		let count = self.contract.proposal_count(&self.session).await?;

		if count < self.proposal_count {
			debug!(
				"Proposal count shrank from {} to {}",
				self.proposal_count, count
			);
		}

		self.proposal_count = count;
		self.cache.retain_below(count);

		let missing = self.cache.missing(count);
		if missing.is_empty() {
			return Ok(());
		}

		let proposals = self.contract.proposals(&self.session, &missing).await?;
		self.cache.extend(proposals);

		Ok(())
	}

	/// Update the draft's BTC address
	pub fn set_btc_address(&mut self, btc_address: impl Into<String>) {
		self.draft.btc_address = btc_address.into();
	}

	/// Update the draft's value
	pub fn set_value(&mut self, value: impl Into<String>) {
		self.draft.value = value.into();
	}

	/// Submit the draft as a new proposal
	pub async fn create_proposal(&mut self) -> DaoResult<Confirmation> {
		self.error = None;
		let result = self.submit_draft().await;
		self.record(result)
	}

	async fn submit_draft(&mut self) -> DaoResult<Confirmation> {
		if self.draft.btc_address.is_empty() {
			return Err(DaoError::InvalidInput("btc_address"));
		}

		let amount = U256::from_str(self.draft.value.trim())
			.map_err(|_| DaoError::InvalidInput("value"))?;

		self.contract
			.create_proposal(&self.session, &self.draft.btc_address, amount)
			.await
	}

	/// Vote in favor of proposal `id`
	pub async fn vote(&mut self, id: ProposalId) -> DaoResult<Confirmation> {
		self.error = None;
		let result = self.contract.vote(&self.session, id).await;

		if result.is_ok() {
			self.cache.invalidate(id);
		}

		self.record(result)
	}

	fn record<T>(&mut self, result: DaoResult<T>) -> DaoResult<T> {
		if let Err(err) = &result {
			warn!("Proposal board operation failed: {}", err);
			self.error = Some(err.into());
		}

		result
	}

	/// Render the board
	pub fn view(&self) -> BoardView {
		let cards = self
			.cache
			.proposals()
			.map(|proposal| ProposalCard {
				id: proposal.id,
				title: format!("Proposal #{}", proposal.id),
				btc_address: proposal.btc_address.clone(),
				amount: proposal.amount.to_string(),
				vote_label: VOTE_LABEL,
			})
			.collect();

		BoardView {
			proposal_count: self.proposal_count,
			cards,
			draft: self.draft.clone(),
			error: self.error.clone(),
		}
	}
}
