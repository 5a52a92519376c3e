use std::sync::{Mutex, MutexGuard};

use alloy_primitives::{TxHash, U256};
use async_trait::async_trait;

use crate::{
	contract::{Confirmation, DaoContract},
	proposal::{Proposal, ProposalId},
	session::Session,
	DaoError, DaoResult,
};

/// A write recorded by [`MockDao`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
	/// `sendBTCProposal(btc_address, amount)`
	CreateProposal {
		/// Destination BTC address
		btc_address: String,
		/// Amount
		amount: U256,
	},
	/// `voteOnProposal(id)`
	Vote(ProposalId),
}

#[derive(Debug, Default)]
struct MockState {
	proposals: Vec<(String, U256)>,
	count: Option<u64>,
	batch_requests: Vec<Vec<ProposalId>>,
	writes: Vec<Write>,
	rejection: Option<String>,
	fail_reads: bool,
}

/// In-memory DAO contract recording every batched read and write
#[derive(Debug, Default)]
pub struct MockDao(Mutex<MockState>);

impl MockDao {
	fn state(&self) -> MutexGuard<'_, MockState> {
		self.0.lock().unwrap()
	}

	/// Append a proposal as if created on chain
	pub fn push_proposal(&self, btc_address: impl Into<String>, amount: U256) {
		self.state().proposals.push((btc_address.into(), amount));
	}

	/// Report `count` proposals regardless of how many are stored
	pub fn set_count(&self, count: u64) {
		self.state().count = Some(count);
	}

	/// Make every following write fail as if the wallet refused it
	pub fn reject_writes(&self, message: impl Into<String>) {
		self.state().rejection = Some(message.into());
	}

	/// Let writes through again
	pub fn accept_writes(&self) {
		self.state().rejection = None;
	}

	/// Make every following read fail
	pub fn fail_reads(&self, fail: bool) {
		self.state().fail_reads = fail;
	}

	/// Ids requested by each batched read, in call order
	pub fn batch_requests(&self) -> Vec<Vec<ProposalId>> {
		self.state().batch_requests.clone()
	}

	/// Writes issued, in call order
	pub fn writes(&self) -> Vec<Write> {
		self.state().writes.clone()
	}

	fn confirm(&self, write: Write) -> DaoResult<Confirmation> {
		let mut state = self.state();

		if let Some(message) = &state.rejection {
			return Err(DaoError::UserRejected {
				message: message.clone(),
			});
		}

		if let Write::CreateProposal {
			btc_address,
			amount,
		} = &write
		{
			state.proposals.push((btc_address.clone(), *amount));
			state.count = None;
		}

		state.writes.push(write);

		Ok(Confirmation {
			tx_hash: TxHash::with_last_byte(state.writes.len() as u8),
			block_number: Some(state.writes.len() as u64),
		})
	}

	fn read_failure() -> DaoError {
		DaoError::Rpc {
			code: -32000,
			message: "header not found".to_string(),
		}
	}
}

#[async_trait]
impl DaoContract for MockDao {
	async fn proposal_count(&self, _session: &Session) -> DaoResult<u64> {
		let state = self.state();

		if state.fail_reads {
			return Err(Self::read_failure());
		}

		Ok(state.count.unwrap_or(state.proposals.len() as u64))
	}

	async fn proposals(
		&self,
		_session: &Session,
		ids: &[ProposalId],
	) -> DaoResult<Vec<Proposal>> {
		let mut state = self.state();

		if state.fail_reads {
			return Err(Self::read_failure());
		}

		state.batch_requests.push(ids.to_vec());

		ids.iter()
			.map(|id| {
				let (btc_address, amount) = state
					.proposals
					.get(id.0 as usize)
					.cloned()
					.ok_or_else(|| {
						DaoError::ContractRevert("unknown proposal".to_string())
					})?;

				Ok(Proposal {
					id: *id,
					btc_address,
					amount,
				})
			})
			.collect()
	}

	async fn create_proposal(
		&self,
		_session: &Session,
		btc_address: &str,
		amount: U256,
	) -> DaoResult<Confirmation> {
		self.confirm(Write::CreateProposal {
			btc_address: btc_address.to_string(),
			amount,
		})
	}

	async fn vote(
		&self,
		_session: &Session,
		id: ProposalId,
	) -> DaoResult<Confirmation> {
		self.confirm(Write::Vote(id))
	}
}
