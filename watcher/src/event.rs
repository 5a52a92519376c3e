//! Events observed by the watcher

use std::fmt;

use alloy_primitives::{TxHash, U256};
use alloy_sol_types::SolEvent;
use dao_core::{abi::IDao::AcceptedBTCProposalEvent, rpc::Log};
use serde::Serialize;

/// A proposal the DAO accepted, ready to be executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptedProposal {
	/// Proposal id
	pub proposal_id: U256,
	/// Destination address
	pub btc_address: String,
	/// Amount to transfer
	pub amount: U256,
	/// Block the event was emitted in
	pub block_number: Option<u64>,
	/// Transaction emitting the event
	pub transaction_hash: Option<TxHash>,
}

impl AcceptedProposal {
	/// Decode an `AcceptedBTCProposalEvent` log
	pub fn from_log(log: &Log) -> Result<Self, alloy_sol_types::Error> {
		let event = AcceptedBTCProposalEvent::decode_raw_log(
			log.topics.iter().copied(),
			&log.data,
		)?;

		Ok(Self {
			proposal_id: event.proposalId,
			btc_address: event.btcAddress,
			amount: event.amount,
			block_number: log.block_number.map(|number| number.to()),
			transaction_hash: log.transaction_hash,
		})
	}
}

impl fmt::Display for AcceptedProposal {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"Proposal #{} accepted: {} to {}",
			self.proposal_id, self.amount, self.btc_address
		)?;

		if let Some(block_number) = self.block_number {
			write!(f, " at block {}", block_number)?;
		}

		Ok(())
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use alloy_primitives::{Address, Bytes, B256, U64};
	use alloy_sol_types::SolValue;

	use super::*;

	pub(crate) fn accepted_log(id: u64, btc_address: &str, amount: u64) -> Log {
		let data = (U256::from(id), btc_address.to_string(), U256::from(amount))
			.abi_encode_params();

		Log {
			address: Address::repeat_byte(0xaa),
			topics: vec![AcceptedBTCProposalEvent::SIGNATURE_HASH],
			data: Bytes::from(data),
			block_number: Some(U64::from(42)),
			transaction_hash: Some(TxHash::repeat_byte(0x01)),
		}
	}

	#[test]
	fn should_decode_accepted_proposal() {
		let log = accepted_log(7, "bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh", 21);

		let proposal = AcceptedProposal::from_log(&log).unwrap();

		assert_eq!(proposal.proposal_id, U256::from(7));
		assert_eq!(
			proposal.btc_address,
			"bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh"
		);
		assert_eq!(proposal.amount, U256::from(21));
		assert_eq!(
			proposal.to_string(),
			"Proposal #7 accepted: 21 to bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh at block 42"
		);
	}

	#[test]
	fn should_reject_log_of_another_event() {
		let mut log = accepted_log(1, "bc1q", 1);
		log.topics = vec![B256::repeat_byte(0x99)];

		assert!(AcceptedProposal::from_log(&log).is_err());
	}
}
