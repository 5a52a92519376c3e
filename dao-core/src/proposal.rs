use std::fmt;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Zero-based sequential id assigned by the contract
#[derive(
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
	PartialOrd,
	Ord,
	Hash,
	Serialize,
	Deserialize,
)]
#[serde(transparent)]
pub struct ProposalId(pub u64);

impl ProposalId {
	/// The id as the contract's `uint256`
	pub fn to_u256(self) -> U256 {
		U256::from(self.0)
	}

	/// All ids of a contract holding `count` proposals
	pub fn range(count: u64) -> impl Iterator<Item = ProposalId> {
		(0..count).map(ProposalId)
	}
}

impl fmt::Display for ProposalId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<u64> for ProposalId {
	fn from(id: u64) -> Self {
		Self(id)
	}
}

/// A proposal to send `amount` to `btc_address`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
	/// Proposal id
	pub id: ProposalId,
	/// Destination BTC address, free text as entered by the proposer
	pub btc_address: String,
	/// Amount to transfer
	pub amount: U256,
}
