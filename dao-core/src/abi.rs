use alloy_sol_types::sol;

sol! {
	/// BTC proposal DAO
	interface IDao {
		/// Emitted once a proposal gathered enough votes
		event AcceptedBTCProposalEvent(uint256 proposalId, string btcAddress, uint256 amount);

		/// Number of proposals created so far. Ids are `0..proposalIds()`
		function proposalIds() external view returns (uint256);

		function proposals(uint256 proposalId) external view returns (string btcAddress, uint256 amount);

		function sendBTCProposal(string btcAddress, uint256 amount) external;

		function voteOnProposal(uint256 proposalId) external;
	}

	/// Token used to execute accepted proposals on the relay chain
	interface IErc20 {
		function transfer(address to, uint256 amount) external returns (bool);
	}
}

#[cfg(test)]
mod tests {
	use alloy_primitives::U256;
	use alloy_sol_types::{SolCall, SolEvent, SolValue};

	use super::*;

	#[test]
	fn should_use_selector_of_vote_on_proposal() {
		let call = IDao::voteOnProposalCall {
			proposalId: U256::from(2),
		};
		let data = call.abi_encode();

		assert_eq!(&data[..4], &IDao::voteOnProposalCall::SELECTOR);
		assert_eq!(data.len(), 4 + 32);
		assert_eq!(data[35], 2);
	}

	#[test]
	fn should_decode_proposal_returns() {
		let encoded = ("1A1zP1eP".to_string(), U256::from(5)).abi_encode_params();

		let proposal =
			IDao::proposalsCall::abi_decode_returns(&encoded).unwrap();

		assert_eq!(proposal.btcAddress, "1A1zP1eP");
		assert_eq!(proposal.amount, U256::from(5));
	}

	#[test]
	fn should_hash_accepted_event_signature() {
		assert_eq!(
			IDao::AcceptedBTCProposalEvent::SIGNATURE,
			"AcceptedBTCProposalEvent(uint256,string,uint256)"
		);
	}
}
