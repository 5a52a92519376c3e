//! Execution of accepted proposals

use std::{fmt::Debug, str::FromStr, sync::Arc};

use alloy_primitives::{Address, Bytes, TxHash, U64};
use alloy_sol_types::SolCall;
use anyhow::Context;
use async_trait::async_trait;
use dao_core::{
	abi::IErc20,
	rpc::{RpcClient, TransactionRequest},
};
use tokio::sync::Mutex;
use tracing::info;

use crate::{
	chain_client::ChainClient, config::RelayConfig, event::AcceptedProposal,
};

/// Executes the transfer an accepted proposal asks for
#[async_trait]
pub trait TransferExecutor: Send + Sync + Debug {
	/// Execute `proposal`, returning the transaction hash if one was sent
	async fn execute(
		&self,
		proposal: &AcceptedProposal,
	) -> anyhow::Result<Option<TxHash>>;
}

/// Only records the accepted proposals
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingExecutor;

#[async_trait]
impl TransferExecutor for LoggingExecutor {
	async fn execute(
		&self,
		proposal: &AcceptedProposal,
	) -> anyhow::Result<Option<TxHash>> {
		info!("No relay configured, not executing: {}", proposal);
		Ok(None)
	}
}

/// Sends the proposal amount as an ERC-20 transfer on a relay chain
///
/// The relay keeps track of the last nonce it consumed so consecutive
/// transfers do not wait for each other to be mined.
#[derive(Debug)]
pub struct Erc20Relay {
	client: Arc<dyn ChainClient>,
	token: Address,
	account: Address,
	chain_id: u64,
	nonce: Mutex<Option<u64>>,
}

impl Erc20Relay {
	/// Create a new relay
	pub fn new(
		client: Arc<dyn ChainClient>,
		token: Address,
		account: Address,
		chain_id: u64,
	) -> Self {
		Self {
			client,
			token,
			account,
			chain_id,
			nonce: Mutex::new(None),
		}
	}

	/// Create a relay from its config table
	pub fn from_config(config: &RelayConfig) -> Self {
		let client =
			RpcClient::new(config.rpc_url.clone(), reqwest::Client::new());

		Self::new(
			Arc::new(client),
			config.token_address,
			config.account,
			config.chain_id,
		)
	}
}

#[async_trait]
impl TransferExecutor for Erc20Relay {
	#[tracing::instrument(skip(self, proposal), fields(proposal_id = %proposal.proposal_id))]
	async fn execute(
		&self,
		proposal: &AcceptedProposal,
	) -> anyhow::Result<Option<TxHash>> {
		let recipient = Address::from_str(&proposal.btc_address).with_context(
			|| {
				format!(
					"{} is not an address on the relay chain",
					proposal.btc_address
				)
			},
		)?;

		let mut last_nonce = self.nonce.lock().await;

		let nonce = match *last_nonce {
			Some(nonce) => nonce + 1,
			None => self.client.transaction_count(self.account).await?,
		};

		let call = IErc20::transferCall {
			to: recipient,
			amount: proposal.amount,
		};

		let tx = TransactionRequest {
			from: Some(self.account),
			to: self.token,
			data: Bytes::from(call.abi_encode()),
			nonce: Some(U64::from(nonce)),
			chain_id: Some(U64::from(self.chain_id)),
		};

		let tx_hash = self.client.send_transaction(&tx).await?;
		*last_nonce = Some(nonce);

		info!("Relayed {} with nonce {}: {}", proposal, nonce, tx_hash);

		Ok(Some(tx_hash))
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Mutex as StdMutex;

	use alloy_primitives::U256;
	use dao_core::{
		rpc::{Log, LogFilter},
		DaoError, DaoResult,
	};

	use super::*;

	#[derive(Debug, Default)]
	struct RelayNode {
		transaction_count: u64,
		sent: StdMutex<Vec<TransactionRequest>>,
		fail_sends: bool,
	}

	#[async_trait]
	impl ChainClient for RelayNode {
		async fn block_number(&self) -> DaoResult<u64> {
			Ok(0)
		}

		async fn logs(&self, _filter: &LogFilter) -> DaoResult<Vec<Log>> {
			Ok(vec![])
		}

		async fn transaction_count(&self, _address: Address) -> DaoResult<u64> {
			Ok(self.transaction_count)
		}

		async fn send_transaction(
			&self,
			tx: &TransactionRequest,
		) -> DaoResult<TxHash> {
			if self.fail_sends {
				return Err(DaoError::Rpc {
					code: -32000,
					message: "nonce too low".to_string(),
				});
			}

			let mut sent = self.sent.lock().unwrap();
			sent.push(tx.clone());
			Ok(TxHash::with_last_byte(sent.len() as u8))
		}
	}

	fn proposal(recipient: &str) -> AcceptedProposal {
		AcceptedProposal {
			proposal_id: U256::from(1),
			btc_address: recipient.to_string(),
			amount: U256::from(500),
			block_number: Some(1),
			transaction_hash: None,
		}
	}

	fn relay(node: Arc<RelayNode>) -> Erc20Relay {
		Erc20Relay::new(
			node,
			Address::repeat_byte(0x63),
			Address::repeat_byte(0x22),
			11155420,
		)
	}

	#[tokio::test]
	async fn should_start_from_node_nonce_then_increment() {
		let node = Arc::new(RelayNode {
			transaction_count: 7,
			..Default::default()
		});
		let relay = relay(node.clone());
		let recipient = format!("{}", Address::repeat_byte(0x33));

		relay.execute(&proposal(&recipient)).await.unwrap();
		relay.execute(&proposal(&recipient)).await.unwrap();

		let sent = node.sent.lock().unwrap();
		assert_eq!(sent[0].nonce, Some(U64::from(7)));
		assert_eq!(sent[1].nonce, Some(U64::from(8)));
		assert_eq!(sent[0].chain_id, Some(U64::from(11155420)));
		assert_eq!(sent[0].to, Address::repeat_byte(0x63));
		assert_eq!(&sent[0].data[..4], &IErc20::transferCall::SELECTOR);
	}

	#[tokio::test]
	async fn should_refuse_non_evm_recipient() {
		let node = Arc::new(RelayNode::default());
		let relay = relay(node.clone());

		let result = relay
			.execute(&proposal("bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh"))
			.await;

		assert!(result.is_err());
		assert!(node.sent.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn should_keep_nonce_when_send_fails() {
		let node = Arc::new(RelayNode {
			transaction_count: 3,
			fail_sends: true,
			..Default::default()
		});
		let relay = relay(node);
		let recipient = format!("{}", Address::repeat_byte(0x33));

		assert!(relay.execute(&proposal(&recipient)).await.is_err());
		assert_eq!(*relay.nonce.lock().await, None);
	}
}
