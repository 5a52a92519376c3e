use std::{sync::Arc, time::Duration};

use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
	abi::IDao,
	proposal::{Proposal, ProposalId},
	rpc::{RpcClient, TransactionRequest},
	session::Session,
	DaoError, DaoResult,
};

/// A write accepted by the wallet and mined successfully
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Confirmation {
	/// Transaction hash
	pub tx_hash: TxHash,
	/// Block the transaction was included in
	pub block_number: Option<u64>,
}

/// The four operations the proposal board needs from the DAO contract
#[async_trait]
pub trait DaoContract: Send + Sync {
	/// Number of proposals created so far
	async fn proposal_count(&self, session: &Session) -> DaoResult<u64>;

	/// Read the given proposals in a single batch, in the order of `ids`
	async fn proposals(
		&self,
		session: &Session,
		ids: &[ProposalId],
	) -> DaoResult<Vec<Proposal>>;

	/// Create a proposal and wait for it to be mined
	async fn create_proposal(
		&self,
		session: &Session,
		btc_address: &str,
		amount: U256,
	) -> DaoResult<Confirmation>;

	/// Vote in favor of a proposal and wait for the vote to be mined
	async fn vote(
		&self,
		session: &Session,
		id: ProposalId,
	) -> DaoResult<Confirmation>;
}

#[async_trait]
impl<T: DaoContract + ?Sized> DaoContract for Arc<T> {
	async fn proposal_count(&self, session: &Session) -> DaoResult<u64> {
		(**self).proposal_count(session).await
	}

	async fn proposals(
		&self,
		session: &Session,
		ids: &[ProposalId],
	) -> DaoResult<Vec<Proposal>> {
		(**self).proposals(session, ids).await
	}

	async fn create_proposal(
		&self,
		session: &Session,
		btc_address: &str,
		amount: U256,
	) -> DaoResult<Confirmation> {
		(**self).create_proposal(session, btc_address, amount).await
	}

	async fn vote(
		&self,
		session: &Session,
		id: ProposalId,
	) -> DaoResult<Confirmation> {
		(**self).vote(session, id).await
	}
}

/// DAO contract reached through a wallet JSON-RPC endpoint
#[derive(Debug)]
pub struct RpcDao {
	client: RpcClient,
	address: Address,
	confirmation_timeout: Duration,
}

impl RpcDao {
	/// Create a new contract handle
	pub fn new(
		client: RpcClient,
		address: Address,
		confirmation_timeout: Duration,
	) -> Self {
		Self {
			client,
			address,
			confirmation_timeout,
		}
	}

	/// The underlying JSON-RPC client
	pub fn client(&self) -> &RpcClient {
		&self.client
	}

	/// Contract address
	pub fn address(&self) -> Address {
		self.address
	}

	fn call_request(
		&self,
		session: &Session,
		call: &impl SolCall,
	) -> TransactionRequest {
		TransactionRequest {
			from: Some(session.account()),
			to: self.address,
			data: Bytes::from(call.abi_encode()),
			..Default::default()
		}
	}

	async fn write(
		&self,
		session: &Session,
		call: &impl SolCall,
	) -> DaoResult<Confirmation> {
		let tx_hash = self
			.client
			.send_transaction(&self.call_request(session, call))
			.await?;

		info!("Broadcasted {}: {}", call_name(call), tx_hash);

		let receipt = self
			.client
			.wait_for_receipt(tx_hash, self.confirmation_timeout)
			.await?;

		Ok(Confirmation {
			tx_hash,
			block_number: receipt.block_number.map(|number| number.to()),
		})
	}
}

fn call_name<C: SolCall>(_: &C) -> &'static str {
	C::SIGNATURE
}

#[async_trait]
impl DaoContract for RpcDao {
	#[tracing::instrument(skip(self))]
	async fn proposal_count(&self, session: &Session) -> DaoResult<u64> {
		let data = self
			.client
			.call(&self.call_request(session, &IDao::proposalIdsCall {}))
			.await?;

		let count = IDao::proposalIdsCall::abi_decode_returns(&data)
			.map_err(|err| DaoError::Abi("proposal count", err))?;

		u64::try_from(count)
			.map_err(|_| DaoError::MalformedResponse("proposal count exceeds u64"))
	}

	#[tracing::instrument(skip(self, ids), fields(count = ids.len()))]
	async fn proposals(
		&self,
		session: &Session,
		ids: &[ProposalId],
	) -> DaoResult<Vec<Proposal>> {
		let requests: Vec<TransactionRequest> = ids
			.iter()
			.map(|id| {
				self.call_request(
					session,
					&IDao::proposalsCall {
						proposalId: id.to_u256(),
					},
				)
			})
			.collect();

		debug!("Reading proposals {:?}", ids);

		let results = self.client.batch_call(&requests).await?;

		ids.iter()
			.zip(results)
			.map(|(id, result)| {
				let data = result?;
				let returns = IDao::proposalsCall::abi_decode_returns(&data)
					.map_err(|err| DaoError::Abi("proposal", err))?;

				Ok(Proposal {
					id: *id,
					btc_address: returns.btcAddress,
					amount: returns.amount,
				})
			})
			.collect()
	}

	#[tracing::instrument(skip(self))]
	async fn create_proposal(
		&self,
		session: &Session,
		btc_address: &str,
		amount: U256,
	) -> DaoResult<Confirmation> {
		let call = IDao::sendBTCProposalCall {
			btcAddress: btc_address.to_string(),
			amount,
		};

		self.write(session, &call).await
	}

	#[tracing::instrument(skip(self))]
	async fn vote(
		&self,
		session: &Session,
		id: ProposalId,
	) -> DaoResult<Confirmation> {
		let call = IDao::voteOnProposalCall {
			proposalId: id.to_u256(),
		};

		self.write(session, &call).await
	}
}
