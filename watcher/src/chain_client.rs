//! Chain client

use std::fmt::Debug;

use alloy_primitives::{Address, TxHash};
use async_trait::async_trait;
use dao_core::{
	rpc::{Log, LogFilter, RpcClient, TransactionRequest},
	DaoResult,
};

/// The node calls the watcher and the relay need
#[async_trait]
pub trait ChainClient: Send + Sync + Debug {
	/// Get the current block height
	async fn block_number(&self) -> DaoResult<u64>;

	/// Fetch the logs matching `filter`
	async fn logs(&self, filter: &LogFilter) -> DaoResult<Vec<Log>>;

	/// Number of transactions sent by `address`
	async fn transaction_count(&self, address: Address) -> DaoResult<u64>;

	/// Hand a transaction to the node's wallet
	async fn send_transaction(
		&self,
		tx: &TransactionRequest,
	) -> DaoResult<TxHash>;
}

#[async_trait]
impl ChainClient for RpcClient {
	async fn block_number(&self) -> DaoResult<u64> {
		RpcClient::block_number(self).await
	}

	async fn logs(&self, filter: &LogFilter) -> DaoResult<Vec<Log>> {
		RpcClient::logs(self, filter).await
	}

	async fn transaction_count(&self, address: Address) -> DaoResult<u64> {
		RpcClient::transaction_count(self, address).await
	}

	async fn send_transaction(
		&self,
		tx: &TransactionRequest,
	) -> DaoResult<TxHash> {
		RpcClient::send_transaction(self, tx).await
	}
}
