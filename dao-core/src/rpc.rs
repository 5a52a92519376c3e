use std::{
	collections::HashMap,
	sync::atomic::{AtomicU64, Ordering},
	time::Duration,
};

use alloy_primitives::{Address, Bytes, TxHash, B256, U64};
use alloy_sol_types::{Revert, SolError};
use backoff::ExponentialBackoff;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, trace};
use url::Url;

use crate::{DaoError, DaoResult};

/// EIP-1193 code for a request the user refused to sign
const USER_REJECTED_CODE: i64 = 4001;
/// Code used by geth and friends for `execution reverted`
const EXECUTION_REVERTED_CODE: i64 = 3;
const EXECUTION_REVERTED: &str = "execution reverted";

/// Stateless Ethereum JSON-RPC client over HTTP
#[derive(Debug)]
pub struct RpcClient {
	url: Url,
	http_client: reqwest::Client,
	next_id: AtomicU64,
}

/// A transaction for `eth_call` and `eth_sendTransaction`.
/// Gas and fees are left to the wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
	/// Account sending the transaction
	#[serde(skip_serializing_if = "Option::is_none")]
	pub from: Option<Address>,
	/// Contract called
	pub to: Address,
	/// ABI encoded call
	pub data: Bytes,
	/// Explicit nonce, the wallet picks one otherwise
	#[serde(skip_serializing_if = "Option::is_none")]
	pub nonce: Option<U64>,
	/// Explicit chain id
	#[serde(skip_serializing_if = "Option::is_none")]
	pub chain_id: Option<U64>,
}

/// Subset of a transaction receipt
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
	/// Transaction hash
	pub transaction_hash: TxHash,
	/// Block the transaction was included in
	#[serde(default)]
	pub block_number: Option<U64>,
	/// 1 for success, 0 for failure
	#[serde(default)]
	pub status: Option<U64>,
}

impl Receipt {
	/// Whether the transaction executed without reverting
	pub fn succeeded(&self) -> bool {
		self.status.map_or(true, |status| status == U64::from(1))
	}
}

/// `eth_getLogs` filter over an inclusive block range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
	/// Emitting contract
	pub address: Address,
	/// Topic filter, positional
	pub topics: Vec<B256>,
	/// First block
	pub from_block: U64,
	/// Last block
	pub to_block: U64,
}

/// A log entry returned by `eth_getLogs`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
	/// Emitting contract
	pub address: Address,
	/// Indexed topics, the event signature hash first
	pub topics: Vec<B256>,
	/// ABI encoded non-indexed fields
	pub data: Bytes,
	/// Block containing the log
	#[serde(default)]
	pub block_number: Option<U64>,
	/// Transaction emitting the log
	#[serde(default)]
	pub transaction_hash: Option<TxHash>,
}

#[derive(Debug, Serialize)]
struct Request<'a> {
	jsonrpc: &'static str,
	id: u64,
	method: &'a str,
	params: Value,
}

#[derive(Debug, Deserialize)]
struct Response {
	id: u64,
	#[serde(default)]
	result: Option<Value>,
	#[serde(default)]
	error: Option<RpcErrorObject>,
}

impl Response {
	fn into_result<R: DeserializeOwned>(self) -> DaoResult<R> {
		match (self.result, self.error) {
			(_, Some(error)) => Err(error.into()),
			(Some(result), None) => Ok(serde_json::from_value(result)?),
			// `null` results are dropped by serde's `Option`
			(None, None) => Ok(serde_json::from_value(Value::Null)?),
		}
	}
}

/// JSON-RPC error object
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcErrorObject {
	/// Error code
	pub code: i64,
	/// Error message
	pub message: String,
	/// Extra data, the revert data for reverted calls
	#[serde(default)]
	pub data: Option<Value>,
}

impl RpcErrorObject {
	fn revert_reason(&self) -> String {
		let from_data = self
			.data
			.as_ref()
			.and_then(Value::as_str)
			.and_then(|data| hex::decode(data.trim_start_matches("0x")).ok())
			.and_then(|data| Revert::abi_decode(&data).ok())
			.map(|revert| revert.reason);

		from_data.unwrap_or_else(|| {
			let reason = self
				.message
				.trim_start_matches(EXECUTION_REVERTED)
				.trim_start_matches(':')
				.trim();

			if reason.is_empty() {
				EXECUTION_REVERTED.to_string()
			} else {
				reason.to_string()
			}
		})
	}
}

impl From<RpcErrorObject> for DaoError {
	fn from(error: RpcErrorObject) -> Self {
		if error.code == USER_REJECTED_CODE {
			DaoError::UserRejected {
				message: error.message,
			}
		} else if error.code == EXECUTION_REVERTED_CODE
			|| error.message.contains(EXECUTION_REVERTED)
		{
			DaoError::ContractRevert(error.revert_reason())
		} else {
			DaoError::Rpc {
				code: error.code,
				message: error.message,
			}
		}
	}
}

impl RpcClient {
	/// Create a new client for the node at `url`
	pub fn new(url: Url, http_client: reqwest::Client) -> Self {
		Self {
			url,
			http_client,
			next_id: AtomicU64::new(1),
		}
	}

	/// Node url
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// Send a single request
	#[tracing::instrument(skip(self, params))]
	pub async fn request<R: DeserializeOwned>(
		&self,
		method: &str,
		params: Value,
	) -> DaoResult<R> {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let request = Request {
			jsonrpc: "2.0",
			id,
			method,
			params,
		};

		trace!("Sending request {}", serde_json::to_string(&request)?);

		let response: Response = self
			.http_client
			.post(self.url.clone())
			.json(&request)
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;

		if response.id != id {
			return Err(DaoError::MalformedResponse("response id mismatch"));
		}

		response.into_result()
	}

	/// Send several requests in one JSON-RPC batch. Results come back in
	/// the order of `calls`, each with its own outcome.
	#[tracing::instrument(skip_all, fields(size = calls.len()))]
	pub async fn batch<R: DeserializeOwned>(
		&self,
		calls: Vec<(&str, Value)>,
	) -> DaoResult<Vec<DaoResult<R>>> {
		if calls.is_empty() {
			return Ok(vec![]);
		}

		let first_id =
			self.next_id.fetch_add(calls.len() as u64, Ordering::Relaxed);
		let requests: Vec<Request> = calls
			.into_iter()
			.zip(first_id..)
			.map(|((method, params), id)| Request {
				jsonrpc: "2.0",
				id,
				method,
				params,
			})
			.collect();

		debug!("Sending batch of {} requests", requests.len());

		let responses: Vec<Response> = self
			.http_client
			.post(self.url.clone())
			.json(&requests)
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;

		order_batch(requests.iter().map(|request| request.id), responses)
	}

	/// Accounts the wallet can sign for
	pub async fn accounts(&self) -> DaoResult<Vec<Address>> {
		self.request("eth_accounts", json!([])).await
	}

	/// Chain id of the node
	pub async fn chain_id(&self) -> DaoResult<u64> {
		let chain_id: U64 = self.request("eth_chainId", json!([])).await?;
		Ok(chain_id.to())
	}

	/// Latest block number
	pub async fn block_number(&self) -> DaoResult<u64> {
		let number: U64 = self.request("eth_blockNumber", json!([])).await?;
		Ok(number.to())
	}

	/// Execute a read-only call against the latest block
	pub async fn call(&self, tx: &TransactionRequest) -> DaoResult<Bytes> {
		self.request("eth_call", json!([tx, "latest"])).await
	}

	/// Execute several read-only calls in one batch
	pub async fn batch_call(
		&self,
		txs: &[TransactionRequest],
	) -> DaoResult<Vec<DaoResult<Bytes>>> {
		let calls = txs
			.iter()
			.map(|tx| ("eth_call", json!([tx, "latest"])))
			.collect();

		self.batch(calls).await
	}

	/// Hand a transaction to the wallet for signing and broadcasting
	pub async fn send_transaction(
		&self,
		tx: &TransactionRequest,
	) -> DaoResult<TxHash> {
		self.request("eth_sendTransaction", json!([tx])).await
	}

	/// Receipt of a mined transaction
	pub async fn transaction_receipt(
		&self,
		tx_hash: TxHash,
	) -> DaoResult<Option<Receipt>> {
		self.request("eth_getTransactionReceipt", json!([tx_hash]))
			.await
	}

	/// Number of transactions sent by `address`, including pending ones
	pub async fn transaction_count(&self, address: Address) -> DaoResult<u64> {
		let count: U64 = self
			.request("eth_getTransactionCount", json!([address, "pending"]))
			.await?;
		Ok(count.to())
	}

	/// Logs matching `filter`
	pub async fn logs(&self, filter: &LogFilter) -> DaoResult<Vec<Log>> {
		self.request("eth_getLogs", json!([filter])).await
	}

	/// Poll for the receipt of `tx_hash` until it shows up or `timeout`
	/// elapses. A reverted transaction is an error.
	#[tracing::instrument(skip(self))]
	pub async fn wait_for_receipt(
		&self,
		tx_hash: TxHash,
		timeout: Duration,
	) -> DaoResult<Receipt> {
		let policy = ExponentialBackoff {
			initial_interval: Duration::from_millis(500),
			max_interval: Duration::from_secs(5),
			max_elapsed_time: Some(timeout),
			..Default::default()
		};

		let receipt = backoff::future::retry(policy, || async {
			match self.transaction_receipt(tx_hash).await {
				Ok(Some(receipt)) => Ok(receipt),
				Ok(None) => {
					trace!("Transaction {} not mined yet", tx_hash);
					Err(backoff::Error::transient(
						DaoError::ConfirmationTimeout(tx_hash),
					))
				}
				Err(err @ DaoError::NetworkFailure(_)) => {
					Err(backoff::Error::transient(err))
				}
				Err(err) => Err(backoff::Error::permanent(err)),
			}
		})
		.await?;

		if !receipt.succeeded() {
			return Err(DaoError::ContractRevert(format!(
				"transaction {} reverted",
				tx_hash
			)));
		}

		Ok(receipt)
	}
}

fn order_batch<R: DeserializeOwned>(
	ids: impl Iterator<Item = u64>,
	responses: Vec<Response>,
) -> DaoResult<Vec<DaoResult<R>>> {
	let mut by_id: HashMap<u64, Response> = responses
		.into_iter()
		.map(|response| (response.id, response))
		.collect();

	ids.map(|id| {
		by_id
			.remove(&id)
			.map(Response::into_result)
			.ok_or(DaoError::MalformedResponse("missing batch response"))
	})
	.collect()
}
