#![deny(missing_docs)]
/*!
# dao-core library: a library for creating and voting on BTC proposals

The DAO contract stores proposals to move an amount of BTC to a destination
address. This library talks to the contract through a wallet JSON-RPC
endpoint and keeps a headless proposal board with a read cache.
*/

use alloy_primitives::TxHash;
use thiserror::Error;

/// Solidity bindings for the DAO and ERC-20 contracts
#[allow(missing_docs)]
pub mod abi;
/// Proposal board: listing, creation and voting
pub mod board;
/// Proposal cache keyed by id
pub mod cache;
/// Configuration shared by every binary
pub mod config;
/// DAO contract interface and its JSON-RPC implementation
pub mod contract;
/// Proposal types
pub mod proposal;
/// Ethereum JSON-RPC client
pub mod rpc;
/// Wallet session handle
pub mod session;
/// In-memory contract for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

/// Error type for the dao-core library
#[derive(Error, Debug, strum::IntoStaticStr)]
pub enum DaoError {
	#[error("{message}")]
	/// The wallet refused to sign the request
	UserRejected {
		/// Message returned by the wallet
		message: String,
	},
	#[error("Network failure: {0}")]
	/// The node could not be reached or answered with an HTTP error
	NetworkFailure(#[from] reqwest::Error),
	#[error("Contract reverted: {0}")]
	/// The contract call reverted
	ContractRevert(String),
	#[error("Invalid input: {0}")]
	/// A user supplied field could not be used
	InvalidInput(&'static str),
	#[error("RPC error {code}: {message}")]
	/// Any other JSON-RPC error object
	Rpc {
		/// JSON-RPC error code
		code: i64,
		/// JSON-RPC error message
		message: String,
	},
	#[error("The wallet did not expose any account")]
	/// No account to act as
	NoAccount,
	#[error("Could not decode {0}: {1}")]
	/// ABI decoding error
	Abi(&'static str, alloy_sol_types::Error),
	#[error("Malformed response: {0}")]
	/// The node answered with something that is not valid JSON-RPC
	MalformedResponse(&'static str),
	#[error("Could not encode or decode JSON: {0}")]
	/// JSON error
	Json(#[from] serde_json::Error),
	#[error("Transaction {0} was not confirmed in time")]
	/// No receipt before the confirmation timeout
	ConfirmationTimeout(TxHash),
	#[error("Could not read config file: {0}")]
	/// Config file IO error
	ConfigIo(#[from] std::io::Error),
	#[error("Could not parse config file: {0}")]
	/// Config file syntax error
	ConfigParse(#[from] toml::de::Error),
}

impl DaoError {
	/// Name of the error variant, stable enough to branch on in a UI
	pub fn kind(&self) -> &'static str {
		self.into()
	}
}

/// Result type for the dao-core library
pub type DaoResult<T> = Result<T, DaoError>;
