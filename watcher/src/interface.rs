//! Actor interface of the watcher.
//!
//! Five zero-argument operations, each answering with a tagged
//! `{ Ok : text } | { Err : text }` result.
//!
//! In process, callers go through [`dispatch`] and get the result as is.
//! [`WATCHER_DID`], [`encode_reply`], [`decode_reply`] and the wire names
//! of [`Method`] are for external Candid clients, which name the method
//! and exchange replies as Candid bytes.

use async_trait::async_trait;
use candid::{CandidType, Deserialize};
use strum::{AsRefStr, EnumIter, EnumString};

/// Interface description of the watcher actor
pub const WATCHER_DID: &str = r#"type Result = variant { Ok : text; Err : text };
type State = record { timer_id : nat64; logs : vec text; poll_count : nat64 };
service : {
  watch_btc_event_transfer_start : () -> (Result);
  watch_btc_proposal_event_get : () -> (Result);
  watch_btc_proposal_event_is_polling : () -> (Result);
  watch_btc_proposal_event_poll_count : () -> (Result);
  watch_btc_proposal_event_stop : () -> (Result);
}
"#;

/// Tagged reply of every watcher operation
#[derive(Debug, Clone, PartialEq, Eq, CandidType, Deserialize)]
pub enum WatcherResult {
	/// Success payload
	Ok(String),
	/// Failure payload
	Err(String),
}

impl From<Result<String, String>> for WatcherResult {
	fn from(result: Result<String, String>) -> Self {
		match result {
			Ok(payload) => WatcherResult::Ok(payload),
			Err(payload) => WatcherResult::Err(payload),
		}
	}
}

impl From<WatcherResult> for Result<String, String> {
	fn from(result: WatcherResult) -> Self {
		match result {
			WatcherResult::Ok(payload) => Ok(payload),
			WatcherResult::Err(payload) => Err(payload),
		}
	}
}

/// Snapshot of the watcher state, `timer_id` is 0 when idle
#[derive(Debug, Clone, PartialEq, Eq, CandidType, Deserialize)]
pub struct StateRecord {
	/// Running poller
	pub timer_id: u64,
	/// Collected log lines
	pub logs: Vec<String>,
	/// Polls made
	pub poll_count: u64,
}

/// Operations of the watcher actor, named as on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
pub enum Method {
	/// Start watching
	#[strum(serialize = "watch_btc_event_transfer_start")]
	Start,
	/// Collected log lines
	#[strum(serialize = "watch_btc_proposal_event_get")]
	Get,
	/// Whether a poller is running
	#[strum(serialize = "watch_btc_proposal_event_is_polling")]
	IsPolling,
	/// Polls made
	#[strum(serialize = "watch_btc_proposal_event_poll_count")]
	PollCount,
	/// Stop watching
	#[strum(serialize = "watch_btc_proposal_event_stop")]
	Stop,
}

/// The watcher actor
#[async_trait]
pub trait WatcherActor: Send + Sync {
	/// Start polling for accepted proposals
	async fn watch_btc_event_transfer_start(&self) -> Result<String, String>;

	/// Log lines collected since the last start, as a JSON array
	async fn watch_btc_proposal_event_get(&self) -> Result<String, String>;

	/// `"true"` while polling, `"false"` otherwise
	async fn watch_btc_proposal_event_is_polling(
		&self,
	) -> Result<String, String>;

	/// Number of polls made since the last start
	async fn watch_btc_proposal_event_poll_count(
		&self,
	) -> Result<String, String>;

	/// Stop polling before the poll limit is reached
	async fn watch_btc_proposal_event_stop(&self) -> Result<String, String>;
}

/// Route `method` to the matching operation of `actor`
pub async fn dispatch(
	actor: &(impl WatcherActor + ?Sized),
	method: Method,
) -> Result<String, String> {
	match method {
		Method::Start => actor.watch_btc_event_transfer_start().await,
		Method::Get => actor.watch_btc_proposal_event_get().await,
		Method::IsPolling => actor.watch_btc_proposal_event_is_polling().await,
		Method::PollCount => actor.watch_btc_proposal_event_poll_count().await,
		Method::Stop => actor.watch_btc_proposal_event_stop().await,
	}
}

/// Candid encoding of a reply
pub fn encode_reply(result: Result<String, String>) -> candid::Result<Vec<u8>> {
	candid::encode_one(WatcherResult::from(result))
}

/// Decode a Candid encoded reply
pub fn decode_reply(bytes: &[u8]) -> candid::Result<Result<String, String>> {
	let result: WatcherResult = candid::decode_one(bytes)?;
	Ok(result.into())
}

#[cfg(test)]
mod tests {
	use std::str::FromStr;

	use strum::IntoEnumIterator;

	use super::*;

	#[test]
	fn should_name_every_method_in_did() {
		for method in Method::iter() {
			assert!(WATCHER_DID.contains(method.as_ref()));
			assert_eq!(Method::from_str(method.as_ref()).unwrap(), method);
		}
	}

	#[test]
	fn should_carry_err_payload_through_candid() {
		let bytes = encode_reply(Err("No timer to clear.".to_string())).unwrap();

		assert_eq!(&bytes[..4], b"DIDL");
		assert_eq!(
			decode_reply(&bytes).unwrap(),
			Err("No timer to clear.".to_string())
		);
	}

	#[test]
	fn should_reject_reply_of_another_type() {
		let bytes = candid::encode_one(42u64).unwrap();

		assert!(decode_reply(&bytes).is_err());
	}

	#[test]
	fn should_reject_unknown_method() {
		assert!(Method::from_str("watch_btc_proposal_event_reset").is_err());
	}
}
