//! Watcher
//!
//! The watcher polls the DAO contract for `AcceptedBTCProposalEvent` logs.
//! Starting it spawns a poller that runs `poll_limit` times, `poll_interval`
//! apart, and clears its own timer once done. Each poll covers the blocks
//! not seen yet, starting from the latest block at the time of the start.

use std::{sync::Arc, time::Duration};

use alloy_primitives::{Address, U64};
use alloy_sol_types::SolEvent;
use async_trait::async_trait;
use dao_core::{abi::IDao::AcceptedBTCProposalEvent, rpc::LogFilter};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
	chain_client::ChainClient,
	config::{Config, PollConfig},
	event::AcceptedProposal,
	interface::{StateRecord, WatcherActor},
	state::{TimerId, WatcherState},
	transfer::{Erc20Relay, LoggingExecutor, TransferExecutor},
};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Watches the DAO for accepted proposals
#[derive(Debug, Clone)]
pub struct Watcher {
	client: Arc<dyn ChainClient>,
	executor: Arc<dyn TransferExecutor>,
	contract_address: Address,
	poll: PollConfig,
	state: Arc<Mutex<WatcherState>>,
}

impl Watcher {
	/// Create an idle watcher
	pub fn new(
		client: Arc<dyn ChainClient>,
		executor: Arc<dyn TransferExecutor>,
		contract_address: Address,
		poll: PollConfig,
	) -> Self {
		Self {
			client,
			executor,
			contract_address,
			poll,
			state: Default::default(),
		}
	}

	/// Create an idle watcher for the configured DAO and relay
	pub fn from_config(config: &Config) -> Self {
		let client = Arc::new(config.dao.rpc_client());
		let executor: Arc<dyn TransferExecutor> = match &config.relay {
			Some(relay) => Arc::new(Erc20Relay::from_config(relay)),
			None => Arc::new(LoggingExecutor),
		};

		Self::new(
			client,
			executor,
			config.dao.contract_address,
			config.watcher.clone(),
		)
	}

	/// Snapshot of the state
	pub async fn state(&self) -> StateRecord {
		self.state.lock().await.to_record()
	}

	#[tracing::instrument(skip(self))]
	async fn start(&self) -> Result<String, String> {
		// Held until the timer is recorded so two starts cannot both pass
		let mut state = self.state.lock().await;

		if state.is_polling() {
			return Err("Already watching for logs.".to_string());
		}

		if self.poll.poll_limit == 0 {
			return Err("Poll limit is 0, nothing to watch.".to_string());
		}

		let from_block = self
			.client
			.block_number()
			.await
			.map_err(|err| err.to_string())?;

		let id = state.reset();
		let handle = tokio::spawn(self.clone().run(id, from_block));
		state.set_timer(id, handle);

		info!(
			"Watching {} from block {}, polling {} times",
			self.contract_address, from_block, self.poll.poll_limit
		);

		Ok(format!(
			"Watching for logs, polling {} times.",
			self.poll.poll_limit
		))
	}

	async fn run(self, id: TimerId, mut next_block: u64) {
		let mut interval = tokio::time::interval(
			self.poll.poll_interval().max(MIN_POLL_INTERVAL),
		);

		loop {
			interval.tick().await;

			next_block = match self.poll_once(id, next_block).await {
				Some(next) => next,
				None => {
					debug!("Poller {:?} was stopped", id);
					break;
				}
			};

			let mut state = self.state.lock().await;

			if !state.is_current(id) {
				debug!("Poller {:?} was stopped", id);
				break;
			}

			if state.record_poll(id, self.poll.poll_limit) {
				info!("Finished watching after {} polls", state.poll_count());
				break;
			}
		}
	}

	/// Fetch and execute the accepted proposals from `from_block` up to
	/// the latest block. Each line is recorded before its transfer is
	/// executed. Returns the next block to poll from, or `None` once run
	/// `id` was stopped.
	async fn poll_once(&self, id: TimerId, from_block: u64) -> Option<u64> {
		let latest = match self.client.block_number().await {
			Ok(latest) => latest,
			Err(err) => {
				warn!("Could not get the latest block: {}", err);
				return Some(from_block);
			}
		};

		if latest < from_block {
			return Some(from_block);
		}

		let filter = LogFilter {
			address: self.contract_address,
			topics: vec![AcceptedBTCProposalEvent::SIGNATURE_HASH],
			from_block: U64::from(from_block),
			to_block: U64::from(latest),
		};

		let logs = match self.client.logs(&filter).await {
			Ok(logs) => logs,
			Err(err) => {
				warn!(
					"Could not get logs for blocks {}..={}: {}",
					from_block, latest, err
				);
				return Some(from_block);
			}
		};

		debug!(
			"Got {} logs for blocks {}..={}",
			logs.len(),
			from_block,
			latest
		);

		for log in logs {
			let proposal = match AcceptedProposal::from_log(&log) {
				Ok(proposal) => proposal,
				Err(err) => {
					warn!(
						"Skipping log of transaction {:?}: {}",
						log.transaction_hash, err
					);
					continue;
				}
			};

			let recorded =
				self.state.lock().await.record_line(id, proposal.to_string());
			if !recorded {
				return None;
			}

			if let Err(err) = self.executor.execute(&proposal).await {
				warn!("Could not execute {}: {:#}", proposal, err);
			}
		}

		Some(latest + 1)
	}
}

#[async_trait]
impl WatcherActor for Watcher {
	async fn watch_btc_event_transfer_start(&self) -> Result<String, String> {
		self.start().await
	}

	async fn watch_btc_proposal_event_get(&self) -> Result<String, String> {
		let state = self.state.lock().await;
		serde_json::to_string(state.logs()).map_err(|err| err.to_string())
	}

	async fn watch_btc_proposal_event_is_polling(
		&self,
	) -> Result<String, String> {
		Ok(self.state.lock().await.is_polling().to_string())
	}

	async fn watch_btc_proposal_event_poll_count(
		&self,
	) -> Result<String, String> {
		Ok(self.state.lock().await.poll_count().to_string())
	}

	async fn watch_btc_proposal_event_stop(&self) -> Result<String, String> {
		if self.state.lock().await.clear_timer() {
			info!("Watching stopped");
			Ok("Watching for logs stopped.".to_string())
		} else {
			Err("No timer to clear.".to_string())
		}
	}
}
