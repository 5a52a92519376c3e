//! Watcher state

use tokio::task::JoinHandle;
use tracing::debug;

use crate::interface::StateRecord;

/// Identifies one run of the poller
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimerId(pub u64);

#[derive(Debug)]
struct Timer {
	id: TimerId,
	handle: JoinHandle<()>,
}

/// Watcher internal state
#[derive(Debug, Default)]
pub struct WatcherState {
	/// The poller currently running. Cleared when it reaches its poll
	/// limit or when the watch is stopped.
	timer: Option<Timer>,
	/// One line per accepted proposal seen since the last start
	logs: Vec<String>,
	/// Polls made since the last start
	poll_count: u64,
	last_timer_id: u64,
}

impl WatcherState {
	/// Whether a poller is running
	pub fn is_polling(&self) -> bool {
		self.timer.is_some()
	}

	/// Whether `id` is the poller currently running
	pub fn is_current(&self, id: TimerId) -> bool {
		matches!(&self.timer, Some(timer) if timer.id == id)
	}

	/// Polls made since the last start
	pub fn poll_count(&self) -> u64 {
		self.poll_count
	}

	/// Lines collected since the last start
	pub fn logs(&self) -> &[String] {
		&self.logs
	}

	/// Forget the previous run and hand out the id of the next one
	pub fn reset(&mut self) -> TimerId {
		self.logs.clear();
		self.poll_count = 0;
		self.last_timer_id += 1;

		TimerId(self.last_timer_id)
	}

	/// Record the poller started for `id`
	pub fn set_timer(&mut self, id: TimerId, handle: JoinHandle<()>) {
		self.timer = Some(Timer { id, handle });
	}

	/// Record a line for the run `id`. Returns false, dropping the line,
	/// when `id` is no longer the running poller.
	pub fn record_line(&mut self, id: TimerId, line: String) -> bool {
		if !self.is_current(id) {
			return false;
		}

		self.logs.push(line);
		true
	}

	/// Record a finished poll. Returns true once `limit` polls were made,
	/// in which case the timer is cleared.
	pub fn record_poll(&mut self, id: TimerId, limit: u64) -> bool {
		self.poll_count += 1;

		if self.poll_count < limit {
			return false;
		}

		debug!("Poll limit {} reached", limit);

		if self.is_current(id) {
			self.timer = None;
		}

		true
	}

	/// Abort the running poller. Returns false when none is running.
	pub fn clear_timer(&mut self) -> bool {
		match self.timer.take() {
			Some(timer) => {
				timer.handle.abort();
				true
			}
			None => false,
		}
	}

	/// State as exposed by the actor interface
	pub fn to_record(&self) -> StateRecord {
		StateRecord {
			timer_id: self.timer.as_ref().map_or(0, |timer| timer.id.0),
			logs: self.logs.clone(),
			poll_count: self.poll_count,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn should_clear_timer_at_limit() {
		let mut state = WatcherState::default();
		let id = state.reset();
		state.set_timer(id, tokio::spawn(async {}));

		assert!(state.record_line(id, "a".to_string()));
		assert!(!state.record_poll(id, 2));
		assert!(state.is_polling());

		assert!(state.record_poll(id, 2));
		assert!(!state.is_polling());
		assert_eq!(state.poll_count(), 2);
		assert_eq!(state.logs(), ["a".to_string()]);
	}

	#[tokio::test]
	async fn should_not_clear_timer_of_newer_run() {
		let mut state = WatcherState::default();
		let stale = state.reset();
		let current = state.reset();
		state.set_timer(current, tokio::spawn(async {}));

		state.record_poll(stale, 1);

		assert!(state.is_polling());
		assert!(!state.record_line(stale, "late".to_string()));
		assert!(state.logs().is_empty());
		assert_eq!(state.to_record().timer_id, current.0);
	}

	#[test]
	fn should_report_missing_timer() {
		let mut state = WatcherState::default();

		assert!(!state.clear_timer());
		assert_eq!(state.to_record().timer_id, 0);
	}
}
