use std::collections::BTreeMap;

use crate::proposal::{Proposal, ProposalId};

/// Proposals already read from the contract. Proposals are immutable once
/// created, so an entry only goes away when a confirmed write invalidates
/// it or when the count shrinks below its id.
#[derive(Debug, Default, Clone)]
pub struct ProposalCache {
	entries: BTreeMap<ProposalId, Proposal>,
}

impl ProposalCache {
	/// Create an empty cache
	pub fn new() -> Self {
		Default::default()
	}

	/// Ids in `0..count` that are not cached, in ascending order
	pub fn missing(&self, count: u64) -> Vec<ProposalId> {
		ProposalId::range(count)
			.filter(|id| !self.entries.contains_key(id))
			.collect()
	}

	/// Store freshly read proposals
	pub fn extend(&mut self, proposals: impl IntoIterator<Item = Proposal>) {
		self.entries
			.extend(proposals.into_iter().map(|proposal| (proposal.id, proposal)));
	}

	/// Drop every entry with an id outside `0..count`
	pub fn retain_below(&mut self, count: u64) {
		self.entries.split_off(&ProposalId(count));
	}

	/// Drop a single entry
	pub fn invalidate(&mut self, id: ProposalId) -> bool {
		self.entries.remove(&id).is_some()
	}

	/// Drop every entry
	pub fn clear(&mut self) {
		self.entries.clear();
	}

	/// Cached proposals in id order
	pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
		self.entries.values()
	}

	/// Number of cached proposals
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether nothing is cached
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
