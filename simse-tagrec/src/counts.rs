// ---------------------------------------------------------------------------
// NestedCounts -- two-level occurrence counter
// ---------------------------------------------------------------------------
//
// `outer -> (inner -> count)`. The four co-occurrence mappings of the
// statistics aggregate are all instances of this one container; every
// update goes through `increment`.
// ---------------------------------------------------------------------------

use std::collections::HashMap;

/// A two-level counter. Every stored count is at least 1; a missing
/// `(outer, inner)` pair means a count of 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NestedCounts {
	counts: HashMap<String, HashMap<String, u64>>,
}

impl NestedCounts {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add one occurrence of `inner` under `outer`, creating either level
	/// on first sight.
	pub fn increment(&mut self, outer: &str, inner: &str) {
		let count = self
			.counts
			.entry(outer.to_string())
			.or_default()
			.entry(inner.to_string())
			.or_insert(0);
		*count += 1;
	}

	/// The inner mapping for `outer`, if any occurrence was recorded.
	pub fn row(&self, outer: &str) -> Option<&HashMap<String, u64>> {
		self.counts.get(outer)
	}

	/// Count for a single pair (0 when absent).
	pub fn count(&self, outer: &str, inner: &str) -> u64 {
		self.row(outer)
			.and_then(|row| row.get(inner))
			.copied()
			.unwrap_or(0)
	}

	/// Number of distinct inner keys recorded under `outer`.
	pub fn distinct(&self, outer: &str) -> usize {
		self.row(outer).map_or(0, HashMap::len)
	}

	/// Inner entries of `outer` sorted by inner key ascending.
	pub fn sorted_row(&self, outer: &str) -> Vec<(&str, u64)> {
		let mut entries: Vec<(&str, u64)> = match self.row(outer) {
			Some(row) => row.iter().map(|(k, v)| (k.as_str(), *v)).collect(),
			None => Vec::new(),
		};
		entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
		entries
	}

	/// Number of distinct outer keys.
	pub fn len(&self) -> usize {
		self.counts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	/// Sum of every count in the container.
	pub fn total(&self) -> u64 {
		self.counts.values().flat_map(|row| row.values()).sum()
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
