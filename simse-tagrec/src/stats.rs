// ---------------------------------------------------------------------------
// Statistics -- co-occurrence aggregate over annotation triples
// ---------------------------------------------------------------------------
//
// Built in a single pass over the corpus and never mutated afterwards.
// A reload builds a new aggregate; see `engine::StatsHandle`.
// ---------------------------------------------------------------------------

use std::borrow::Borrow;

use crate::counts::NestedCounts;
use crate::types::{Annotation, StatsSummary};

/// The four co-occurrence mappings derived from one annotation corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
	/// user -> (tag -> times the user applied the tag)
	user_tags: NestedCounts,
	/// tag -> (item -> times the tag was applied to the item)
	tag_items: NestedCounts,
	/// tag -> (user -> times the user applied the tag)
	tag_users: NestedCounts,
	/// item -> (user -> times the user tagged the item)
	item_users: NestedCounts,
	annotations: u64,
}

impl Statistics {
	/// Aggregate every annotation. Each one adds exactly one count to each
	/// of the four mappings; input order does not matter and duplicates
	/// are counted, not merged.
	pub fn build<I>(annotations: I) -> Self
	where
		I: IntoIterator,
		I::Item: Borrow<Annotation>,
	{
		let mut stats = Self::default();
		for annotation in annotations {
			let annotation: &Annotation = annotation.borrow();
			let (user, item, tag) = (&annotation.user, &annotation.item, &annotation.tag);
			stats.user_tags.increment(user, tag);
			stats.tag_items.increment(tag, item);
			stats.tag_users.increment(tag, user);
			stats.item_users.increment(item, user);
			stats.annotations += 1;
		}

		tracing::debug!(
			annotations = stats.annotations,
			users = stats.user_tags.len(),
			items = stats.item_users.len(),
			tags = stats.tag_items.len(),
			"Statistics built"
		);
		stats
	}

	pub fn user_tags(&self) -> &NestedCounts {
		&self.user_tags
	}

	pub fn tag_items(&self) -> &NestedCounts {
		&self.tag_items
	}

	pub fn tag_users(&self) -> &NestedCounts {
		&self.tag_users
	}

	pub fn item_users(&self) -> &NestedCounts {
		&self.item_users
	}

	/// How many distinct users have applied `tag`.
	pub fn distinct_users_for_tag(&self, tag: &str) -> usize {
		self.tag_users.distinct(tag)
	}

	/// How many distinct users have tagged `item`.
	pub fn distinct_users_for_item(&self, item: &str) -> usize {
		self.item_users.distinct(item)
	}

	pub fn annotation_count(&self) -> u64 {
		self.annotations
	}

	pub fn is_empty(&self) -> bool {
		self.annotations == 0
	}

	pub fn summary(&self) -> StatsSummary {
		StatsSummary {
			annotations: self.annotations,
			users: self.user_tags.len(),
			items: self.item_users.len(),
			tags: self.tag_items.len(),
		}
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
