// ---------------------------------------------------------------------------
// Recommendation Scorer -- tag-based TF-IDF ranking
// ---------------------------------------------------------------------------
//
// Pure functions over an immutable `Statistics`. For every tag the user
// has applied, every item carrying that tag is scored with the user's tag
// weight and the item's tag weight, each dampened by the log of how many
// distinct users the tag (or item) has.
//
// Tags are visited in ascending order and items within a tag in ascending
// order, so which tag "first touches" an item is fixed and results are
// reproducible.
// ---------------------------------------------------------------------------

use std::collections::HashMap;

use serde::Deserialize;

use crate::stats::Statistics;
use crate::types::Recommendation;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How an item already scored by an earlier tag accumulates further
/// contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AccumulationMode {
	/// `score += wti / tagDamp`. Later touches skip the user weight and the
	/// item dampening that the first touch applies.
	#[default]
	Reference,
	/// Every touch adds `(wut / tagDamp) * (wti / itemDamp)`.
	Symmetric,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringConfig {
	pub accumulation: AccumulationMode,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// `ln(1 + n)`, the popularity discount for a tag or item used by `n`
/// distinct users.
pub fn dampening(distinct_users: usize) -> f64 {
	(1.0 + distinct_users as f64).ln()
}

fn full_contribution(wut: u64, wti: u64, tag_damp: f64, item_damp: f64) -> f64 {
	(wut as f64 / tag_damp) * (wti as f64 / item_damp)
}

/// Score every candidate item for `user` and return them ranked: score
/// descending, ties broken by item identifier ascending. Items whose score
/// is zero are dropped.
pub fn rank_candidates(
	stats: &Statistics,
	user: &str,
	config: &ScoringConfig,
) -> Vec<Recommendation> {
	let tags = stats.user_tags().sorted_row(user);
	if tags.is_empty() {
		tracing::debug!(user, "No tags recorded for user");
		return Vec::new();
	}

	let mut scores: HashMap<&str, f64> = HashMap::new();
	for (tag, wut) in tags {
		let tag_damp = dampening(stats.distinct_users_for_tag(tag));
		for (item, wti) in stats.tag_items().sorted_row(tag) {
			match scores.get_mut(item) {
				None => {
					let item_damp = dampening(stats.distinct_users_for_item(item));
					scores.insert(item, full_contribution(wut, wti, tag_damp, item_damp));
				}
				// NOTE: reference mode drops the `wut` factor and the item
				// dampening on repeat touches. Rankings depend on this
				// asymmetry; `Symmetric` is the uniform variant.
				Some(score) => match config.accumulation {
					AccumulationMode::Reference => *score += wti as f64 / tag_damp,
					AccumulationMode::Symmetric => {
						let item_damp = dampening(stats.distinct_users_for_item(item));
						*score += full_contribution(wut, wti, tag_damp, item_damp);
					}
				},
			}
		}
	}

	let mut ranked: Vec<Recommendation> = scores
		.into_iter()
		.filter(|(_, score)| *score != 0.0)
		.map(|(item, score)| Recommendation {
			item: item.to_string(),
			score,
		})
		.collect();

	ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.item.cmp(&b.item)));
	ranked
}

/// Top `k` recommendations for `user`. Returns fewer than `k` when fewer
/// items are reachable, and nothing for an unknown user or `k == 0`.
pub fn recommend(
	stats: &Statistics,
	user: &str,
	k: usize,
	config: &ScoringConfig,
) -> Vec<Recommendation> {
	if k == 0 {
		return Vec::new();
	}

	let mut ranked = rank_candidates(stats, user, config);
	let candidates = ranked.len();
	ranked.truncate(k);

	tracing::debug!(
		user,
		k,
		candidates,
		returned = ranked.len(),
		accumulation = ?config.accumulation,
		"Scored recommendations"
	);
	ranked
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
