use serde::{Deserialize, Serialize};

/// One tagging action: `user` applied `tag` to `item`.
///
/// All three fields are opaque identifiers compared by exact value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Annotation {
	pub user: String,
	pub item: String,
	pub tag: String,
}

impl Annotation {
	pub fn new(user: impl Into<String>, item: impl Into<String>, tag: impl Into<String>) -> Self {
		Self {
			user: user.into(),
			item: item.into(),
			tag: tag.into(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
	pub item: String,
	pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSummary {
	pub annotations: u64,
	pub users: usize,
	pub items: usize,
	pub tags: usize,
}
