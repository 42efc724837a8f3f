use std::path::PathBuf;

use clap::Parser;

use crate::loader::MalformedPolicy;
use crate::scorer::{AccumulationMode, ScoringConfig};
use crate::server::ServerConfig;

#[derive(Parser, Debug)]
#[command(
	name = "simse-tagrec-engine",
	about = "Tag-based item recommendation engine over JSON-RPC 2.0 / NDJSON stdio"
)]
pub struct CliArgs {
	/// Annotation corpus to load at startup (one `user item tag` per line)
	#[arg(long, env = "SIMSE_TAGREC_DATA")]
	pub data: Option<PathBuf>,

	/// What to do with malformed records (wrong field count, empty field, bad encoding)
	#[arg(long, value_enum, default_value_t = MalformedPolicy::Skip, env = "SIMSE_TAGREC_MALFORMED")]
	pub malformed: MalformedPolicy,

	/// How repeat touches of an item accumulate score
	#[arg(long, value_enum, default_value_t = AccumulationMode::Reference, env = "SIMSE_TAGREC_ACCUMULATION")]
	pub accumulation: AccumulationMode,

	/// Run a single query for this user, print the result and exit
	#[arg(long, requires = "data")]
	pub user: Option<String>,

	/// Number of recommendations for `--user`
	#[arg(long, default_value = "10")]
	pub k: usize,

	/// Separator between items printed for `--user`
	#[arg(long, default_value = "/")]
	pub separator: String,

	/// Log level (trace, debug, info, warn, error)
	#[arg(long, default_value = "info", env = "SIMSE_TAGREC_LOG_LEVEL")]
	pub log_level: String,
}

impl CliArgs {
	pub fn server_config(&self) -> ServerConfig {
		ServerConfig {
			scoring: ScoringConfig {
				accumulation: self.accumulation,
			},
			malformed: self.malformed,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let args = CliArgs::try_parse_from(["simse-tagrec-engine"]).unwrap();
		assert!(args.data.is_none());
		assert_eq!(args.malformed, MalformedPolicy::Skip);
		assert_eq!(args.accumulation, AccumulationMode::Reference);
		assert_eq!(args.k, 10);
		assert_eq!(args.separator, "/");
	}

	#[test]
	fn one_shot_query_flags() {
		let args = CliArgs::try_parse_from([
			"simse-tagrec-engine",
			"--data",
			"corpus.txt",
			"--user",
			"alice",
			"--k",
			"2",
			"--accumulation",
			"symmetric",
			"--malformed",
			"fail",
		])
		.unwrap();
		assert_eq!(args.user.as_deref(), Some("alice"));
		assert_eq!(args.k, 2);
		let config = args.server_config();
		assert_eq!(config.scoring.accumulation, AccumulationMode::Symmetric);
		assert_eq!(config.malformed, MalformedPolicy::Fail);
	}

	#[test]
	fn user_requires_data() {
		assert!(CliArgs::try_parse_from(["simse-tagrec-engine", "--user", "alice"]).is_err());
	}
}
