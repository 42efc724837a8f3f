// ---------------------------------------------------------------------------
// TagRecServer -- JSON-RPC dispatcher
// ---------------------------------------------------------------------------
//
// Routes incoming JSON-RPC 2.0 requests (NDJSON over stdin) to statistics
// loading and recommendation queries. Same shape as the other simse
// engines: a `run()` loop, a `dispatch()` match, and free-standing handler
// functions for each method.
// ---------------------------------------------------------------------------

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::engine::StatsHandle;
use crate::error::TagRecError;
use crate::loader::{self, LoadReport, MalformedPolicy};
use crate::protocol::*;
use crate::scorer::ScoringConfig;
use crate::transport::NdjsonTransport;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Defaults applied when a request does not override them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerConfig {
	pub scoring: ScoringConfig,
	pub malformed: MalformedPolicy,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

pub struct TagRecServer<W: Write = io::Stdout> {
	transport: NdjsonTransport<W>,
	config: ServerConfig,
	stats: StatsHandle,
}

impl<W: Write> TagRecServer<W> {
	pub fn new(transport: NdjsonTransport<W>, config: ServerConfig, stats: StatsHandle) -> Self {
		Self {
			transport,
			config,
			stats,
		}
	}

	pub fn transport(&self) -> &NdjsonTransport<W> {
		&self.transport
	}

	/// Main loop: read JSON-RPC messages from stdin, dispatch to handlers.
	pub fn run(&mut self) -> Result<(), TagRecError> {
		let stdin = io::stdin();
		self.serve(stdin.lock())
	}

	/// Read JSON-RPC messages from `reader` until EOF.
	pub fn serve<R: BufRead>(&mut self, reader: R) -> Result<(), TagRecError> {
		for line_result in reader.lines() {
			let line = line_result?;
			let trimmed = line.trim();
			if trimmed.is_empty() {
				continue;
			}

			match serde_json::from_str::<JsonRpcRequest>(trimmed) {
				Ok(request) => self.dispatch(request),
				Err(e) => {
					tracing::warn!("Parse error: {}", e);
					self.transport
						.write_error(0, INTERNAL_ERROR, "Parse error: invalid JSON", None);
				}
			}
		}

		Ok(())
	}

	// ── Dispatch ──────────────────────────────────────────────────────────

	fn dispatch(&mut self, req: JsonRpcRequest) {
		let id = req.id;
		let Some(result) = self.route(&req.method, req.params) else {
			self.transport.write_error(
				id,
				METHOD_NOT_FOUND,
				format!("Unknown method: {}", req.method),
				None,
			);
			return;
		};

		match result {
			Ok(value) => self.transport.write_response(id, value),
			Err(e) => {
				let code = match &e {
					TagRecError::InvalidParams(_) => INVALID_PARAMS,
					_ => TAGREC_ERROR,
				};
				self.transport
					.write_error(id, code, e.to_string(), Some(e.to_json_rpc_error()));
			}
		}
	}

	/// Run one method. `None` means the method is unknown.
	fn route(
		&self,
		method: &str,
		params: serde_json::Value,
	) -> Option<Result<serde_json::Value, TagRecError>> {
		let result = match method {
			// -- Statistics ----------------------------------------------
			"stats/load" => handle_load(&self.stats, &self.config, params),
			"stats/loadRecords" => handle_load_records(&self.stats, &self.config, params),
			"stats/summary" => {
				serde_json::to_value(self.stats.current().summary()).map_err(TagRecError::from)
			}
			"stats/userTags" => handle_user_tags(&self.stats, params),
			"stats/tagItems" => handle_tag_items(&self.stats, params),

			// -- Recommendation ------------------------------------------
			"recommend" => handle_recommend(&self.stats, &self.config, params),

			_ => return None,
		};
		Some(result)
	}
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn parse_params<T: serde::de::DeserializeOwned>(
	params: serde_json::Value,
) -> Result<T, TagRecError> {
	serde_json::from_value(params).map_err(|e| TagRecError::InvalidParams(e.to_string()))
}

fn load_result(
	stats: &StatsHandle,
	report: &LoadReport,
) -> Result<serde_json::Value, TagRecError> {
	let mut value = serde_json::to_value(stats.load(report))?;
	value["skipped"] = serde_json::json!(report.skipped);
	Ok(value)
}

fn handle_load(
	stats: &StatsHandle,
	config: &ServerConfig,
	params: serde_json::Value,
) -> Result<serde_json::Value, TagRecError> {
	let p: LoadParams = parse_params(params)?;
	let policy = p.malformed.unwrap_or(config.malformed);
	let report = loader::load_path(Path::new(&p.path), policy)?;
	load_result(stats, &report)
}

fn handle_load_records(
	stats: &StatsHandle,
	config: &ServerConfig,
	params: serde_json::Value,
) -> Result<serde_json::Value, TagRecError> {
	let p: LoadRecordsParams = parse_params(params)?;
	let policy = p.malformed.unwrap_or(config.malformed);

	let mut report = LoadReport::default();
	for (index, fields) in p.records.iter().enumerate() {
		report.accept(fields, index + 1, policy)?;
	}
	load_result(stats, &report)
}

fn handle_user_tags(
	stats: &StatsHandle,
	params: serde_json::Value,
) -> Result<serde_json::Value, TagRecError> {
	let p: UserParams = parse_params(params)?;
	let current = stats.current();
	let tags: BTreeMap<&str, u64> = current.user_tags().sorted_row(&p.user).into_iter().collect();
	Ok(serde_json::json!({ "tags": tags }))
}

fn handle_tag_items(
	stats: &StatsHandle,
	params: serde_json::Value,
) -> Result<serde_json::Value, TagRecError> {
	let p: TagParams = parse_params(params)?;
	let current = stats.current();
	let items: BTreeMap<&str, u64> = current.tag_items().sorted_row(&p.tag).into_iter().collect();
	Ok(serde_json::json!({ "items": items }))
}

fn handle_recommend(
	stats: &StatsHandle,
	config: &ServerConfig,
	params: serde_json::Value,
) -> Result<serde_json::Value, TagRecError> {
	let p: RecommendParams = parse_params(params)?;
	let scoring = ScoringConfig {
		accumulation: p.accumulation.unwrap_or(config.scoring.accumulation),
	};

	let recs = stats.recommend(&p.user, p.k, &scoring);
	let items: Vec<&str> = recs.iter().map(|r| r.item.as_str()).collect();
	Ok(serde_json::json!({ "items": items, "scores": recs }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
