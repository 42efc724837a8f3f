use std::path::PathBuf;

use thiserror::Error;

/// Why a record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
	#[error("expected 3 fields (user item tag), got {0}")]
	FieldCount(usize),
	#[error("{0} field is empty")]
	EmptyField(&'static str),
	#[error("invalid UTF-8 at byte {0}")]
	InvalidUtf8(usize),
}

#[derive(Debug, Error)]
pub enum TagRecError {
	#[error("Malformed record at line {line}: {reason}")]
	MalformedRecord { line: usize, reason: MalformedReason },
	#[error("Record source unavailable: {}: {source}", .path.display())]
	SourceUnavailable {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("Invalid params: {0}")]
	InvalidParams(String),
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TagRecError>;

impl TagRecError {
	pub fn code(&self) -> &str {
		match self {
			Self::MalformedRecord { .. } => "TAGREC_MALFORMED_RECORD",
			Self::SourceUnavailable { .. } => "TAGREC_SOURCE_UNAVAILABLE",
			Self::InvalidParams(_) => "TAGREC_INVALID_PARAMS",
			Self::Io(_) => "TAGREC_IO",
			Self::Json(_) => "TAGREC_JSON",
		}
	}

	pub fn to_json_rpc_error(&self) -> serde_json::Value {
		serde_json::json!({
			"tagrecCode": self.code(),
			"message": self.to_string(),
		})
	}
}
