// ---------------------------------------------------------------------------
// Record source -- line-oriented annotation corpus reader
// ---------------------------------------------------------------------------
//
// One annotation per line: `user item tag`, separated by any run of
// whitespace. Blank lines are ignored. A line with another field count,
// an empty field, or bytes that are not UTF-8 is a malformed record,
// handled according to `MalformedPolicy`.
// ---------------------------------------------------------------------------

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;

use crate::error::{MalformedReason, Result, TagRecError};
use crate::types::Annotation;

/// What to do with a malformed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
	/// Log a warning, drop the record, keep loading.
	#[default]
	Skip,
	/// Abort the whole load.
	Fail,
}

/// Outcome of a load: the accepted annotations plus how many records were
/// dropped under `MalformedPolicy::Skip`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
	pub annotations: Vec<Annotation>,
	pub skipped: usize,
}

impl LoadReport {
	/// Apply `policy` to one candidate record. `line` is 1-based and only
	/// used for reporting.
	pub fn accept<S: AsRef<str>>(
		&mut self,
		fields: &[S],
		line: usize,
		policy: MalformedPolicy,
	) -> Result<()> {
		match annotation_from_fields(fields) {
			Ok(annotation) => {
				self.annotations.push(annotation);
				Ok(())
			}
			Err(reason) => self.reject(line, reason, policy),
		}
	}

	/// Record a rejected line: counted and logged under `Skip`, an error
	/// under `Fail`.
	pub fn reject(
		&mut self,
		line: usize,
		reason: MalformedReason,
		policy: MalformedPolicy,
	) -> Result<()> {
		match policy {
			MalformedPolicy::Skip => {
				tracing::warn!(line, %reason, "Skipping malformed record");
				self.skipped += 1;
				Ok(())
			}
			MalformedPolicy::Fail => Err(TagRecError::MalformedRecord { line, reason }),
		}
	}
}

/// Build an annotation from positional fields (user, item, tag). Requires
/// exactly three non-empty fields.
pub fn annotation_from_fields<S: AsRef<str>>(
	fields: &[S],
) -> std::result::Result<Annotation, MalformedReason> {
	let [user, item, tag] = fields else {
		return Err(MalformedReason::FieldCount(fields.len()));
	};
	let (user, item, tag) = (user.as_ref(), item.as_ref(), tag.as_ref());
	for (name, value) in [("user", user), ("item", item), ("tag", tag)] {
		if value.is_empty() {
			return Err(MalformedReason::EmptyField(name));
		}
	}
	Ok(Annotation::new(user, item, tag))
}

/// Read every record from `reader`. Lines are decoded one at a time, so a
/// badly encoded line only affects that record; read failures are
/// `TagRecError::Io`.
pub fn load_reader<R: BufRead>(mut reader: R, policy: MalformedPolicy) -> Result<LoadReport> {
	let mut report = LoadReport::default();
	let mut buf = Vec::new();
	let mut line_no = 0;

	loop {
		buf.clear();
		if reader.read_until(b'\n', &mut buf)? == 0 {
			break;
		}
		line_no += 1;

		let line = match std::str::from_utf8(&buf) {
			Ok(line) => line,
			Err(e) => {
				report.reject(line_no, MalformedReason::InvalidUtf8(e.valid_up_to()), policy)?;
				continue;
			}
		};

		let fields: Vec<&str> = line.split_whitespace().collect();
		if fields.is_empty() {
			continue;
		}
		report.accept(&fields, line_no, policy)?;
	}

	Ok(report)
}

/// Read every record from the file at `path`. Failing to open the file is
/// `TagRecError::SourceUnavailable`.
pub fn load_path(path: &Path, policy: MalformedPolicy) -> Result<LoadReport> {
	let file = File::open(path).map_err(|source| TagRecError::SourceUnavailable {
		path: path.to_path_buf(),
		source,
	})?;

	let report = load_reader(BufReader::new(file), policy)?;
	tracing::info!(
		path = %path.display(),
		annotations = report.annotations.len(),
		skipped = report.skipped,
		"Loaded annotation corpus"
	);
	Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
