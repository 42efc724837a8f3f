// ---------------------------------------------------------------------------
// Integration tests for simse-tagrec-engine JSON-RPC 2.0 / NDJSON protocol
// ---------------------------------------------------------------------------
//
// Each test spawns a fresh simse-tagrec-engine binary and communicates via
// stdin/stdout using newline-delimited JSON-RPC 2.0 messages.
// ---------------------------------------------------------------------------

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{json, Value};

const BIN: &str = env!("CARGO_BIN_EXE_simse-tagrec-engine");

const SCENARIO: &str = "alice songA pop\nalice songB pop\nbob songA pop\nalice songA rock\n";

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

struct TagRecProcess {
	child: Child,
	reader: BufReader<std::process::ChildStdout>,
	next_id: AtomicU64,
}

impl TagRecProcess {
	fn spawn(args: &[&str]) -> Self {
		let mut child = Command::new(BIN)
			.args(args)
			.env_remove("SIMSE_TAGREC_DATA")
			.env_remove("SIMSE_TAGREC_MALFORMED")
			.env_remove("SIMSE_TAGREC_ACCUMULATION")
			.stdin(Stdio::piped())
			.stdout(Stdio::piped())
			.stderr(Stdio::null())
			.spawn()
			.expect("failed to spawn simse-tagrec-engine");

		let stdout = child.stdout.take().expect("no stdout");
		let reader = BufReader::new(stdout);

		Self {
			child,
			reader,
			next_id: AtomicU64::new(1),
		}
	}

	fn write_raw(&mut self, line: &str) {
		let stdin = self.child.stdin.as_mut().expect("no stdin");
		stdin.write_all(line.as_bytes()).unwrap();
		stdin.write_all(b"\n").unwrap();
		stdin.flush().unwrap();
	}

	fn read_message(&mut self) -> Value {
		loop {
			let mut buf = String::new();
			let bytes_read = self
				.reader
				.read_line(&mut buf)
				.expect("failed to read from stdout");
			if bytes_read == 0 {
				panic!("unexpected EOF while waiting for a response");
			}
			let buf = buf.trim();
			if buf.is_empty() {
				continue;
			}
			return serde_json::from_str(buf)
				.unwrap_or_else(|e| panic!("invalid JSON from engine: {e}\nline: {buf}"));
		}
	}

	fn send(&mut self, method: &str, params: Value) -> RpcResponse {
		let id = self.next_id.fetch_add(1, Ordering::SeqCst);
		let request = json!({
			"jsonrpc": "2.0",
			"id": id,
			"method": method,
			"params": params,
		});
		self.write_raw(&serde_json::to_string(&request).unwrap());

		let parsed = self.read_message();
		let resp_id = parsed["id"].as_u64().expect("response id is not u64");
		assert_eq!(resp_id, id, "response id mismatch");
		if let Some(error) = parsed.get("error") {
			return RpcResponse::Error(error.clone());
		}
		RpcResponse::Ok(parsed.get("result").cloned().unwrap_or(Value::Null))
	}

	fn call(&mut self, method: &str, params: Value) -> Value {
		match self.send(method, params) {
			RpcResponse::Ok(v) => v,
			RpcResponse::Error(e) => panic!("expected success, got error: {e}"),
		}
	}

	fn call_err(&mut self, method: &str, params: Value) -> Value {
		match self.send(method, params) {
			RpcResponse::Error(e) => e,
			RpcResponse::Ok(v) => panic!("expected error, got success: {v}"),
		}
	}
}

impl Drop for TagRecProcess {
	fn drop(&mut self) {
		drop(self.child.stdin.take());
		let _ = self.child.wait();
	}
}

#[derive(Debug)]
enum RpcResponse {
	Ok(Value),
	Error(Value),
}

fn corpus_file(contents: impl AsRef<[u8]>) -> tempfile::NamedTempFile {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	file.write_all(contents.as_ref()).unwrap();
	file.flush().unwrap();
	file
}

fn items(result: &Value) -> Vec<String> {
	result["items"]
		.as_array()
		.expect("items should be array")
		.iter()
		.map(|v| v.as_str().unwrap().to_string())
		.collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn load_file_and_recommend() {
	let file = corpus_file(SCENARIO);
	let mut proc = TagRecProcess::spawn(&[]);

	let path = file.path().to_str().unwrap();
	let loaded = proc.call("stats/load", json!({ "path": path }));
	assert_eq!(loaded["annotations"], 4);
	assert_eq!(loaded["skipped"], 0);

	let result = proc.call("recommend", json!({ "user": "alice", "k": 1 }));
	assert_eq!(items(&result), vec!["songA"]);

	let result = proc.call("recommend", json!({ "user": "alice", "k": 10 }));
	assert_eq!(items(&result), vec!["songA", "songB"]);
}

#[test]
fn preloaded_data_is_served() {
	let file = corpus_file(SCENARIO);
	let path = file.path().to_str().unwrap();
	let mut proc = TagRecProcess::spawn(&["--data", path]);

	let summary = proc.call("stats/summary", json!({}));
	assert_eq!(summary["annotations"], 4);
	assert_eq!(summary["users"], 2);

	let tags = proc.call("stats/userTags", json!({ "user": "alice" }));
	assert_eq!(tags["tags"], json!({ "pop": 2, "rock": 1 }));
}

#[test]
fn queries_before_load_are_empty() {
	let mut proc = TagRecProcess::spawn(&[]);
	let result = proc.call("recommend", json!({ "user": "alice", "k": 5 }));
	assert!(items(&result).is_empty());
	let summary = proc.call("stats/summary", json!({}));
	assert_eq!(summary["annotations"], 0);
}

#[test]
fn reload_replaces_statistics() {
	let mut proc = TagRecProcess::spawn(&[]);
	proc.call(
		"stats/loadRecords",
		json!({ "records": [["alice", "songA", "pop"]] }),
	);
	proc.call(
		"stats/loadRecords",
		json!({ "records": [["carol", "songZ", "jazz"], ["carol", "songY", "jazz"]] }),
	);

	let summary = proc.call("stats/summary", json!({}));
	assert_eq!(summary["annotations"], 2);
	let alice = proc.call("recommend", json!({ "user": "alice", "k": 5 }));
	assert!(items(&alice).is_empty());
	let carol = proc.call("recommend", json!({ "user": "carol", "k": 5 }));
	assert_eq!(items(&carol), vec!["songY", "songZ"]);
}

#[test]
fn malformed_lines_are_skipped_or_fatal() {
	let file = corpus_file("alice songA pop\njust two\nbob songA pop\n");
	let path = file.path().to_str().unwrap();
	let mut proc = TagRecProcess::spawn(&[]);

	let loaded = proc.call("stats/load", json!({ "path": path }));
	assert_eq!(loaded["annotations"], 2);
	assert_eq!(loaded["skipped"], 1);

	let err = proc.call_err("stats/load", json!({ "path": path, "malformed": "fail" }));
	assert_eq!(err["code"], -32000);
	assert_eq!(err["data"]["tagrecCode"], "TAGREC_MALFORMED_RECORD");

	// The failed load leaves the previous statistics in place.
	let summary = proc.call("stats/summary", json!({}));
	assert_eq!(summary["annotations"], 2);
}

#[test]
fn badly_encoded_line_only_drops_that_record() {
	let file = corpus_file(b"alice songA pop\n\xC4\xCF\xD4 x y\nbob songA pop\n");
	let path = file.path().to_str().unwrap();
	let mut proc = TagRecProcess::spawn(&[]);

	let loaded = proc.call("stats/load", json!({ "path": path }));
	assert_eq!(loaded["annotations"], 2);
	assert_eq!(loaded["skipped"], 1);

	let err = proc.call_err("stats/load", json!({ "path": path, "malformed": "fail" }));
	assert_eq!(err["data"]["tagrecCode"], "TAGREC_MALFORMED_RECORD");
	assert!(err["message"].as_str().unwrap().contains("line 2"));
}

#[test]
fn missing_source_is_an_error() {
	let dir = tempfile::tempdir().unwrap();
	let missing = dir.path().join("missing.txt");
	let mut proc = TagRecProcess::spawn(&[]);

	let err = proc.call_err("stats/load", json!({ "path": missing.to_str().unwrap() }));
	assert_eq!(err["data"]["tagrecCode"], "TAGREC_SOURCE_UNAVAILABLE");
}

#[test]
fn symmetric_accumulation_per_request() {
	let mut proc = TagRecProcess::spawn(&[]);
	proc.call(
		"stats/loadRecords",
		json!({ "records": [
			["alice", "songA", "pop"],
			["alice", "songB", "pop"],
			["bob", "songA", "pop"],
			["alice", "songA", "rock"],
		] }),
	);

	let reference = proc.call("recommend", json!({ "user": "alice", "k": 1 }));
	let symmetric = proc.call(
		"recommend",
		json!({ "user": "alice", "k": 1, "accumulation": "symmetric" }),
	);
	let r = reference["scores"][0]["score"].as_f64().unwrap();
	let s = symmetric["scores"][0]["score"].as_f64().unwrap();
	assert!(r > s, "reference {r} should exceed symmetric {s} for songA");
}

#[test]
fn protocol_errors() {
	let mut proc = TagRecProcess::spawn(&[]);

	let err = proc.call_err("bogus/method", json!({}));
	assert_eq!(err["code"], -32601);

	let err = proc.call_err("recommend", json!({ "user": "alice" }));
	assert_eq!(err["code"], -32602);
	assert_eq!(err["data"]["tagrecCode"], "TAGREC_INVALID_PARAMS");

	proc.write_raw("{ not json");
	let parsed = proc.read_message();
	assert_eq!(parsed["id"], 0);
	assert_eq!(parsed["error"]["code"], -32603);

	// Still serving after a bad line.
	let summary = proc.call("stats/summary", json!({}));
	assert_eq!(summary["annotations"], 0);
}

#[test]
fn one_shot_query_prints_joined_items() {
	let file = corpus_file(SCENARIO);
	let output = Command::new(BIN)
		.args([
			"--data",
			file.path().to_str().unwrap(),
			"--user",
			"alice",
			"--k",
			"2",
		])
		.env_remove("SIMSE_TAGREC_DATA")
		.env_remove("SIMSE_TAGREC_MALFORMED")
		.env_remove("SIMSE_TAGREC_ACCUMULATION")
		.stderr(Stdio::null())
		.output()
		.expect("failed to run simse-tagrec-engine");

	assert!(output.status.success());
	assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "songA/songB");
}

#[test]
fn one_shot_missing_data_exits_nonzero() {
	let dir = tempfile::tempdir().unwrap();
	let missing = dir.path().join("missing.txt");
	let status = Command::new(BIN)
		.args(["--data", missing.to_str().unwrap(), "--user", "alice"])
		.env_remove("SIMSE_TAGREC_MALFORMED")
		.env_remove("SIMSE_TAGREC_ACCUMULATION")
		.stderr(Stdio::null())
		.stdout(Stdio::null())
		.status()
		.expect("failed to run simse-tagrec-engine");

	assert_eq!(status.code(), Some(1));
}
