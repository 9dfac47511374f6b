//! Structured JSONL logging for harness runs.
//!
//! Every harness activity that produces evidence emits one JSON object per
//! line. Four fields are required on every entry: `timestamp`, `trace_id`,
//! `level`, and `event`. Everything else is optional and omitted from the
//! serialized form when absent. Validation reads a log back and checks the
//! schema line by line, so a run's evidence can be audited without the
//! process that produced it.

use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Which harness activity produced the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Unit,
    Conformance,
    Custody,
    Perf,
}

/// Terminal outcome of the activity the entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    Skip,
}

/// One structured log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// UTC timestamp.
    pub timestamp: String,
    /// Namespaced identifier: `suite::run::seq`.
    pub trace_id: String,
    /// Severity.
    pub level: LogLevel,
    /// Event name, lower_snake_case.
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<StreamKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repair_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ns: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_refs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEntry {
    /// New entry with the required fields and a fresh timestamp.
    #[must_use]
    pub fn new(trace_id: impl Into<String>, level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: now_utc(),
            trace_id: trace_id.into(),
            level,
            event: event.into(),
            stream: None,
            gate: None,
            mode: None,
            symbol: None,
            verdict: None,
            repair_action: None,
            outcome: None,
            latency_ns: None,
            duration_ms: None,
            artifact_refs: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_stream(mut self, stream: StreamKind) -> Self {
        self.stream = Some(stream);
        self
    }

    #[must_use]
    pub fn with_gate(mut self, gate: impl Into<String>) -> Self {
        self.gate = Some(gate.into());
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    #[must_use]
    pub fn with_verdict(mut self, verdict: impl Into<String>) -> Self {
        self.verdict = Some(verdict.into());
        self
    }

    #[must_use]
    pub fn with_repair_action(mut self, repair_action: impl Into<String>) -> Self {
        self.repair_action = Some(repair_action.into());
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    #[must_use]
    pub fn with_latency_ns(mut self, latency_ns: u64) -> Self {
        self.latency_ns = Some(latency_ns);
        self
    }

    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    #[must_use]
    pub fn with_artifact_refs(mut self, refs: Vec<String>) -> Self {
        self.artifact_refs = Some(refs);
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Serialize to a single JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Cloneable in-memory sink, used by tests and buffered runs.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Current buffer contents as UTF-8 text.
    #[must_use]
    pub fn contents(&self) -> String {
        let guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&guard).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes JSONL entries to a sink and hands out sequenced trace ids.
pub struct LogEmitter {
    writer: Box<dyn Write + Send>,
    suite: String,
    run_id: String,
    seq: u64,
}

impl LogEmitter {
    /// Emit to a file, creating parent directories as needed.
    pub fn to_file(
        path: &Path,
        suite: impl Into<String>,
        run_id: impl Into<String>,
    ) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        Ok(Self {
            writer: Box::new(file),
            suite: suite.into(),
            run_id: run_id.into(),
            seq: 0,
        })
    }

    /// Emit to an in-memory buffer; the returned handle reads it back.
    #[must_use]
    pub fn to_buffer(suite: impl Into<String>, run_id: impl Into<String>) -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::default();
        let emitter = Self {
            writer: Box::new(buffer.clone()),
            suite: suite.into(),
            run_id: run_id.into(),
            seq: 0,
        };
        (emitter, buffer)
    }

    /// Next namespaced trace id: `suite::run::seq`.
    pub fn next_trace_id(&mut self) -> String {
        self.seq += 1;
        format!("{}::{}::{:03}", self.suite, self.run_id, self.seq)
    }

    /// Write one entry as a JSONL line.
    pub fn emit(&mut self, entry: &LogEntry) -> io::Result<()> {
        let line = entry.to_jsonl().map_err(io::Error::other)?;
        writeln!(self.writer, "{line}")?;
        self.writer.flush()
    }
}

/// Violations found while validating a structured log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogValidationError {
    #[error("line {line}: not valid JSON: {detail}")]
    InvalidJson { line: usize, detail: String },
    #[error("line {line}: required field `{field}` missing or not a string")]
    MissingField { line: usize, field: &'static str },
    #[error("line {line}: field `{field}` has unknown value `{value}`")]
    UnknownValue {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("line {line}: trace_id `{trace_id}` is not namespaced")]
    MalformedTraceId { line: usize, trace_id: String },
    #[error("line {line}: entry does not deserialize: {detail}")]
    Deserialize { line: usize, detail: String },
}

const LEVEL_VALUES: [&str; 3] = ["info", "warn", "error"];
const STREAM_VALUES: [&str; 4] = ["unit", "conformance", "custody", "perf"];
const OUTCOME_VALUES: [&str; 3] = ["pass", "fail", "skip"];
const MODE_VALUES: [&str; 3] = ["strict", "hardened", "off"];
const VERDICT_VALUES: [&str; 3] = ["accept", "heal", "reject"];
const REPAIR_VALUES: [&str; 5] = [
    "substitute_empty",
    "truncate_scan",
    "ignore_double_release",
    "ignore_foreign_release",
    "none",
];

fn check_enum(
    value: &serde_json::Value,
    field: &'static str,
    allowed: &[&str],
    line: usize,
    errors: &mut Vec<LogValidationError>,
) {
    if let Some(raw) = value.get(field)
        && let Some(s) = raw.as_str()
        && !allowed.contains(&s)
    {
        errors.push(LogValidationError::UnknownValue {
            line,
            field,
            value: s.to_string(),
        });
    }
}

/// Validate a single JSONL line against the log schema.
pub fn validate_log_line(line_number: usize, raw: &str) -> Result<LogEntry, Vec<LogValidationError>> {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            return Err(vec![LogValidationError::InvalidJson {
                line: line_number,
                detail: e.to_string(),
            }]);
        }
    };

    let mut errors = Vec::new();

    for field in ["timestamp", "trace_id", "level", "event"] {
        if value.get(field).and_then(serde_json::Value::as_str).is_none() {
            errors.push(LogValidationError::MissingField {
                line: line_number,
                field,
            });
        }
    }

    check_enum(&value, "level", &LEVEL_VALUES, line_number, &mut errors);
    check_enum(&value, "stream", &STREAM_VALUES, line_number, &mut errors);
    check_enum(&value, "outcome", &OUTCOME_VALUES, line_number, &mut errors);
    check_enum(&value, "mode", &MODE_VALUES, line_number, &mut errors);
    check_enum(&value, "verdict", &VERDICT_VALUES, line_number, &mut errors);
    check_enum(
        &value,
        "repair_action",
        &REPAIR_VALUES,
        line_number,
        &mut errors,
    );

    if let Some(trace_id) = value.get("trace_id").and_then(serde_json::Value::as_str)
        && !trace_id.contains("::")
    {
        errors.push(LogValidationError::MalformedTraceId {
            line: line_number,
            trace_id: trace_id.to_string(),
        });
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    serde_json::from_value::<LogEntry>(value).map_err(|e| {
        vec![LogValidationError::Deserialize {
            line: line_number,
            detail: e.to_string(),
        }]
    })
}

/// Validate a whole JSONL log. Returns the number of non-empty lines seen
/// and every violation found.
#[must_use]
pub fn validate_log_file(content: &str) -> (usize, Vec<LogValidationError>) {
    let mut lines = 0;
    let mut errors = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        lines += 1;
        if let Err(mut line_errors) = validate_log_line(idx + 1, raw) {
            errors.append(&mut line_errors);
        }
    }
    (lines, errors)
}

/// One artifact referenced by a run's evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    /// Path relative to the index location.
    pub path: String,
    /// Artifact kind, e.g. "report_md", "report_json", "log_jsonl".
    pub kind: String,
    /// SHA-256 of the file contents, lowercase hex.
    pub sha256: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Human description.
    pub description: String,
}

/// Index of the artifacts a run produced, hash-pinned for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactIndex {
    /// Index schema version.
    pub index_version: u32,
    /// Run identifier shared with the log's trace ids.
    pub run_id: String,
    /// UTC generation timestamp.
    pub generated_utc: String,
    /// Indexed artifacts.
    pub artifacts: Vec<ArtifactEntry>,
}

impl ArtifactIndex {
    /// New empty index for a run.
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            index_version: 1,
            run_id: run_id.into(),
            generated_utc: now_utc(),
            artifacts: Vec::new(),
        }
    }

    /// Hash a file and add it to the index.
    pub fn add_file(&mut self, path: &Path, kind: &str, description: &str) -> io::Result<()> {
        let bytes = std::fs::read(path)?;
        self.artifacts.push(ArtifactEntry {
            path: path.display().to_string(),
            kind: kind.to_string(),
            sha256: sha256_hex(&bytes),
            size_bytes: bytes.len() as u64,
            description: description.to_string(),
        });
        Ok(())
    }

    /// Re-hash every indexed artifact; returns one message per mismatch or
    /// unreadable file.
    #[must_use]
    pub fn verify_files(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for entry in &self.artifacts {
            match std::fs::read(&entry.path) {
                Ok(bytes) => {
                    let actual = sha256_hex(&bytes);
                    if actual != entry.sha256 {
                        problems.push(format!(
                            "{}: sha256 mismatch (indexed {}, found {})",
                            entry.path, entry.sha256, actual
                        ));
                    }
                }
                Err(e) => problems.push(format!("{}: unreadable: {e}", entry.path)),
            }
        }
        problems
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// SHA-256 of a byte slice as lowercase hex.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(64);
    for byte in digest {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{byte:02x}");
    }
    out
}

/// Approximate ISO-8601 UTC timestamp without a clock crate.
#[must_use]
pub fn now_utc() -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = now.as_secs();
    let days = secs / 86_400;
    let rem = secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}Z",
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60
    )
}

/// Gregorian date from days since 1970-01-01, computed over 400-year eras.
const fn civil_from_days(days_since_epoch: u64) -> (u64, u64, u64) {
    let z = days_since_epoch + 719_468;
    let era = z / 146_097;
    let doe = z % 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}
