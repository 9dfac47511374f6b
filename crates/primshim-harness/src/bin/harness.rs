//! CLI entrypoint for the primshim conformance harness.
//!
//! The safety level is resolved once per process from `PRIMSHIM_MODE`, so
//! subcommands that depend on it (`verify` with custody fixtures, `custody`)
//! test exactly one mode per invocation. Run the binary twice to cover both
//! validating modes.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use primshim_harness::structured_log::{
    ArtifactIndex, LogEmitter, LogEntry, LogLevel, Outcome, StreamKind, now_utc, validate_log_file,
};
use primshim_harness::verify::VerificationSummary;
use primshim_harness::{ConformanceReport, FixtureSet, TestRunner};
use primshim_ledger::{global_repair_policy, safety_level};

/// Conformance tooling for the primshim boundary.
#[derive(Debug, Parser)]
#[command(name = "primshim-harness")]
#[command(about = "Conformance testing harness for primshim")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write the built-in fixture suites as JSON files.
    Capture {
        /// Output directory for fixture JSON files.
        #[arg(long)]
        output: PathBuf,
        /// Fixture family to write: chars, seq, custody, or all.
        #[arg(long, default_value = "all")]
        family: String,
    },
    /// Verify the boundary against captured fixtures under the live mode.
    Verify {
        /// Directory containing fixture JSON files.
        #[arg(long)]
        fixture: PathBuf,
        /// Output report path (markdown; JSON written alongside).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Optional fixed timestamp string for deterministic report generation.
        #[arg(long)]
        timestamp: Option<String>,
        /// Optional structured JSONL log path (artifact index written alongside).
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Sweep every byte through the boundary, host libc, and the safe-core model.
    TruthTable {
        /// Output markdown path (JSON written alongside). Prints to stdout if omitted.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Keep every swept row in the JSON report, not only mismatches.
        #[arg(long)]
        full: bool,
    },
    /// Stage custody misuse scenarios and check per-mode outcomes.
    Custody {
        /// Optional JSON output path for the oracle outcomes.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate a structured JSONL log, and optionally its artifact index.
    ValidateLog {
        /// Structured JSONL log path.
        #[arg(long)]
        log: PathBuf,
        /// Artifact index JSON path; indexed paths resolve from the current directory.
        #[arg(long)]
        artifact_index: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Capture { output, family } => {
            let captured_at = now_utc();
            let sets = primshim_harness::builtin::sets_for_family(&family, &captured_at)
                .ok_or_else(|| {
                    format!("Unknown family '{family}', expected chars|seq|custody|all")
                })?;
            std::fs::create_dir_all(&output)?;
            for set in sets {
                let path = output.join(format!("{}.v1.json", set.family));
                std::fs::write(&path, set.to_json()?)?;
                eprintln!("Wrote {} cases to {}", set.cases.len(), path.display());
            }
        }
        Command::Verify {
            fixture,
            report,
            timestamp,
            log,
        } => {
            let live = safety_level();
            eprintln!(
                "Verifying against fixtures in {} (mode: {})",
                fixture.display(),
                live.as_str()
            );

            let mut fixture_sets = Vec::new();
            let mut fixture_paths: Vec<PathBuf> = std::fs::read_dir(&fixture)?
                .filter_map(|entry| entry.ok().map(|entry| entry.path()))
                .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
                .collect();
            fixture_paths.sort();

            for path in fixture_paths {
                match FixtureSet::from_file(&path) {
                    Ok(set) => fixture_sets.push(set),
                    Err(err) => eprintln!("Skipping {}: {}", path.display(), err),
                }
            }
            if fixture_sets.is_empty() {
                return Err(format!("No fixture JSON files found in {}", fixture.display()).into());
            }

            let runner = TestRunner::new("fixture-verify", live.as_str());
            let started = Instant::now();
            let mut results = Vec::new();
            for set in &fixture_sets {
                results.extend(runner.run(set));
            }
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

            // Stabilize report ordering for reproducible golden-output hashing.
            results.sort_by(|a, b| {
                a.family
                    .cmp(&b.family)
                    .then_with(|| a.symbol.cmp(&b.symbol))
                    .then_with(|| a.mode.cmp(&b.mode))
                    .then_with(|| a.case_name.cmp(&b.case_name))
                    .then_with(|| a.property.cmp(&b.property))
                    .then_with(|| a.expected.cmp(&b.expected))
                    .then_with(|| a.actual.cmp(&b.actual))
                    .then_with(|| a.passed.cmp(&b.passed))
            });

            let summary = VerificationSummary::from_results(results);
            let report_doc = ConformanceReport {
                title: String::from("primshim Conformance Report"),
                mode: live.as_str().to_string(),
                timestamp: timestamp.unwrap_or_else(now_utc),
                summary,
                policy: global_repair_policy().snapshot(),
            };

            eprintln!(
                "Verification complete: total={}, passed={}, failed={}",
                report_doc.summary.total, report_doc.summary.passed, report_doc.summary.failed
            );

            let mut written_reports = Vec::new();
            if let Some(report_path) = report {
                if let Some(parent) = report_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                eprintln!("Writing report to {}", report_path.display());
                std::fs::write(&report_path, report_doc.to_markdown())?;
                let json_path = report_path.with_extension("json");
                std::fs::write(&json_path, report_doc.to_json())?;
                written_reports.push((report_path, "report_md"));
                written_reports.push((json_path, "report_json"));
            }

            if let Some(log_path) = log {
                write_verify_log(&log_path, &report_doc, elapsed_ms, &written_reports)?;
                eprintln!("Wrote structured log to {}", log_path.display());
            }

            if !report_doc.summary.all_passed() {
                return Err("Conformance verification failed".into());
            }
        }
        Command::TruthTable { output, full } => {
            let report = primshim_harness::truth_table::build_truth_table("truth-table", full);
            eprintln!(
                "Truth table: {} rows, {} symbols, composition={}, ordinal={}",
                report.total_rows,
                report.symbol_matrix.len(),
                report.composition_holds,
                report.ordinal_identity_holds
            );

            if let Some(path) = output {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, report.to_markdown())?;
                std::fs::write(path.with_extension("json"), report.to_json())?;
                eprintln!("Wrote truth table to {}", path.display());
            } else {
                print!("{}", report.to_markdown());
            }

            if !report.all_passed() {
                return Err("Truth table sweep found disagreements".into());
            }
        }
        Command::Custody { output } => {
            let live = safety_level();
            if !live.validation_enabled() {
                return Err(
                    "Custody oracle needs a validating mode; set PRIMSHIM_MODE=strict or hardened"
                        .into(),
                );
            }
            eprintln!("Staging custody misuse in {} mode", live.as_str());

            let suite = primshim_harness::custody_oracle::CustodyOracleSuite::builtin();
            let outcomes = primshim_harness::custody_oracle::run_suite(&suite);
            let mut failed = 0;
            for outcome in &outcomes {
                let status = if outcome.passed { "ok" } else { "MISMATCH" };
                eprintln!(
                    "[{}] expected={} observed={} {}",
                    outcome.id, outcome.expected, outcome.observed, status
                );
                if !outcome.passed {
                    failed += 1;
                }
            }

            if let Some(path) = output {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, serde_json::to_string_pretty(&outcomes)?)?;
                eprintln!("Wrote oracle outcomes to {}", path.display());
            }

            if failed != 0 {
                return Err(format!("Custody oracle failed: {failed} mismatch(es)").into());
            }
        }
        Command::ValidateLog {
            log,
            artifact_index,
        } => {
            let content = std::fs::read_to_string(&log)?;
            let (lines, errors) = validate_log_file(&content);
            for error in &errors {
                eprintln!("{error}");
            }
            eprintln!(
                "Validated {} log line(s): {} violation(s)",
                lines,
                errors.len()
            );

            let mut index_problems = Vec::new();
            if let Some(index_path) = artifact_index {
                let index: ArtifactIndex =
                    serde_json::from_str(&std::fs::read_to_string(&index_path)?)?;
                index_problems = index.verify_files();
                for problem in &index_problems {
                    eprintln!("{problem}");
                }
                eprintln!(
                    "Verified {} artifact(s): {} problem(s)",
                    index.artifacts.len(),
                    index_problems.len()
                );
            }

            if !errors.is_empty() || !index_problems.is_empty() {
                return Err(format!(
                    "Log validation failed: {} schema violation(s), {} artifact problem(s)",
                    errors.len(),
                    index_problems.len()
                )
                .into());
            }
        }
    }

    Ok(())
}

/// Emit one log entry per verification result plus a summary entry, then
/// index the written evidence files by hash.
fn write_verify_log(
    log_path: &PathBuf,
    report_doc: &ConformanceReport,
    elapsed_ms: u64,
    written_reports: &[(PathBuf, &str)],
) -> Result<(), Box<dyn std::error::Error>> {
    let run_id = format!("run{}", std::process::id());
    let mut emitter = LogEmitter::to_file(log_path, "verify", run_id.as_str())?;

    for result in &report_doc.summary.results {
        let (level, outcome) = if result.passed {
            (LogLevel::Info, Outcome::Pass)
        } else {
            (LogLevel::Error, Outcome::Fail)
        };
        let mut entry = LogEntry::new(emitter.next_trace_id(), level, "fixture_case")
            .with_stream(StreamKind::Conformance)
            .with_gate("verify")
            .with_mode(result.mode.clone())
            .with_symbol(result.symbol.clone())
            .with_outcome(outcome);
        if !result.passed {
            entry = entry.with_details(serde_json::json!({
                "case": result.case_name,
                "expected": result.expected,
                "actual": result.actual,
            }));
        }
        emitter.emit(&entry)?;
    }

    let summary_outcome = if report_doc.summary.all_passed() {
        Outcome::Pass
    } else {
        Outcome::Fail
    };
    let artifact_refs: Vec<String> = written_reports
        .iter()
        .map(|(path, _)| path.display().to_string())
        .collect();
    let mut summary_entry = LogEntry::new(
        emitter.next_trace_id(),
        LogLevel::Info,
        "verify_summary",
    )
    .with_stream(StreamKind::Conformance)
    .with_gate("verify")
    .with_mode(report_doc.mode.clone())
    .with_outcome(summary_outcome)
    .with_duration_ms(elapsed_ms);
    if !artifact_refs.is_empty() {
        summary_entry = summary_entry.with_artifact_refs(artifact_refs);
    }
    emitter.emit(&summary_entry)?;
    drop(emitter);

    let mut index = ArtifactIndex::new(run_id.as_str());
    index.add_file(log_path, "log_jsonl", "structured verification log")?;
    for (path, kind) in written_reports {
        index.add_file(path, kind, "conformance report")?;
    }
    let index_path = log_path.with_extension("index.json");
    std::fs::write(&index_path, index.to_json()?)?;
    eprintln!("Wrote artifact index to {}", index_path.display());

    Ok(())
}
