//! Conformance testing harness for primshim.
//!
//! This crate provides:
//! - Fixture capture: write the built-in reference suites as JSON files
//! - Fixture verify: run the exported boundary against fixture cases,
//!   differentially against host libc and the safe-core model
//! - Truth tables: full-range classifier sweeps with per-symbol agreement
//! - Custody oracle: stage boundary misuse, verify per-mode outcomes
//! - Structured logs: JSONL evidence with schema validation and
//!   hash-pinned artifact indexes

#![forbid(unsafe_code)]

pub mod builtin;
pub mod custody_oracle;
pub mod diff;
pub mod exec;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod truth_table;
pub mod verify;

pub use exec::{DifferentialRun, ExecError};
pub use fixtures::{FixtureCase, FixtureError, FixtureSet};
pub use report::ConformanceReport;
pub use runner::TestRunner;
pub use verify::VerificationResult;
