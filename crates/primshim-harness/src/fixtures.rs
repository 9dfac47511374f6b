//! Fixture loading and management.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixture schema version this harness reads and writes.
pub const FIXTURE_SCHEMA_VERSION: &str = "v1";

/// Errors raised while loading or writing fixture sets.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("fixture read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("fixture JSON invalid: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported fixture schema version `{0}`")]
    UnsupportedVersion(String),
}

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Exported symbol being tested.
    pub symbol: String,
    /// Testable property the case pins down.
    pub property: String,
    /// Input parameters (serialized).
    pub inputs: serde_json::Value,
    /// Expected output (serialized as string for comparison).
    pub expected_output: String,
    /// Whether this tests strict or hardened behavior ("both" runs under either).
    pub mode: String,
}

/// A collection of fixture cases for a symbol family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Symbol family name.
    pub family: String,
    /// UTC timestamp of capture.
    pub captured_at: String,
    /// Individual test cases.
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        let set: Self = serde_json::from_str(json)?;
        if set.version != FIXTURE_SCHEMA_VERSION {
            return Err(FixtureError::UnsupportedVersion(set.version));
        }
        Ok(set)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, FixtureError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &std::path::Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
