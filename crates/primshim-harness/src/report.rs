//! Report generation for conformance results.

use primshim_ledger::PolicySnapshot;
use serde::{Deserialize, Serialize};

use crate::verify::VerificationSummary;

/// A conformance report combining verification results and the repair
/// policy counters observed at the end of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// Report title.
    pub title: String,
    /// Runtime mode tested (strict or hardened).
    pub mode: String,
    /// Timestamp (UTC).
    pub timestamp: String,
    /// Verification summary.
    pub summary: VerificationSummary,
    /// Repair policy counters after the run.
    pub policy: PolicySnapshot,
}

impl ConformanceReport {
    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("- Mode: {}\n", self.mode));
        out.push_str(&format!("- Timestamp: {}\n", self.timestamp));
        out.push_str(&format!("- Total: {}\n", self.summary.total));
        out.push_str(&format!("- Passed: {}\n", self.summary.passed));
        out.push_str(&format!("- Failed: {}\n\n", self.summary.failed));

        out.push_str("| Case | Property | Status |\n");
        out.push_str("|------|----------|--------|\n");
        for r in &self.summary.results {
            let status = if r.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                r.case_name, r.property, status
            ));
        }

        out.push_str("\n## Repair policy counters\n\n");
        out.push_str(&format!("- total_repairs: {}\n", self.policy.total_repairs));
        out.push_str(&format!(
            "- substituted_empties: {}\n",
            self.policy.substituted_empties
        ));
        out.push_str(&format!(
            "- truncated_scans: {}\n",
            self.policy.truncated_scans
        ));
        out.push_str(&format!(
            "- double_releases: {}\n",
            self.policy.double_releases
        ));
        out.push_str(&format!(
            "- foreign_releases: {}\n",
            self.policy.foreign_releases
        ));
        out.push_str(&format!("- total_rejects: {}\n", self.policy.total_rejects));
        out.push_str(&format!("- null_rejects: {}\n", self.policy.null_rejects));
        out.push_str(&format!(
            "- released_rejects: {}\n",
            self.policy.released_rejects
        ));
        out.push_str(&format!(
            "- unterminated_rejects: {}\n",
            self.policy.unterminated_rejects
        ));
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}
