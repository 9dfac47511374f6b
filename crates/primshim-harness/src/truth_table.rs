//! Differential truth tables for the classifier exports.
//!
//! Sweeps every byte value through three paths: the exported boundary, the
//! host libc ctype calls, and the safe-core model, then aggregates
//! agreement per symbol. Two structural checks ride along with the sweep:
//! the alphanumeric classifier must equal the union of digit, lower, and
//! upper on every byte, and the ordinal must return the byte value itself.

use std::collections::BTreeMap;

use primshim_abi::driver::{self, ClassifierSymbol};
use serde::{Deserialize, Serialize};

use crate::structured_log::now_utc;

/// One byte execution row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruthTableRow {
    pub symbol: String,
    pub byte: u8,
    pub impl_value: i32,
    pub host_value: i32,
    pub model_value: i32,
    pub host_parity: bool,
    pub model_parity: bool,
}

/// Symbol-level agreement aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolAgreementRow {
    pub symbol: String,
    pub total: u64,
    pub host_mismatches: u64,
    pub model_mismatches: u64,
    pub agreement_percent: f64,
}

/// Top-level truth table report payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthTableReport {
    pub schema_version: String,
    pub generated_at_utc: String,
    pub campaign: String,
    /// Rows swept: five symbols over 256 byte values.
    pub total_rows: u64,
    /// is_alphanum agrees with is_digit | is_lower | is_upper on every byte.
    pub composition_holds: bool,
    /// char_ord returns the byte value on every byte.
    pub ordinal_identity_holds: bool,
    pub symbol_matrix: Vec<SymbolAgreementRow>,
    /// Mismatching rows, or every row when built with `include_all_rows`.
    pub rows: Vec<TruthTableRow>,
}

impl TruthTableReport {
    /// Returns true when every path agreed and both structural checks held.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.composition_holds
            && self.ordinal_identity_holds
            && self
                .symbol_matrix
                .iter()
                .all(|row| row.host_mismatches == 0 && row.model_mismatches == 0)
    }

    /// Render the aggregate table as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Classifier truth table\n\n");
        out.push_str(&format!("- Campaign: {}\n", self.campaign));
        out.push_str(&format!("- Generated: {}\n", self.generated_at_utc));
        out.push_str(&format!("- Rows: {}\n", self.total_rows));
        out.push_str(&format!(
            "- Union composition holds: {}\n",
            self.composition_holds
        ));
        out.push_str(&format!(
            "- Ordinal identity holds: {}\n\n",
            self.ordinal_identity_holds
        ));

        out.push_str("| Symbol | Total | Host mismatches | Model mismatches | Agreement |\n");
        out.push_str("|--------|-------|-----------------|------------------|----------|\n");
        for row in &self.symbol_matrix {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {:.2}% |\n",
                row.symbol, row.total, row.host_mismatches, row.model_mismatches,
                row.agreement_percent
            ));
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

/// Sweep every byte through every classifier and build the report.
#[must_use]
pub fn build_truth_table(campaign: &str, include_all_rows: bool) -> TruthTableReport {
    let mut rows = Vec::new();
    let mut composition_holds = true;
    let mut ordinal_identity_holds = true;

    for c in 0..=u8::MAX {
        for symbol in ClassifierSymbol::ALL {
            let impl_value = driver::run_classifier(symbol, c);
            let host_value = driver::run_host_classifier(symbol, c);
            let model = model_value(symbol, c);
            rows.push(TruthTableRow {
                symbol: symbol.name().to_string(),
                byte: c,
                impl_value,
                host_value,
                model_value: model,
                host_parity: impl_value == host_value,
                model_parity: impl_value == model,
            });
        }

        let union = driver::run_classifier(ClassifierSymbol::IsDigit, c)
            | driver::run_classifier(ClassifierSymbol::IsLower, c)
            | driver::run_classifier(ClassifierSymbol::IsUpper, c);
        if driver::run_classifier(ClassifierSymbol::IsAlphanum, c) != union {
            composition_holds = false;
        }
        if driver::run_classifier(ClassifierSymbol::CharOrd, c) != i32::from(c) {
            ordinal_identity_holds = false;
        }
    }

    // (total, host mismatches, model mismatches, rows with either mismatch)
    let mut symbol_buckets: BTreeMap<String, (u64, u64, u64, u64)> = BTreeMap::new();
    for row in &rows {
        let bucket = symbol_buckets
            .entry(row.symbol.clone())
            .or_insert((0, 0, 0, 0));
        bucket.0 += 1;
        if !row.host_parity {
            bucket.1 += 1;
        }
        if !row.model_parity {
            bucket.2 += 1;
        }
        if !row.host_parity || !row.model_parity {
            bucket.3 += 1;
        }
    }

    let symbol_matrix = symbol_buckets
        .into_iter()
        .map(
            |(symbol, (total, host_mismatches, model_mismatches, disagreed))| SymbolAgreementRow {
                symbol,
                total,
                host_mismatches,
                model_mismatches,
                agreement_percent: ratio_percent(total - disagreed, total),
            },
        )
        .collect();

    let total_rows = rows.len() as u64;
    let kept_rows = if include_all_rows {
        rows
    } else {
        rows.into_iter()
            .filter(|row| !row.host_parity || !row.model_parity)
            .collect()
    };

    TruthTableReport {
        schema_version: "v1".to_string(),
        generated_at_utc: now_utc(),
        campaign: campaign.to_string(),
        total_rows,
        composition_holds,
        ordinal_identity_holds,
        symbol_matrix,
        rows: kept_rows,
    }
}

fn model_value(symbol: ClassifierSymbol, c: u8) -> i32 {
    match symbol {
        ClassifierSymbol::CharOrd => primshim_core::chars::ord(c),
        ClassifierSymbol::IsDigit => i32::from(primshim_core::chars::is_digit(c)),
        ClassifierSymbol::IsLower => i32::from(primshim_core::chars::is_lower(c)),
        ClassifierSymbol::IsUpper => i32::from(primshim_core::chars::is_upper(c)),
        ClassifierSymbol::IsAlphanum => i32::from(primshim_core::chars::is_alphanum(c)),
    }
}

fn ratio_percent(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    (numerator as f64 * 100.0) / denominator as f64
}
