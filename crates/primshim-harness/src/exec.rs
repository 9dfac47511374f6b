//! Differential execution of fixture cases over the exported boundary.
//!
//! Classifier cases run against the exported symbol and the host libc ctype
//! call; cons cases run against the exported symbol and the safe-core model.
//! Custody scenarios depend on the process safety level, which is pinned at
//! first resolution, so they refuse to execute under a mismatched mode
//! instead of reporting the wrong mode's behavior.

use primshim_abi::driver::{self, ClassifierSymbol};
use primshim_ledger::safety_level;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while executing a fixture case.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("unknown symbol `{0}`")]
    UnknownSymbol(String),
    #[error("unknown {symbol} scenario `{scenario}`")]
    UnknownScenario {
        symbol: &'static str,
        scenario: String,
    },
    #[error("input `{0}` missing")]
    MissingInput(&'static str),
    #[error("input `{0}` must be an integer in 0..=255")]
    InvalidByte(&'static str),
    #[error("input `{field}` out of byte range: {value}")]
    ByteOutOfRange { field: &'static str, value: u64 },
    #[error("input `tail` must be an array of bytes")]
    TailNotArray,
    #[error("tail element `{0}` is not an integer")]
    TailElementNotInteger(String),
    #[error("tail element {0} out of byte range")]
    TailElementOutOfRange(u64),
    #[error("input `tail` must not contain 0 bytes")]
    TailInteriorNul,
    #[error("scenario needs process mode `{requested}`, live mode is `{live}`")]
    ModeMismatch {
        requested: String,
        live: &'static str,
    },
    #[error("staging allocation failed")]
    StagingFailed,
}

/// One host-vs-implementation execution.
#[derive(Debug, Clone)]
pub struct DifferentialRun {
    /// Output produced by the exported boundary.
    pub impl_output: String,
    /// Reference output: host libc for classifiers, safe core for cons.
    pub host_output: String,
    /// Whether the two agreed.
    pub host_parity: bool,
    /// Free-form execution note.
    pub note: Option<String>,
}

/// Execute one fixture case differentially.
///
/// `active_mode` is the mode the runner believes it is testing; scenarios
/// whose outcome depends on the safety level fail loudly when it does not
/// match the live process level.
pub fn execute_fixture_case(
    symbol: &str,
    inputs: &Value,
    active_mode: &str,
) -> Result<DifferentialRun, ExecError> {
    if let Some(classifier) = ClassifierSymbol::from_name(symbol) {
        return run_classifier_case(classifier, inputs);
    }
    match symbol {
        "string_cons" => run_cons_case(inputs, active_mode),
        "string_free" => run_release_case(inputs),
        other => Err(ExecError::UnknownSymbol(other.to_string())),
    }
}

fn run_classifier_case(
    symbol: ClassifierSymbol,
    inputs: &Value,
) -> Result<DifferentialRun, ExecError> {
    let c = byte_field(inputs, "c")?;
    let ours = driver::run_classifier(symbol, c);
    let host = driver::run_host_classifier(symbol, c);
    Ok(DifferentialRun {
        impl_output: ours.to_string(),
        host_output: host.to_string(),
        host_parity: ours == host,
        note: None,
    })
}

fn run_cons_case(inputs: &Value, active_mode: &str) -> Result<DifferentialRun, ExecError> {
    let head = byte_field(inputs, "head")?;

    if let Some(scenario) = inputs.get("scenario").and_then(Value::as_str) {
        require_live_mode(active_mode)?;
        let out = match scenario {
            "released" => driver::run_cons_after_release(head),
            "unterminated" => driver::run_cons_unterminated(head),
            other => {
                return Err(ExecError::UnknownScenario {
                    symbol: "string_cons",
                    scenario: other.to_string(),
                });
            }
        };
        return Ok(scenario_run(scenario, out));
    }

    let tail_value = inputs.get("tail").ok_or(ExecError::MissingInput("tail"))?;
    if tail_value.is_null() {
        require_live_mode(active_mode)?;
        let out = driver::run_cons_null(head);
        return Ok(scenario_run("null_input", out));
    }

    let tail = byte_array(tail_value)?;
    if tail.contains(&0) {
        return Err(ExecError::TailInteriorNul);
    }
    let ours = driver::run_cons(head, &tail);
    let model = primshim_core::seq::cons(head, &tail);
    let impl_output = render_bytes(ours.as_deref());
    let host_output = render_bytes(Some(&model));
    Ok(DifferentialRun {
        host_parity: impl_output == host_output,
        impl_output,
        host_output,
        note: None,
    })
}

fn run_release_case(inputs: &Value) -> Result<DifferentialRun, ExecError> {
    let scenario = inputs
        .get("scenario")
        .and_then(Value::as_str)
        .ok_or(ExecError::MissingInput("scenario"))?;
    let outcome = match scenario {
        "null" => {
            driver::run_release_null();
            "absorbed"
        }
        "foreign" => {
            driver::run_release_foreign();
            "absorbed"
        }
        "double" => {
            driver::run_release_double();
            "absorbed"
        }
        "valid" => {
            if driver::run_cons(b'q', b"").is_none() {
                return Err(ExecError::StagingFailed);
            }
            "released"
        }
        other => {
            return Err(ExecError::UnknownScenario {
                symbol: "string_free",
                scenario: other.to_string(),
            });
        }
    };
    Ok(DifferentialRun {
        impl_output: outcome.to_string(),
        host_output: outcome.to_string(),
        host_parity: true,
        note: None,
    })
}

/// Custody scenarios reject through the boundary; the reference outcome is
/// always the null return of a strict rejection.
fn scenario_run(scenario: &str, out: Option<Vec<u8>>) -> DifferentialRun {
    DifferentialRun {
        impl_output: render_bytes(out.as_deref()),
        host_output: String::from("null"),
        host_parity: out.is_none(),
        note: Some(format!("custody scenario `{scenario}`")),
    }
}

fn require_live_mode(requested: &str) -> Result<(), ExecError> {
    let live = safety_level().as_str();
    if requested.eq_ignore_ascii_case(live) {
        Ok(())
    } else {
        Err(ExecError::ModeMismatch {
            requested: requested.to_string(),
            live,
        })
    }
}

fn byte_field(inputs: &Value, key: &'static str) -> Result<u8, ExecError> {
    let raw = inputs
        .get(key)
        .and_then(Value::as_u64)
        .ok_or(ExecError::InvalidByte(key))?;
    u8::try_from(raw).map_err(|_| ExecError::ByteOutOfRange {
        field: key,
        value: raw,
    })
}

fn byte_array(value: &Value) -> Result<Vec<u8>, ExecError> {
    let items = value.as_array().ok_or(ExecError::TailNotArray)?;
    items
        .iter()
        .map(|item| {
            let raw = item
                .as_u64()
                .ok_or_else(|| ExecError::TailElementNotInteger(item.to_string()))?;
            u8::try_from(raw).map_err(|_| ExecError::TailElementOutOfRange(raw))
        })
        .collect()
}

fn render_bytes(bytes: Option<&[u8]>) -> String {
    match bytes {
        Some(b) => format!("{b:?}"),
        None => String::from("null"),
    }
}
