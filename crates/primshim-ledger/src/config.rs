//! Runtime mode configuration.
//!
//! The runtime mode is set via the `PRIMSHIM_MODE` environment variable:
//! - `strict` (default): invalid sequence arguments are rejected with an
//!   explicit failure return. The ledger validates but never rewrites an
//!   operation.
//! - `hardened`: the ledger validates AND applies deterministic repairs for
//!   invalid input (substitute an empty sequence, truncate an unterminated
//!   scan). Opt-in behavior that deviates from the original call contract
//!   where safety requires it.
//! - `off`: no validation. Pure passthrough for benchmarking baseline only.

use std::sync::atomic::{AtomicU8, Ordering};

/// Runtime operating mode for boundary validation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafetyLevel {
    /// Strict boundary behavior. Invalid input produces an explicit failure
    /// return, never a silent repair.
    #[default]
    Strict,
    /// Repair mode. Deterministic repairs are applied for invalid input and
    /// every repair is counted.
    Hardened,
    /// No validation. Pure passthrough for benchmarking baseline.
    Off,
}

impl SafetyLevel {
    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "strict" | "default" => Self::Strict,
            "hardened" | "repair" => Self::Hardened,
            "off" | "none" | "disabled" => Self::Off,
            _ => Self::Strict,
        }
    }

    /// Stable label used in reports and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Hardened => "hardened",
            Self::Off => "off",
        }
    }

    /// Returns true if the boundary should apply repair actions.
    #[must_use]
    pub const fn repairs_enabled(self) -> bool {
        matches!(self, Self::Hardened)
    }

    /// Returns true if validation is active.
    #[must_use]
    pub const fn validation_enabled(self) -> bool {
        !matches!(self, Self::Off)
    }
}

// Atomic cache: 0=unresolved, 1=Strict, 2=Hardened, 3=Off, 255=resolving.
// A non-blocking state machine instead of OnceLock keeps the classifier hot
// path lock-free and gives concurrent callers during env resolution a safe
// Strict default instead of a blocked thread.
static CACHED_LEVEL: AtomicU8 = AtomicU8::new(0);

const LEVEL_UNRESOLVED: u8 = 0;
const LEVEL_STRICT: u8 = 1;
const LEVEL_HARDENED: u8 = 2;
const LEVEL_OFF: u8 = 3;
const LEVEL_RESOLVING: u8 = 255;

fn parse_runtime_mode_env(raw: &str) -> SafetyLevel {
    match raw.to_ascii_lowercase().as_str() {
        "strict" | "default" => SafetyLevel::Strict,
        "hardened" | "repair" => SafetyLevel::Hardened,
        // Runtime contract is strict|hardened only. Keep benchmark-only `Off`
        // reachable via direct API use in bench code, not env parsing.
        _ => SafetyLevel::Strict,
    }
}

fn level_to_u8(level: SafetyLevel) -> u8 {
    match level {
        SafetyLevel::Strict => LEVEL_STRICT,
        SafetyLevel::Hardened => LEVEL_HARDENED,
        SafetyLevel::Off => LEVEL_OFF,
    }
}

fn u8_to_level(v: u8) -> SafetyLevel {
    match v {
        LEVEL_HARDENED => SafetyLevel::Hardened,
        LEVEL_OFF => SafetyLevel::Off,
        _ => SafetyLevel::Strict,
    }
}

/// Get the configured safety level (reads env var on first call, caches
/// thereafter).
///
/// Host runtimes may call shim functions from several threads during startup;
/// a call that arrives while another thread resolves the env var observes the
/// RESOLVING state and returns Strict as the safe default.
#[must_use]
pub fn safety_level() -> SafetyLevel {
    let cached = CACHED_LEVEL.load(Ordering::Relaxed);

    // Fast path: already resolved.
    if cached != LEVEL_UNRESOLVED && cached != LEVEL_RESOLVING {
        return u8_to_level(cached);
    }

    // Concurrent call during resolution: return Strict (safe default).
    if cached == LEVEL_RESOLVING {
        return SafetyLevel::Strict;
    }

    // Try to claim the resolution slot.
    if CACHED_LEVEL
        .compare_exchange(
            LEVEL_UNRESOLVED,
            LEVEL_RESOLVING,
            Ordering::SeqCst,
            Ordering::Relaxed,
        )
        .is_err()
    {
        // Another thread claimed it. Return Strict until resolved.
        let v = CACHED_LEVEL.load(Ordering::Relaxed);
        return if v != LEVEL_UNRESOLVED && v != LEVEL_RESOLVING {
            u8_to_level(v)
        } else {
            SafetyLevel::Strict
        };
    }

    // We own the resolution.
    let level = std::env::var("PRIMSHIM_MODE")
        .map(|v| parse_runtime_mode_env(&v))
        .unwrap_or_default();
    CACHED_LEVEL.store(level_to_u8(level), Ordering::Release);
    level
}
