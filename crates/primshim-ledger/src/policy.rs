//! Repair accounting.
//!
//! When the boundary detects an invalid operation it either fails loudly
//! (strict) or applies a deterministic repair (hardened). Both outcomes are
//! counted here so the conformance harness can assert that nothing was
//! repaired or rejected silently.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::verdict::RejectReason;

/// Repairs the boundary can apply to an invalid operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepairAction {
    /// Substitute the empty sequence for a null input pointer.
    SubstituteEmpty,
    /// Truncate a terminator scan at the recorded extent of the buffer.
    TruncateScan,
    /// Ignore a release of an already-released sequence.
    IgnoreDoubleRelease,
    /// Ignore a release of an address the shim does not own.
    IgnoreForeignRelease,
    /// No repair; operation was valid or rejected outright.
    None,
}

impl RepairAction {
    /// Returns true if this action is an actual repair (not None).
    #[must_use]
    pub const fn is_repair(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Stable label used in reports and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SubstituteEmpty => "substitute_empty",
            Self::TruncateScan => "truncate_scan",
            Self::IgnoreDoubleRelease => "ignore_double_release",
            Self::IgnoreForeignRelease => "ignore_foreign_release",
            Self::None => "none",
        }
    }
}

/// Atomic counters for every repair and reject the boundary performs.
pub struct RepairPolicy {
    /// Total repairs applied.
    pub total_repairs: AtomicU64,
    /// Empty-sequence substitutions for null input.
    pub substituted_empties: AtomicU64,
    /// Terminator scans truncated at the recorded extent.
    pub truncated_scans: AtomicU64,
    /// Double releases ignored.
    pub double_releases: AtomicU64,
    /// Foreign releases ignored.
    pub foreign_releases: AtomicU64,
    /// Total explicit rejections.
    pub total_rejects: AtomicU64,
    /// Rejections for null input.
    pub null_rejects: AtomicU64,
    /// Rejections for released input.
    pub released_rejects: AtomicU64,
    /// Rejections for missing terminator.
    pub unterminated_rejects: AtomicU64,
}

impl RepairPolicy {
    /// Create a new policy with zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total_repairs: AtomicU64::new(0),
            substituted_empties: AtomicU64::new(0),
            truncated_scans: AtomicU64::new(0),
            double_releases: AtomicU64::new(0),
            foreign_releases: AtomicU64::new(0),
            total_rejects: AtomicU64::new(0),
            null_rejects: AtomicU64::new(0),
            released_rejects: AtomicU64::new(0),
            unterminated_rejects: AtomicU64::new(0),
        }
    }

    /// Record a repair action.
    pub fn record_repair(&self, action: RepairAction) {
        if action.is_repair() {
            self.total_repairs.fetch_add(1, Ordering::Relaxed);
        }

        match action {
            RepairAction::SubstituteEmpty => {
                self.substituted_empties.fetch_add(1, Ordering::Relaxed);
            }
            RepairAction::TruncateScan => {
                self.truncated_scans.fetch_add(1, Ordering::Relaxed);
            }
            RepairAction::IgnoreDoubleRelease => {
                self.double_releases.fetch_add(1, Ordering::Relaxed);
            }
            RepairAction::IgnoreForeignRelease => {
                self.foreign_releases.fetch_add(1, Ordering::Relaxed);
            }
            RepairAction::None => {}
        }
    }

    /// Record an explicit rejection.
    pub fn record_reject(&self, reason: RejectReason) {
        if !matches!(reason, RejectReason::None) {
            self.total_rejects.fetch_add(1, Ordering::Relaxed);
        }

        match reason {
            RejectReason::NullSequence => {
                self.null_rejects.fetch_add(1, Ordering::Relaxed);
            }
            RejectReason::ReleasedSequence => {
                self.released_rejects.fetch_add(1, Ordering::Relaxed);
            }
            RejectReason::UnterminatedSequence => {
                self.unterminated_rejects.fetch_add(1, Ordering::Relaxed);
            }
            RejectReason::None => {}
        }
    }

    /// Plain-value snapshot of all counters for reports.
    #[must_use]
    pub fn snapshot(&self) -> PolicySnapshot {
        PolicySnapshot {
            total_repairs: self.total_repairs.load(Ordering::Relaxed),
            substituted_empties: self.substituted_empties.load(Ordering::Relaxed),
            truncated_scans: self.truncated_scans.load(Ordering::Relaxed),
            double_releases: self.double_releases.load(Ordering::Relaxed),
            foreign_releases: self.foreign_releases.load(Ordering::Relaxed),
            total_rejects: self.total_rejects.load(Ordering::Relaxed),
            null_rejects: self.null_rejects.load(Ordering::Relaxed),
            released_rejects: self.released_rejects.load(Ordering::Relaxed),
            unterminated_rejects: self.unterminated_rejects.load(Ordering::Relaxed),
        }
    }
}

impl Default for RepairPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time counter values, embedded in conformance reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySnapshot {
    pub total_repairs: u64,
    pub substituted_empties: u64,
    pub truncated_scans: u64,
    pub double_releases: u64,
    pub foreign_releases: u64,
    pub total_rejects: u64,
    pub null_rejects: u64,
    pub released_rejects: u64,
    pub unterminated_rejects: u64,
}

/// Global repair policy instance.
static GLOBAL_POLICY: RepairPolicy = RepairPolicy::new();

/// Access the global repair policy.
#[must_use]
pub fn global_repair_policy() -> &'static RepairPolicy {
    &GLOBAL_POLICY
}
