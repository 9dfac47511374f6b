//! Boundary decision logic for sequence operations.
//!
//! Every ABI call that touches a sequence pointer asks this module for a
//! verdict before doing anything with the pointer. Invalid input yields an
//! explicit failure return (strict) or a counted deterministic repair
//! (hardened), never undefined behavior.

use crate::config::SafetyLevel;
use crate::custody::{CustodyState, SequenceFacts};
use crate::policy::RepairAction;

/// Decision disposition for a boundary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Operation proceeds as requested.
    Accept,
    /// Operation proceeds with a counted repair applied.
    Heal,
    /// Operation fails with an explicit error return.
    Reject,
}

/// Why an operation was rejected, or would have been absent a repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No rejection.
    None,
    /// Input sequence pointer was null.
    NullSequence,
    /// Input sequence was shim-owned and already released.
    ReleasedSequence,
    /// No terminator found within the known extent of the sequence.
    UnterminatedSequence,
}

impl RejectReason {
    /// Stable label used in reports and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::NullSequence => "null_sequence",
            Self::ReleasedSequence => "released_sequence",
            Self::UnterminatedSequence => "unterminated_sequence",
        }
    }
}

/// Result of boundary policy evaluation for a cons-style read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsVerdict {
    /// Decision disposition.
    pub disposition: Disposition,
    /// Repair to apply when disposition is Heal.
    pub repair: RepairAction,
    /// Decision rationale.
    pub reason: RejectReason,
}

impl ConsVerdict {
    #[must_use]
    fn accept() -> Self {
        Self {
            disposition: Disposition::Accept,
            repair: RepairAction::None,
            reason: RejectReason::None,
        }
    }

    #[must_use]
    fn heal(repair: RepairAction, reason: RejectReason) -> Self {
        Self {
            disposition: Disposition::Heal,
            repair,
            reason,
        }
    }

    #[must_use]
    fn reject(reason: RejectReason) -> Self {
        Self {
            disposition: Disposition::Reject,
            repair: RepairAction::None,
            reason,
        }
    }
}

/// Decide policy for reading an input sequence during cons.
///
/// Null short-circuits in every mode: no verdict ever instructs the caller
/// to dereference null, even with validation off. Custody is consulted only
/// in validating modes.
#[must_use]
pub fn decide_cons(facts: SequenceFacts, level: SafetyLevel) -> ConsVerdict {
    if facts.addr == 0 {
        return if level.repairs_enabled() {
            ConsVerdict::heal(RepairAction::SubstituteEmpty, RejectReason::NullSequence)
        } else {
            ConsVerdict::reject(RejectReason::NullSequence)
        };
    }

    if !level.validation_enabled() {
        return ConsVerdict::accept();
    }

    match facts.custody {
        // Content of a released buffer is gone; substituting for it would
        // fabricate data, so both validating modes reject.
        CustodyState::Released => ConsVerdict::reject(RejectReason::ReleasedSequence),
        CustodyState::Live | CustodyState::Unknown => ConsVerdict::accept(),
    }
}

/// Decide policy when a terminator scan exhausts its bound.
///
/// For a shim-owned sequence the bound is the recorded extent, so hitting it
/// means the buffer holds no terminator. Hardened mode truncates the scan at
/// the bound; strict mode fails the operation.
#[must_use]
pub fn decide_scan_overrun(level: SafetyLevel) -> ConsVerdict {
    if level.repairs_enabled() {
        ConsVerdict::heal(RepairAction::TruncateScan, RejectReason::UnterminatedSequence)
    } else {
        ConsVerdict::reject(RejectReason::UnterminatedSequence)
    }
}

/// Result of boundary policy evaluation for a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseVerdict {
    /// Live shim-owned base address: mark released and deallocate.
    Proceed,
    /// Null release is a no-op.
    IgnoreNull,
    /// Address is not a ledger base; never handed to the allocator.
    IgnoreForeign,
    /// Ledger shows this sequence already released.
    IgnoreDouble,
}

/// Decide policy for releasing a sequence.
///
/// `facts` must come from base classification, not containment: an interior
/// pointer of a live sequence is a foreign release. Misuse is ignored and
/// counted in every mode; release validation has no strict/hardened split
/// because proceeding would corrupt the allocator.
#[must_use]
pub fn decide_release(facts: SequenceFacts) -> ReleaseVerdict {
    if facts.addr == 0 {
        return ReleaseVerdict::IgnoreNull;
    }

    match facts.custody {
        CustodyState::Live => ReleaseVerdict::Proceed,
        CustodyState::Released => ReleaseVerdict::IgnoreDouble,
        CustodyState::Unknown => ReleaseVerdict::IgnoreForeign,
    }
}
