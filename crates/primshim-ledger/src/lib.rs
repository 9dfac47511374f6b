//! # primshim-ledger
//!
//! Custody and validation layer for the primshim boundary.
//!
//! The original native primitives trusted their caller never to pass an
//! invalid sequence reference; this crate replaces that trust with explicit
//! bookkeeping. Every sequence the shim allocates is recorded in a ledger,
//! every incoming sequence pointer is classified against it, and a verdict
//! (accept, repair, reject) is produced before any byte is read.
//!
//! Nothing in here dereferences a pointer; the ledger stores addresses and
//! extents only. Enforcement happens in `primshim-abi`.

pub mod config;
pub mod custody;
pub mod policy;
pub mod verdict;

pub use config::{SafetyLevel, safety_level};
pub use custody::{
    CustodyState, SequenceFacts, SequenceLedger, SequenceMeta, classify_sequence,
    classify_sequence_base, global_ledger,
};
pub use policy::{PolicySnapshot, RepairAction, RepairPolicy, global_repair_policy};
pub use verdict::{
    ConsVerdict, Disposition, RejectReason, ReleaseVerdict, decide_cons, decide_release,
    decide_scan_overrun,
};
