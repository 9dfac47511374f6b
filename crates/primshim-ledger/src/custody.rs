//! Sequence custody ledger.
//!
//! Tracks every sequence the shim itself allocates, keyed by base address.
//! Host-owned input sequences never enter the ledger; they classify as
//! [`CustodyState::Unknown`] and are accepted as-is. The ledger exists to
//! catch misuse of shim-owned sequences: release of a foreign address,
//! double release, and cons from an already-released buffer.

use std::collections::HashMap;
use std::ffi::c_void;
use std::sync::OnceLock;

use parking_lot::RwLock;

/// Custody state of a sequence address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustodyState {
    /// Address has no ledger entry. Host-owned or stack memory.
    Unknown,
    /// Shim-owned sequence, currently live.
    Live,
    /// Shim-owned sequence that has been released.
    Released,
}

/// Metadata for a tracked sequence allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceMeta {
    /// Base address of the tracked buffer.
    pub base: usize,
    /// Total buffer length in bytes, terminator included.
    pub len: usize,
    /// Generation counter; bumps when the allocator reuses this address.
    pub generation: u64,
    /// Current custody state.
    pub state: CustodyState,
}

impl SequenceMeta {
    /// Returns true if `addr` lies inside `[base, base + len)`.
    #[must_use]
    pub fn contains(self, addr: usize) -> bool {
        let end = self.base.saturating_add(self.len);
        (self.base..end).contains(&addr)
    }

    /// Remaining bytes from `addr` to the end of the buffer.
    #[must_use]
    pub fn remaining(self, addr: usize) -> Option<usize> {
        if !self.contains(addr) {
            return None;
        }
        Some(self.base.saturating_add(self.len).saturating_sub(addr))
    }
}

/// Derived facts about an arbitrary sequence pointer under ledger metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceFacts {
    /// Raw pointer address.
    pub addr: usize,
    /// Custody classification.
    pub custody: CustodyState,
    /// Remaining in-bounds bytes if known.
    pub remaining: Option<usize>,
}

impl SequenceFacts {
    /// Facts for an address with no ledger entry.
    #[must_use]
    pub fn unknown(addr: usize) -> Self {
        Self {
            addr,
            custody: CustodyState::Unknown,
            remaining: None,
        }
    }
}

/// Concurrent ledger of shim-owned sequence allocations.
///
/// Released entries stay in the map as tombstones so double release and
/// use-after-release stay detectable until the address is reused.
#[derive(Debug, Default)]
pub struct SequenceLedger {
    sequences: RwLock<HashMap<usize, SequenceMeta>>,
}

impl SequenceLedger {
    /// Create a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fresh shim-owned sequence. If the allocator handed back an
    /// address with a prior entry, the generation counter bumps so the stale
    /// entry cannot be confused with the new one.
    pub fn record(&self, base: *mut c_void, len: usize) -> u64 {
        let base_addr = base as usize;
        let mut sequences = self.sequences.write();
        let generation = sequences
            .get(&base_addr)
            .map_or(1, |prior| prior.generation.saturating_add(1));
        sequences.insert(
            base_addr,
            SequenceMeta {
                base: base_addr,
                len,
                generation,
                state: CustodyState::Live,
            },
        );
        generation
    }

    /// Mark a tracked sequence as released. No-op for untracked addresses.
    pub fn mark_released(&self, base: *mut c_void) {
        let base_addr = base as usize;
        if let Some(meta) = self.sequences.write().get_mut(&base_addr) {
            meta.state = CustodyState::Released;
        }
    }

    /// Look up the entry whose base is exactly `ptr`, if any.
    ///
    /// Release decisions use this: only an exact base address may be handed
    /// back to the allocator.
    #[must_use]
    pub fn lookup_base(&self, ptr: *const c_void) -> Option<SequenceMeta> {
        self.sequences.read().get(&(ptr as usize)).copied()
    }

    /// Look up the entry containing `ptr`, if any. Interior pointers match.
    #[must_use]
    pub fn lookup_containing(&self, ptr: *const c_void) -> Option<SequenceMeta> {
        let addr = ptr as usize;
        let sequences = self.sequences.read();
        sequences.values().copied().find(|meta| meta.contains(addr))
    }
}

static GLOBAL_LEDGER: OnceLock<SequenceLedger> = OnceLock::new();

/// Global sequence custody ledger.
#[must_use]
pub fn global_ledger() -> &'static SequenceLedger {
    GLOBAL_LEDGER.get_or_init(SequenceLedger::new)
}

/// Classify an arbitrary sequence pointer under ledger facts.
#[must_use]
pub fn classify_sequence(ledger: &SequenceLedger, ptr: *const c_void) -> SequenceFacts {
    let addr = ptr as usize;
    if ptr.is_null() {
        return SequenceFacts::unknown(0);
    }

    match ledger.lookup_containing(ptr) {
        Some(meta) => SequenceFacts {
            addr,
            custody: meta.state,
            remaining: meta.remaining(addr),
        },
        None => SequenceFacts::unknown(addr),
    }
}

/// Classify a pointer for release, matching on exact base address only.
///
/// An interior pointer of a live sequence is still a foreign release: it is
/// not an address the allocator handed out, so it classifies Unknown here.
#[must_use]
pub fn classify_sequence_base(ledger: &SequenceLedger, ptr: *const c_void) -> SequenceFacts {
    let addr = ptr as usize;
    if ptr.is_null() {
        return SequenceFacts::unknown(0);
    }

    match ledger.lookup_base(ptr) {
        Some(meta) => SequenceFacts {
            addr,
            custody: meta.state,
            remaining: meta.remaining(addr),
        },
        None => SequenceFacts::unknown(addr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_unknown_when_untracked() {
        let ledger = SequenceLedger::new();
        let local = 7_u8;
        let facts = classify_sequence(&ledger, (&local as *const u8).cast::<c_void>());
        assert_eq!(facts.custody, CustodyState::Unknown);
        assert_eq!(facts.remaining, None);
    }

    #[test]
    fn classify_null_uses_zero_address() {
        let ledger = SequenceLedger::new();
        let facts = classify_sequence(&ledger, std::ptr::null());
        assert_eq!(facts.addr, 0);
        assert_eq!(facts.custody, CustodyState::Unknown);
    }

    #[test]
    fn classify_live_when_tracked() {
        let ledger = SequenceLedger::new();
        let mut buf = vec![0_u8; 16];
        ledger.record(buf.as_mut_ptr().cast::<c_void>(), buf.len());

        let ptr = buf.as_ptr().wrapping_add(4).cast::<c_void>();
        let facts = classify_sequence(&ledger, ptr);

        assert_eq!(facts.custody, CustodyState::Live);
        assert_eq!(facts.remaining, Some(12));
    }

    #[test]
    fn release_flips_state_and_keeps_tombstone() {
        let ledger = SequenceLedger::new();
        let mut buf = vec![0_u8; 8];
        let base = buf.as_mut_ptr().cast::<c_void>();
        ledger.record(base, buf.len());
        ledger.mark_released(base);

        let meta = ledger.lookup_base(base).unwrap();
        assert_eq!(meta.state, CustodyState::Released);

        let facts = classify_sequence(&ledger, base);
        assert_eq!(facts.custody, CustodyState::Released);
    }

    #[test]
    fn record_at_reused_address_bumps_generation() {
        let ledger = SequenceLedger::new();
        let mut buf = vec![0_u8; 8];
        let base = buf.as_mut_ptr().cast::<c_void>();

        let first = ledger.record(base, buf.len());
        ledger.mark_released(base);
        let second = ledger.record(base, buf.len());

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(ledger.lookup_base(base).unwrap().state, CustodyState::Live);
    }

    #[test]
    fn lookup_base_rejects_interior_pointer() {
        let ledger = SequenceLedger::new();
        let mut buf = vec![0_u8; 8];
        let base = buf.as_mut_ptr().cast::<c_void>();
        ledger.record(base, buf.len());

        let interior = buf.as_ptr().wrapping_add(2).cast::<c_void>();
        assert!(ledger.lookup_base(interior).is_none());
        assert!(ledger.lookup_containing(interior).is_some());
    }

    #[test]
    fn base_classification_treats_interior_pointer_as_unknown() {
        let ledger = SequenceLedger::new();
        let mut buf = vec![0_u8; 8];
        let base = buf.as_mut_ptr().cast::<c_void>();
        ledger.record(base, buf.len());

        let interior = buf.as_ptr().wrapping_add(2).cast::<c_void>();
        assert_eq!(
            classify_sequence_base(&ledger, interior).custody,
            CustodyState::Unknown
        );
        assert_eq!(
            classify_sequence_base(&ledger, base).custody,
            CustodyState::Live
        );
    }

    #[test]
    fn meta_bounds_arithmetic() {
        let meta = SequenceMeta {
            base: 100,
            len: 10,
            generation: 1,
            state: CustodyState::Live,
        };
        assert!(meta.contains(100));
        assert!(meta.contains(109));
        assert!(!meta.contains(110));
        assert_eq!(meta.remaining(100), Some(10));
        assert_eq!(meta.remaining(109), Some(1));
        assert_eq!(meta.remaining(110), None);
    }
}
