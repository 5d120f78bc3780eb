//! Frame tracker
//!
//! Records the base pointer of every open activation record, in call order.
//! The machine never consults it for control decisions; it exists so traces
//! can mark where each frame begins.

use super::Addr;
use rustc_hash::FxHashSet;

/// Base pointers of the currently open activation records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameTracker {
    bases: Vec<Addr>,
}

impl FrameTracker {
    pub fn new() -> Self {
        FrameTracker { bases: Vec::new() }
    }

    /// Record a frame opened by CAL
    pub fn push(&mut self, base: Addr) {
        self.bases.push(base);
    }

    /// Forget the most recent frame on RTN
    ///
    /// A return with no recorded frame (leaving the outermost block) is a no-op.
    pub fn pop(&mut self) -> Option<Addr> {
        self.bases.pop()
    }

    /// Current call-nesting depth
    pub fn depth(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Recorded bases, outermost first
    pub fn bases(&self) -> &[Addr] {
        &self.bases
    }

    /// Set of boundaries for repeated lookups while rendering
    pub fn boundary_set(&self) -> FxHashSet<Addr> {
        self.bases.iter().copied().collect()
    }
}
