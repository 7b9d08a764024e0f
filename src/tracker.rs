//! Per-slot pointer tracking for the gesture assembler.

use crate::path::Point;
use crate::stroke::StrokeSegment;

/// Whether a slot currently owns an unterminated stroke in the pending batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum StrokeState {
    #[default]
    Idle,
    Open(StrokeSegment),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerSlot {
    pub pos: Point,
    pub time_ms: i64,
    pub stroke: StrokeState,
}

impl PointerSlot {
    pub fn is_open(&self) -> bool {
        matches!(self.stroke, StrokeState::Open(_))
    }

    /// Detach the open segment, leaving the slot idle.
    pub(crate) fn take_open(&mut self) -> Option<StrokeSegment> {
        match std::mem::take(&mut self.stroke) {
            StrokeState::Open(sd) => Some(sd),
            StrokeState::Idle => None,
        }
    }
}

/// Slots are indexed by pointer index within a frame, not by a stable contact id.
#[derive(Debug)]
pub struct PointerTracker {
    slots: Vec<PointerSlot>,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerTracker {
    pub fn new() -> Self {
        Self {
            slots: vec![PointerSlot::default()],
        }
    }

    /// Grow to at least `n` slots. Existing slots are preserved; capacity never shrinks.
    pub fn ensure_capacity(&mut self, n: usize) {
        if n > self.slots.len() {
            self.slots.resize_with(n, PointerSlot::default);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, idx: usize) -> Option<&PointerSlot> {
        self.slots.get(idx)
    }

    pub fn slot_mut(&mut self, idx: usize) -> Option<&mut PointerSlot> {
        self.slots.get_mut(idx)
    }

    pub fn open_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_open()).count()
    }
}
