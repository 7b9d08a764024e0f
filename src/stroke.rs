//! Timed stroke segments and the gesture descriptor handed to an injector.

use crate::path::StrokePath;

/// Identifies one chain of segments, i.e. one continuous touch contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrokeId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeSegment {
    id: StrokeId,
    path: StrokePath,
    start_delay_ms: u64,
    duration_ms: u64,
    will_continue: bool,
    continuation: bool,
}

impl StrokeSegment {
    /// First segment of a new chain.
    pub fn new(
        id: StrokeId,
        path: StrokePath,
        start_delay_ms: u64,
        duration_ms: u64,
        will_continue: bool,
    ) -> Self {
        Self {
            id,
            path,
            start_delay_ms,
            duration_ms: duration_ms.max(1),
            will_continue,
            continuation: false,
        }
    }

    /// Next segment of the same chain. Only meaningful on a segment with `will_continue` set.
    pub fn continue_stroke(
        &self,
        path: StrokePath,
        start_delay_ms: u64,
        duration_ms: u64,
        will_continue: bool,
    ) -> Self {
        debug_assert!(self.will_continue, "continuing a finished stroke");
        Self {
            id: self.id,
            path,
            start_delay_ms,
            duration_ms: duration_ms.max(1),
            will_continue,
            continuation: true,
        }
    }

    pub fn id(&self) -> StrokeId {
        self.id
    }

    pub fn path(&self) -> &StrokePath {
        &self.path
    }

    pub fn start_delay_ms(&self) -> u64 {
        self.start_delay_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn end_ms(&self) -> u64 {
        self.start_delay_ms + self.duration_ms
    }

    pub fn will_continue(&self) -> bool {
        self.will_continue
    }

    /// True when this segment extends an earlier one rather than opening a contact.
    pub fn is_continuation(&self) -> bool {
        self.continuation
    }
}

/// A finished batch of segments submitted to the injector as one unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gesture {
    strokes: Vec<StrokeSegment>,
}

impl Gesture {
    pub fn new(strokes: Vec<StrokeSegment>) -> Self {
        Self { strokes }
    }

    pub fn strokes(&self) -> &[StrokeSegment] {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn duration_ms(&self) -> u64 {
        self.strokes.iter().map(StrokeSegment::end_ms).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuation_keeps_chain_id() {
        let first = StrokeSegment::new(StrokeId(7), StrokePath::point(1.0, 1.0), 0, 5, true);
        let next = first.continue_stroke(StrokePath::point(2.0, 2.0), 0, 3, false);
        assert_eq!(next.id(), StrokeId(7));
        assert!(next.is_continuation());
        assert!(!next.will_continue());
        assert!(!first.is_continuation());
    }

    #[test]
    fn zero_duration_is_raised_to_one() {
        let s = StrokeSegment::new(StrokeId(1), StrokePath::point(0.0, 0.0), 0, 0, false);
        assert_eq!(s.duration_ms(), 1);
    }

    #[test]
    fn gesture_duration_is_latest_end() {
        let a = StrokeSegment::new(StrokeId(1), StrokePath::point(0.0, 0.0), 0, 10, false);
        let b = StrokeSegment::new(StrokeId(2), StrokePath::point(0.0, 0.0), 5, 20, false);
        assert_eq!(Gesture::new(vec![a, b]).duration_ms(), 25);
        assert_eq!(Gesture::default().duration_ms(), 0);
    }
}
