//! Turns pointer samples into batches of timed strokes.
//!
//! Each pointer slot is either idle or owns an open stroke chain. Downs open a chain, moves
//! extend it and ups close it. Everything produced while handling one frame is collected in a
//! pending batch which is flushed to the injector as a single gesture.

use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};
use std::ops::Range;

use crate::actions::Injector;
use crate::config::Timing;
use crate::error::DispatchError;
use crate::path::{Point, StrokePath};
use crate::stroke::{Gesture, StrokeId, StrokeSegment};
use crate::tracker::{PointerTracker, StrokeState};

/// Action of a motion frame as reported by the input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionAction {
    Down,
    Up,
    Move,
    PointerDown,
    PointerUp,
    Other(i32),
}

impl MotionAction {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Down,
            1 => Self::Up,
            2 => Self::Move,
            5 => Self::PointerDown,
            6 => Self::PointerUp,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Down => 0,
            Self::Up => 1,
            Self::Move => 2,
            Self::PointerDown => 5,
            Self::PointerUp => 6,
            Self::Other(c) => c,
        }
    }
}

/// What a single pointer does to its stroke chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeAction {
    Down,
    Up,
    Move,
}

impl TryFrom<MotionAction> for StrokeAction {
    type Error = MotionAction;

    fn try_from(a: MotionAction) -> Result<Self, Self::Error> {
        match a {
            MotionAction::Down => Ok(Self::Down),
            MotionAction::Up => Ok(Self::Up),
            MotionAction::Move => Ok(Self::Move),
            other => Err(other),
        }
    }
}

/// One multi-touch frame: every pointer currently down, in pointer-index order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionFrame {
    #[serde(deserialize_with = "deserialize_action")]
    pub action: MotionAction,
    /// Pointer that changed state for `PointerDown`/`PointerUp`.
    #[serde(default)]
    pub action_index: usize,
    pub down_time: i64,
    pub event_time: i64,
    pub pointers: Vec<Point>,
}

// Recordings may carry either the named action or the raw action code.
fn deserialize_action<'de, D>(de: D) -> Result<MotionAction, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Code(i32),
        Named(MotionAction),
    }
    Ok(match Repr::deserialize(de)? {
        Repr::Code(c) => MotionAction::from_code(c),
        Repr::Named(a) => a,
    })
}

impl MotionFrame {
    /// Pointers handled for this frame and the action applied to each of them.
    fn targets(&self) -> (MotionAction, Range<usize>) {
        let cnt = self.pointers.len();
        match self.action {
            MotionAction::PointerDown | MotionAction::PointerUp => {
                let idx = self.action_index.min(cnt);
                let action = if self.action == MotionAction::PointerDown {
                    MotionAction::Down
                } else {
                    MotionAction::Up
                };
                (action, idx..(idx + 1).min(cnt))
            }
            a => (a, 0..cnt),
        }
    }
}

fn is_sentinel(p: Point) -> bool {
    p.x < 0.0 || p.y < 0.0
}

/// Clamp a timestamp delta into `1..=max_ms`.
pub fn clamp_duration(delta_ms: i64, max_ms: u64) -> u64 {
    let max = i64::try_from(max_ms).unwrap_or(i64::MAX).max(1);
    delta_ms.clamp(1, max) as u64
}

fn next_id(counter: &mut u64) -> StrokeId {
    *counter += 1;
    StrokeId(*counter)
}

/// Not reentrant: one instance per input-delivery session, driven from a single thread.
pub struct GestureAssembler<I: Injector> {
    timing: Timing,
    tracker: PointerTracker,
    batch: Vec<StrokeSegment>,
    injector: I,
    stroke_ids: u64,
}

impl<I: Injector> GestureAssembler<I> {
    pub fn new(timing: Timing, injector: I) -> Self {
        Self {
            timing,
            tracker: PointerTracker::new(),
            batch: Vec::new(),
            injector,
            stroke_ids: 0,
        }
    }

    pub fn tracker(&self) -> &PointerTracker {
        &self.tracker
    }

    pub fn pending(&self) -> &[StrokeSegment] {
        &self.batch
    }

    pub fn injector(&self) -> &I {
        &self.injector
    }

    /// Route every valid sample of a frame to its pointer slot, then flush whatever was produced.
    pub fn process_frame(&mut self, frame: &MotionFrame) -> Result<(), DispatchError> {
        let cnt = frame.pointers.len();
        let complete_prev = cnt > 1
            && frame.action == MotionAction::Move
            && self.crosses_merge_window(frame.event_time);

        self.tracker.ensure_capacity(cnt);

        let (action, range) = frame.targets();
        for idx in range {
            let p = frame.pointers[idx];
            if is_sentinel(p) {
                continue;
            }
            self.build_stroke(
                idx,
                action,
                frame.down_time,
                frame.event_time,
                p,
                complete_prev,
            )?;
        }

        if self.batch.is_empty() {
            Ok(())
        } else {
            self.flush()
        }
    }

    /// Single synthetic pointer on slot 0, flushed immediately.
    pub fn process_single_point(
        &mut self,
        down_time: i64,
        event_time: i64,
        action: MotionAction,
        x: f32,
        y: f32,
    ) -> Result<(), DispatchError> {
        let p = Point::new(x, y);
        if is_sentinel(p) {
            return Ok(());
        }
        self.build_stroke(0, action, down_time, event_time, p, false)?;
        self.flush()
    }

    /// Submit the pending batch as one gesture. The batch is cleared even when rejected.
    pub fn flush(&mut self) -> Result<(), DispatchError> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let gesture = Gesture::new(std::mem::take(&mut self.batch));
        self.submit(gesture)
    }

    /// One-point tap, submitted on its own without touching the pending batch.
    pub fn dispatch_tap(&mut self, x: f32, y: f32) -> Result<(), DispatchError> {
        let id = next_id(&mut self.stroke_ids);
        let sd = StrokeSegment::new(id, StrokePath::point(x, y), 0, self.timing.tap_ms, false);
        self.submit(Gesture::new(vec![sd]))
    }

    /// Two-finger spread (`diff > 0`) or pinch around `(x, y)`.
    pub fn dispatch_scale(&mut self, x: f32, y: f32, diff: f32) -> Result<(), DispatchError> {
        let dur = self.timing.scale_ms;
        let off = self.timing.scale_offset;
        let (a, b) = if diff > 0.0 {
            (
                StrokePath::line(Point::new(x, y), Point::new(x - diff, y)),
                StrokePath::line(Point::new(x + off, y), Point::new(x + diff + off, y)),
            )
        } else {
            (
                StrokePath::line(Point::new(x + diff, y), Point::new(x, y)),
                StrokePath::line(Point::new(x - diff + off, y), Point::new(x + off, y)),
            )
        };
        for path in [a, b] {
            let id = next_id(&mut self.stroke_ids);
            self.batch.push(StrokeSegment::new(id, path, 0, dur, false));
        }
        self.flush()
    }

    fn submit(&mut self, gesture: Gesture) -> Result<(), DispatchError> {
        let strokes = gesture.len();
        if self.injector.inject(gesture) {
            Ok(())
        } else {
            warn!("gesture with {strokes} strokes was not accepted");
            Err(DispatchError::Rejected { strokes })
        }
    }

    /// Whether a multi-pointer move at `event_time` starts a new gesture.
    fn crosses_merge_window(&mut self, event_time: i64) -> bool {
        let window = i64::try_from(self.timing.merge_window_ms).unwrap_or(i64::MAX);
        let Some(first) = self.tracker.slot_mut(0) else {
            return false;
        };
        let diff = event_time.saturating_sub(first.time_ms);
        if diff >= window {
            return true;
        }
        if diff < 0 {
            // clock went backwards
            first.time_ms = event_time;
        }
        false
    }

    /// Advance slot `idx`'s stroke chain and append the produced segment to the batch.
    pub(crate) fn build_stroke(
        &mut self,
        idx: usize,
        action: MotionAction,
        down_time: i64,
        event_time: i64,
        at: Point,
        complete_prev: bool,
    ) -> Result<(), DispatchError> {
        let action = StrokeAction::try_from(action).map_err(|a| {
            debug!("unable to dispatch event with action {}", a.code());
            DispatchError::UnrecognizedAction(a)
        })?;
        let max = self.timing.max_stroke_ms;
        let Some(p) = self.tracker.slot_mut(idx) else {
            return Ok(());
        };

        let sd = match action {
            StrokeAction::Down => {
                p.pos = at;
                p.time_ms = event_time;
                let dur = clamp_duration(event_time.saturating_sub(down_time), max);
                let id = next_id(&mut self.stroke_ids);
                let sd = StrokeSegment::new(id, StrokePath::point(at.x, at.y), 0, dur, true);
                p.stroke = StrokeState::Open(sd.clone());
                sd
            }
            StrokeAction::Up => {
                let Some(open) = p.take_open() else {
                    return Ok(());
                };
                let dur = clamp_duration(event_time.saturating_sub(p.time_ms), max);
                open.continue_stroke(StrokePath::line(p.pos, at), 0, dur, false)
            }
            StrokeAction::Move => {
                let path = StrokePath::line(p.pos, at);
                let dur = clamp_duration(event_time.saturating_sub(p.time_ms), max);
                p.pos = at;
                p.time_ms = event_time;
                match p.take_open() {
                    None => {
                        let id = next_id(&mut self.stroke_ids);
                        let sd = StrokeSegment::new(id, path, 0, dur, true);
                        p.stroke = StrokeState::Open(sd.clone());
                        sd
                    }
                    Some(open) if complete_prev => open.continue_stroke(path, 0, dur, false),
                    Some(open) => {
                        let sd = open.continue_stroke(path, 0, dur, true);
                        p.stroke = StrokeState::Open(sd.clone());
                        sd
                    }
                }
            }
        };
        self.batch.push(sd);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        gestures: Vec<Gesture>,
        reject: bool,
    }

    impl Injector for Recorder {
        fn inject(&mut self, gesture: Gesture) -> bool {
            self.gestures.push(gesture);
            !self.reject
        }
    }

    fn assembler() -> GestureAssembler<Recorder> {
        GestureAssembler::new(Timing::default(), Recorder::default())
    }

    fn frame(action: MotionAction, t: i64, pointers: &[(f32, f32)]) -> MotionFrame {
        MotionFrame {
            action,
            action_index: 0,
            down_time: 0,
            event_time: t,
            pointers: pointers.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        }
    }

    fn path_of(sd: &StrokeSegment) -> Vec<(f32, f32)> {
        sd.path().points().iter().map(|p| (p.x, p.y)).collect()
    }

    #[test]
    fn down_then_up_yields_open_then_final_segment() {
        let mut a = assembler();
        let at = Point::new(10.0, 20.0);
        a.build_stroke(0, MotionAction::Down, 0, 5, at, false).unwrap();
        a.build_stroke(0, MotionAction::Up, 0, 12, at, false).unwrap();
        let b = a.pending();
        assert_eq!(b.len(), 2);
        assert!(b[0].will_continue());
        assert!(!b[1].will_continue());
        assert_eq!(b[0].duration_ms(), 5);
        assert_eq!(b[1].duration_ms(), 7);
        assert_eq!(b[0].id(), b[1].id());
        assert!(!a.tracker().slot(0).unwrap().is_open());
    }

    #[test]
    fn down_move_up_chain() {
        let mut a = assembler();
        a.build_stroke(0, MotionAction::Down, 0, 0, Point::new(10.0, 20.0), false)
            .unwrap();
        a.build_stroke(0, MotionAction::Move, 0, 10, Point::new(15.0, 25.0), false)
            .unwrap();
        a.build_stroke(0, MotionAction::Up, 0, 20, Point::new(15.0, 25.0), false)
            .unwrap();

        let b = a.pending().to_vec();
        assert_eq!(b.len(), 3);
        assert_eq!(path_of(&b[0]), vec![(10.0, 20.0)]);
        assert_eq!(b[0].duration_ms(), 1);
        assert!(b[0].will_continue());
        assert_eq!(path_of(&b[1]), vec![(10.0, 20.0), (15.0, 25.0)]);
        assert_eq!(b[1].duration_ms(), 10);
        assert!(b[1].will_continue() && b[1].is_continuation());
        assert_eq!(path_of(&b[2]), vec![(15.0, 25.0), (15.0, 25.0)]);
        assert_eq!(b[2].duration_ms(), 10);
        assert!(!b[2].will_continue());

        a.flush().unwrap();
        assert!(a.pending().is_empty());
        assert_eq!(a.injector().gestures.len(), 1);
        assert_eq!(a.injector().gestures[0].len(), 3);
        assert!(!a.tracker().slot(0).unwrap().is_open());
    }

    #[test]
    fn single_point_samples_flush_each_call() {
        let mut a = assembler();
        a.process_single_point(0, 0, MotionAction::Down, 10.0, 20.0).unwrap();
        a.process_single_point(0, 10, MotionAction::Move, 15.0, 25.0).unwrap();
        a.process_single_point(0, 20, MotionAction::Up, 15.0, 25.0).unwrap();
        let g = &a.injector().gestures;
        assert_eq!(g.len(), 3);
        assert!(g.iter().all(|g| g.len() == 1));
        assert!(!g[2].strokes()[0].will_continue());
        assert!(a.pending().is_empty());
    }

    #[test]
    fn stray_up_is_a_successful_noop() {
        let mut a = assembler();
        a.process_single_point(0, 5, MotionAction::Up, 1.0, 1.0).unwrap();
        assert!(a.injector().gestures.is_empty());
        assert!(a.pending().is_empty());
    }

    #[test]
    fn negative_coordinates_leave_state_untouched() {
        let mut a = assembler();
        a.process_single_point(0, 0, MotionAction::Down, 10.0, 10.0).unwrap();
        let before = a.tracker().slot(0).cloned();

        a.process_single_point(0, 50, MotionAction::Move, -1.0, 10.0).unwrap();
        a.process_single_point(0, 50, MotionAction::Move, 10.0, -1.0).unwrap();
        a.process_frame(&frame(MotionAction::Move, 60, &[(-1.0, 5.0)])).unwrap();

        assert_eq!(a.tracker().slot(0).cloned(), before);
        assert!(a.pending().is_empty());
        assert_eq!(a.injector().gestures.len(), 1);
    }

    #[test]
    fn sentinel_pointer_does_not_block_others() {
        let mut a = assembler();
        a.process_frame(&frame(MotionAction::Down, 0, &[(-1.0, 0.0), (4.0, 4.0)]))
            .unwrap();
        assert!(!a.tracker().slot(0).unwrap().is_open());
        assert!(a.tracker().slot(1).unwrap().is_open());
        assert_eq!(a.injector().gestures[0].len(), 1);
    }

    #[test]
    fn unrecognized_action_fails_without_side_effects() {
        let mut a = assembler();
        let err = a
            .process_frame(&frame(MotionAction::Other(3), 10, &[(1.0, 1.0), (2.0, 2.0)]))
            .unwrap_err();
        assert_eq!(err, DispatchError::UnrecognizedAction(MotionAction::Other(3)));
        assert!(a.pending().is_empty());
        assert_eq!(a.tracker().open_count(), 0);
        assert_eq!(a.tracker().slot(0).unwrap().time_ms, 0);
        assert!(a.injector().gestures.is_empty());

        let err = a
            .process_single_point(0, 0, MotionAction::PointerDown, 1.0, 1.0)
            .unwrap_err();
        assert_eq!(err, DispatchError::UnrecognizedAction(MotionAction::PointerDown));
    }

    #[test]
    fn pointer_down_only_touches_reported_index() {
        let mut a = assembler();
        a.process_frame(&frame(MotionAction::Down, 0, &[(1.0, 1.0)])).unwrap();
        let mut f = frame(MotionAction::PointerDown, 5, &[(1.0, 1.0), (8.0, 8.0)]);
        f.action_index = 1;
        a.process_frame(&f).unwrap();

        assert_eq!(a.tracker().len(), 2);
        let g = &a.injector().gestures[1];
        assert_eq!(g.len(), 1);
        assert_eq!(path_of(&g.strokes()[0]), vec![(8.0, 8.0)]);
        assert_eq!(a.tracker().slot(0).unwrap().time_ms, 0);

        let mut f = frame(MotionAction::PointerUp, 9, &[(1.0, 1.0), (9.0, 9.0)]);
        f.action_index = 1;
        a.process_frame(&f).unwrap();
        assert!(a.tracker().slot(0).unwrap().is_open());
        assert!(!a.tracker().slot(1).unwrap().is_open());
    }

    #[test]
    fn fast_multi_pointer_moves_stay_chained() {
        let mut a = assembler();
        a.process_frame(&frame(MotionAction::Move, 0, &[(0.0, 0.0), (50.0, 50.0)]))
            .unwrap();
        for step in 1..6 {
            let t = step * 10;
            let d = step as f32;
            a.process_frame(&frame(MotionAction::Move, t, &[(d, d), (50.0 + d, 50.0)]))
                .unwrap();
        }
        for g in &a.injector().gestures {
            assert!(g.strokes().iter().all(StrokeSegment::will_continue));
        }
        assert_eq!(a.tracker().open_count(), 2);
    }

    #[test]
    fn slow_multi_pointer_moves_are_force_completed() {
        let mut a = assembler();
        a.process_frame(&frame(MotionAction::Move, 0, &[(0.0, 0.0), (50.0, 50.0)]))
            .unwrap();
        a.process_frame(&frame(MotionAction::Move, 40, &[(5.0, 5.0), (55.0, 50.0)]))
            .unwrap();

        let g = &a.injector().gestures[1];
        assert_eq!(g.len(), 2);
        assert!(g.strokes().iter().all(|s| !s.will_continue() && s.is_continuation()));
        assert_eq!(a.tracker().open_count(), 0);

        // the next move opens fresh chains
        a.process_frame(&frame(MotionAction::Move, 100, &[(6.0, 6.0), (56.0, 50.0)]))
            .unwrap();
        let g = &a.injector().gestures[2];
        assert!(g.strokes().iter().all(|s| s.will_continue() && !s.is_continuation()));
    }

    #[test]
    fn backwards_clock_resyncs_slot_zero() {
        let mut a = assembler();
        a.process_frame(&frame(MotionAction::Move, 100, &[(0.0, 0.0), (9.0, 9.0)]))
            .unwrap();
        a.process_frame(&frame(MotionAction::Move, 80, &[(1.0, 1.0), (9.0, 8.0)]))
            .unwrap();
        let g = &a.injector().gestures[1];
        assert!(g.strokes().iter().all(StrokeSegment::will_continue));
        assert_eq!(a.tracker().slot(0).unwrap().time_ms, 80);
    }

    #[test]
    fn single_pointer_move_never_force_completes() {
        let mut a = assembler();
        a.process_frame(&frame(MotionAction::Down, 0, &[(0.0, 0.0)])).unwrap();
        a.process_frame(&frame(MotionAction::Move, 500, &[(3.0, 3.0)])).unwrap();
        assert!(a.injector().gestures[1].strokes()[0].will_continue());
    }

    #[test]
    fn durations_stay_in_bounds() {
        for delta in [-1_000_000, -1, 0, 1, 59_999, 60_000, 10_000_000, i64::MAX] {
            let d = clamp_duration(delta, 60_000);
            assert!((1..=60_000).contains(&d), "delta {delta} -> {d}");
        }
        assert_eq!(clamp_duration(5, 0), 1);
    }

    #[test]
    fn extreme_timestamps_do_not_overflow() {
        let mut a = assembler();
        a.process_single_point(i64::MIN, i64::MAX, MotionAction::Down, 1.0, 1.0)
            .unwrap();
        a.process_single_point(i64::MIN, i64::MIN, MotionAction::Move, 2.0, 2.0)
            .unwrap();
        a.process_single_point(i64::MIN, i64::MAX, MotionAction::Up, 3.0, 3.0)
            .unwrap();
        let durations: Vec<u64> = a
            .injector()
            .gestures
            .iter()
            .map(|g| g.strokes()[0].duration_ms())
            .collect();
        assert_eq!(durations, vec![60_000, 1, 60_000]);

        a.process_frame(&frame(MotionAction::Move, i64::MIN, &[(1.0, 1.0), (2.0, 2.0)]))
            .unwrap();
        a.process_frame(&frame(MotionAction::Move, i64::MAX, &[(1.0, 1.0), (2.0, 2.0)]))
            .unwrap();
        let last = a.injector().gestures.last().unwrap();
        assert!(last.strokes().iter().all(|s| (1..=60_000).contains(&s.duration_ms())));
    }

    #[test]
    fn long_gap_is_clamped_to_max_duration() {
        let mut a = assembler();
        a.process_single_point(0, 0, MotionAction::Down, 0.0, 0.0).unwrap();
        a.process_single_point(0, 120_000, MotionAction::Move, 1.0, 0.0).unwrap();
        assert_eq!(a.injector().gestures[1].strokes()[0].duration_ms(), 60_000);
    }

    #[test]
    fn move_before_down_opens_a_chain() {
        let mut a = assembler();
        a.process_single_point(0, 7, MotionAction::Move, 3.0, 4.0).unwrap();
        let sd = &a.injector().gestures[0].strokes()[0];
        assert!(sd.will_continue());
        assert!(!sd.is_continuation());
        assert_eq!(path_of(sd), vec![(0.0, 0.0), (3.0, 4.0)]);
        assert_eq!(sd.duration_ms(), 7);
    }

    #[test]
    fn rejected_flush_discards_batch() {
        let mut a = GestureAssembler::new(
            Timing::default(),
            Recorder {
                reject: true,
                ..Recorder::default()
            },
        );
        let err = a
            .process_frame(&frame(MotionAction::Down, 0, &[(1.0, 1.0), (2.0, 2.0)]))
            .unwrap_err();
        assert_eq!(err, DispatchError::Rejected { strokes: 2 });
        assert!(a.pending().is_empty());
        // slot state still reflects the opened chains
        assert_eq!(a.tracker().open_count(), 2);
    }

    #[test]
    fn empty_flush_is_ok() {
        let mut a = assembler();
        a.flush().unwrap();
        assert!(a.injector().gestures.is_empty());
    }

    #[test]
    fn tap_bypasses_pending_batch() {
        let mut a = assembler();
        a.build_stroke(0, MotionAction::Down, 0, 0, Point::new(1.0, 1.0), false)
            .unwrap();
        a.dispatch_tap(30.0, 40.0).unwrap();
        assert_eq!(a.pending().len(), 1);
        let g = &a.injector().gestures[0];
        assert_eq!(g.len(), 1);
        assert_eq!(path_of(&g.strokes()[0]), vec![(30.0, 40.0)]);
        assert_eq!(g.strokes()[0].duration_ms(), 1);
        assert!(!g.strokes()[0].will_continue());
    }

    #[test]
    fn scale_out_spreads_fingers_apart() {
        let mut a = assembler();
        a.dispatch_scale(100.0, 50.0, 20.0).unwrap();
        let g = &a.injector().gestures[0];
        assert_eq!(g.len(), 2);
        assert_eq!(path_of(&g.strokes()[0]), vec![(100.0, 50.0), (80.0, 50.0)]);
        assert_eq!(path_of(&g.strokes()[1]), vec![(110.0, 50.0), (130.0, 50.0)]);
        assert!(g.strokes().iter().all(|s| s.duration_ms() == 100 && !s.will_continue()));
        assert_ne!(g.strokes()[0].id(), g.strokes()[1].id());
    }

    #[test]
    fn scale_in_brings_fingers_together() {
        let mut a = assembler();
        a.dispatch_scale(100.0, 50.0, -20.0).unwrap();
        let g = &a.injector().gestures[0];
        assert_eq!(path_of(&g.strokes()[0]), vec![(80.0, 50.0), (100.0, 50.0)]);
        assert_eq!(path_of(&g.strokes()[1]), vec![(130.0, 50.0), (110.0, 50.0)]);
    }

    #[test]
    fn action_codes_round_trip() {
        for code in [0, 1, 2, 5, 6, 3, 9] {
            assert_eq!(MotionAction::from_code(code).code(), code);
        }
        assert_eq!(MotionAction::from_code(3), MotionAction::Other(3));
    }

    #[test]
    fn frames_parse_from_json() {
        let f: MotionFrame = serde_json::from_str(
            r#"{"action":"pointer_down","action_index":1,"down_time":0,"event_time":4,
                "pointers":[{"x":1.0,"y":2.0},{"x":3.0,"y":4.0}]}"#,
        )
        .unwrap();
        assert_eq!(f.action, MotionAction::PointerDown);
        assert_eq!(f.pointers[1], Point::new(3.0, 4.0));
        let f: MotionFrame = serde_json::from_str(
            r#"{"action":{"other":3},"down_time":0,"event_time":4,"pointers":[]}"#,
        )
        .unwrap();
        assert_eq!(f.action, MotionAction::Other(3));
        assert_eq!(f.action_index, 0);
        let f: MotionFrame = serde_json::from_str(
            r#"{"action":6,"action_index":1,"down_time":0,"event_time":4,"pointers":[]}"#,
        )
        .unwrap();
        assert_eq!(f.action, MotionAction::PointerUp);
    }
}
