use thiserror::Error;

use crate::gestures::MotionAction;

#[derive(Debug, Error, PartialEq)]
pub enum DispatchError {
    #[error("unable to dispatch event with action {0:?}")]
    UnrecognizedAction(MotionAction),

    /// The batch is discarded either way; `strokes` is how many segments were lost.
    #[error("injector rejected gesture ({strokes} strokes)")]
    Rejected { strokes: usize },
}
