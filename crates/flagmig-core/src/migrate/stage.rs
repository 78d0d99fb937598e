//! Pipeline stage machine

use std::fmt;

/// Stage of one migration run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Start,
    Decode,
    NormalizeAll,
    Encode,
    Done,
    Failed,
}

impl Stage {
    /// No transition leaves this stage
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        allowed_transitions(self).is_empty()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Decode => "decode",
            Self::NormalizeAll => "normalize",
            Self::Encode => "encode",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Attempted move between stages that the pipeline does not allow
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal stage transition: {from} -> {to}")]
pub struct StageError {
    pub from: Stage,
    pub to: Stage,
}

/// Stages reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: Stage) -> &'static [Stage] {
    use Stage::{Decode, Done, Encode, Failed, NormalizeAll, Start};
    match from {
        Start => &[Decode, Failed],
        Decode => &[NormalizeAll, Failed],
        NormalizeAll => &[Encode, Failed],
        Encode => &[Done, Failed],
        Done | Failed => &[],
    }
}

/// Check a single transition
///
/// # Errors
/// Returns [`StageError`] when `to` is not reachable from `from`
pub fn validate_transition(from: Stage, to: Stage) -> Result<(), StageError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(StageError { from, to })
    }
}

/// Current stage of a run, logging each move
#[derive(Debug)]
pub(crate) struct StageTracker {
    current: Stage,
}

impl StageTracker {
    pub(crate) fn new() -> Self {
        Self {
            current: Stage::Start,
        }
    }

    pub(crate) fn current(&self) -> Stage {
        self.current
    }

    pub(crate) fn advance(&mut self, to: Stage) -> Result<(), StageError> {
        validate_transition(self.current, to)?;
        tracing::debug!(from = %self.current, to = %to, "stage transition");
        self.current = to;
        Ok(())
    }

    /// Move to `Failed` from any live stage
    pub(crate) fn fail(&mut self) {
        if self.advance(Stage::Failed).is_err() {
            tracing::debug!(stage = %self.current, "failure after terminal stage");
        }
    }
}
