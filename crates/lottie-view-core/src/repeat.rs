//! Finite-repeat bookkeeping for engines that only expose a loop flag.
//!
//! Player-style engines report each traversal through a one-shot completion
//! handler and know nothing about repeat counts. The handler owns a
//! [`RepeatCoordinator`] and asks it, on every completion, what to do next.
//! The coordinator never talks to the engine or the view: it is a pure state
//! machine, which keeps it testable without either.

use serde::{Deserialize, Serialize};

use crate::view::RepeatMode;

/// Where the coordinator is in a playback cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepeatPhase {
    /// Not playing. The play counter is 1.
    Idle,
    /// A traversal is in flight.
    Playing,
}

/// What the handler should do after a completion callback.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Natural end, policy wants another traversal: fire Repeated, play again.
    Replay,
    /// Natural end, the cycle is complete: back to idle.
    Settle,
    /// Cancelled mid-flight, or a completion with no traversal in flight.
    Ignore,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatCoordinator {
    phase: RepeatPhase,
    play_count: u32,
}

impl Default for RepeatCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RepeatCoordinator {
    pub fn new() -> Self {
        Self {
            phase: RepeatPhase::Idle,
            play_count: 1,
        }
    }

    #[inline]
    pub fn phase(&self) -> RepeatPhase {
        self.phase
    }

    /// 1-based count of the traversal currently in flight.
    #[inline]
    pub fn play_count(&self) -> u32 {
        self.play_count
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.phase == RepeatPhase::Playing
    }

    /// A play command or auto-play kicked off a traversal.
    pub fn begin_play(&mut self) {
        self.phase = RepeatPhase::Playing;
    }

    /// Back to idle with the counter reset. Used by stop and detach.
    pub fn reset(&mut self) {
        self.phase = RepeatPhase::Idle;
        self.play_count = 1;
    }

    /// Decide what happens after the engine's completion callback. The
    /// caller fires Finished itself on every natural completion, before
    /// acting on the outcome.
    pub fn on_completion(
        &mut self,
        finished: bool,
        mode: RepeatMode,
        repeat_count: u32,
    ) -> CompletionOutcome {
        if !finished || self.phase == RepeatPhase::Idle {
            return CompletionOutcome::Ignore;
        }
        match mode {
            RepeatMode::Infinite => CompletionOutcome::Replay,
            RepeatMode::Restart if self.play_count < repeat_count.max(1) => {
                self.play_count += 1;
                CompletionOutcome::Replay
            }
            RepeatMode::Restart => {
                self.reset();
                CompletionOutcome::Settle
            }
        }
    }
}
