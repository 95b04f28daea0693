//! Queue navigation policy
//!
//! Decides which queue entry `next`/`previous` move to. Kept free of device
//! I/O so the rules can be checked exhaustively.

use encore_core::RepeatMode;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Outcome of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Play the current track again from the start (repeat one)
    Replay,

    /// Play the queue entry at this index
    Play(usize),

    /// Seek the current track back to zero
    Restart,

    /// End of queue reached with nothing to wrap to
    Exhausted,
}

/// How shuffle picks the next index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShufflePolicy {
    /// Uniform over the whole queue; the current track may be picked again
    #[default]
    Uniform,

    /// Uniform over every entry except the current one (when there is a choice)
    AvoidCurrent,
}

/// Pick a shuffled index in `[0, len)`
///
/// `len` must be non-zero.
pub fn pick_shuffled<R: Rng + ?Sized>(
    len: usize,
    current: Option<usize>,
    policy: ShufflePolicy,
    rng: &mut R,
) -> usize {
    match (policy, current) {
        (ShufflePolicy::AvoidCurrent, Some(current)) if len > 1 && current < len => {
            let pick = rng.gen_range(0..len - 1);
            if pick >= current {
                pick + 1
            } else {
                pick
            }
        }
        _ => rng.gen_range(0..len),
    }
}

/// Resolve `next` (and auto-advance at end of track)
///
/// `current` is the position of the current track in the queue, `None` when
/// it is not part of it. `pick` is only called when shuffling a non-empty queue.
pub fn next_step(
    len: usize,
    current: Option<usize>,
    shuffle: bool,
    repeat: RepeatMode,
    pick: impl FnOnce(usize) -> usize,
) -> Step {
    if repeat == RepeatMode::One {
        return Step::Replay;
    }

    let candidate = if shuffle && len > 0 {
        pick(len)
    } else {
        current.map_or(0, |index| index + 1)
    };

    if candidate < len {
        Step::Play(candidate)
    } else if repeat == RepeatMode::All && len > 0 {
        Step::Play(0)
    } else {
        Step::Exhausted
    }
}

/// Resolve `previous` once the restart threshold has been ruled out
///
/// Never produces a negative index: at the head of the queue (or when the
/// current track is not queued) the current track restarts instead.
pub fn previous_step(
    len: usize,
    current: Option<usize>,
    shuffle: bool,
    pick: impl FnOnce(usize) -> usize,
) -> Step {
    let candidate = if shuffle && len > 0 {
        Some(pick(len))
    } else {
        current.and_then(|index| index.checked_sub(1))
    };

    match candidate {
        Some(index) if index < len => Step::Play(index),
        _ => Step::Restart,
    }
}
