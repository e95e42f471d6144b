//! Testimonial carousel navigation: a cyclic index guarded by a transition lock.
//!
//! The lock is a cooperative re-entrancy guard. Any navigation that moves the
//! index takes it; the owner releases it once the transition window has
//! elapsed. This module knows nothing about time, so the controller decides
//! when [`CarouselState::release`] is called.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Navigation intent forwarded by the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum Navigation {
    Next,
    Prev,
    Select(usize),
}

/// Why a navigation intent left the state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// A transition is still running.
    Locked,
    /// Direct selection named an index past the end.
    OutOfRange,
    /// Direct selection named the testimonial already shown.
    AlreadyActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavOutcome {
    Moved { from: usize, to: usize },
    Ignored { reason: IgnoreReason },
}

impl NavOutcome {
    pub fn moved(&self) -> bool {
        matches!(self, NavOutcome::Moved { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CarouselError {
    #[error("carousel needs at least one testimonial")]
    Empty,
    #[error("active index {index} outside a carousel of {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Active index and lock flag over `len` testimonials.
///
/// Deserialization goes through the same checks as [`CarouselState::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCarouselState")]
pub struct CarouselState {
    active_index: usize,
    locked: bool,
    len: usize,
}

#[derive(Deserialize)]
struct RawCarouselState {
    active_index: usize,
    locked: bool,
    len: usize,
}

impl TryFrom<RawCarouselState> for CarouselState {
    type Error = CarouselError;

    fn try_from(raw: RawCarouselState) -> Result<Self, Self::Error> {
        let mut state = Self::new(raw.len)?;
        if raw.active_index >= raw.len {
            return Err(CarouselError::IndexOutOfRange {
                index: raw.active_index,
                len: raw.len,
            });
        }
        state.active_index = raw.active_index;
        state.locked = raw.locked;
        Ok(state)
    }
}

impl CarouselState {
    pub fn new(len: usize) -> Result<Self, CarouselError> {
        if len == 0 {
            return Err(CarouselError::Empty);
        }
        Ok(Self {
            active_index: 0,
            locked: false,
            len,
        })
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Apply a navigation intent.
    ///
    /// Every move takes the lock, including direct selection, so one policy
    /// covers arrows and dots alike. Ignored intents leave both the index and
    /// the lock unchanged.
    pub fn navigate(&mut self, nav: Navigation) -> NavOutcome {
        if self.locked {
            return NavOutcome::Ignored {
                reason: IgnoreReason::Locked,
            };
        }

        let from = self.active_index;
        let to = match nav {
            Navigation::Next => (from + 1) % self.len,
            Navigation::Prev => (from + self.len - 1) % self.len,
            Navigation::Select(index) if index >= self.len => {
                return NavOutcome::Ignored {
                    reason: IgnoreReason::OutOfRange,
                };
            }
            Navigation::Select(index) if index == from => {
                return NavOutcome::Ignored {
                    reason: IgnoreReason::AlreadyActive,
                };
            }
            Navigation::Select(index) => index,
        };

        self.active_index = to;
        self.locked = true;
        debug!(from, to, ?nav, "carousel moved");
        NavOutcome::Moved { from, to }
    }

    /// Release the transition lock. Returns whether it was held.
    pub fn release(&mut self) -> bool {
        std::mem::replace(&mut self.locked, false)
    }
}
