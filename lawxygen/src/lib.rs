//! Core of the LawXygen landing page.
//!
//! The page has two interactive pieces, a testimonial carousel and a
//! consultation request form. Their behavior is split the same way for both:
//!
//! - **[`core`]**: Pure state machines (navigation, form lifecycle,
//!   validation). No clocks, no I/O, fully testable in isolation.
//! - **[`controller`]**: Async tasks that own a state machine and drive its
//!   timed transitions (carousel lock release, post-submit reset,
//!   notification dismissal).
//!
//! Static copy lives in [`content`], HTML rendering in [`render`], and
//! `site.toml` handling in [`io`].

pub mod content;
pub mod controller;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod render;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
