//! Test fixtures for the lottie-view adapter.
//!
//! The adapter's observable effect is the call sequence it drives into an
//! engine, so both mock engines keep an operation log alongside scriptable
//! state (what the next load parses to, whether it is rejected) and exact
//! listener add/remove accounting. [`HostHarness`] plays the host framework:
//! it wires property-changed notifications to a handler and pumps the UI
//! scheduler queue.

mod harness;
mod mock_animator;
mod mock_player;
mod ops;

pub use harness::{EventLog, HostHarness};
pub use mock_animator::MockAnimatorEngine;
pub use mock_player::MockPlayerEngine;
pub use ops::EngineOp;

use lottie_view_core::Composition;

/// A 60 frame, one second composition most tests share.
pub fn test_composition() -> Composition {
    Composition::new("spinner", 60, 1000)
}
