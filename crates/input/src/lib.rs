//! Input: a boolean-per-key polling surface and the orbit key table.
//!
//! # Invariants
//! - Only five keys exist: four arrows and Escape.
//! - Bindings are polled every frame, not delivered as events.

pub mod action;
pub mod key;

pub use action::{Action, BINDINGS, OrbitInput, poll_actions};
pub use key::{HeldKeys, Key, KeyboardState};

pub fn crate_info() -> &'static str {
    "wireorbit-input v0.1.0"
}
