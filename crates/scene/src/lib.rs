//! Scene: orbit camera, per-frame controller, configuration and fixture geometry.
//!
//! # Invariants
//! - Pitch stays inside the configured pole margin after every update.
//! - The view matrix is rebuilt every frame from the current angles.
//! - Objects are drawn in insertion order.

pub mod camera;
pub mod config;
pub mod controller;
pub mod fixtures;

pub use camera::OrbitCamera;
pub use config::{CameraConfig, ConfigError, SceneConfig, StepMode, WindowConfig};
pub use controller::{SceneController, UpdateOutcome};

pub fn crate_info() -> &'static str {
    "wireorbit-scene v0.1.0"
}
