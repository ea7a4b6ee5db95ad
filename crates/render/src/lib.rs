//! Rendering adapter: renderer-agnostic backend interface and renderable objects.
//!
//! # Invariants
//! - An object's GPU mesh exists only between `initialize` and `release`.
//! - Draw counts always derive from the uploaded buffer length.
//! - View and projection reach every draw as explicit arguments.
//!
//! `RecordingBackend` implements the interface without a GPU. It backs the
//! unit tests and the headless CLI; the wgpu backend lives in
//! `wireorbit-render-wgpu`.

mod backend;
mod error;
mod object;
mod recorder;

pub use backend::{
    DrawCall, FrameUniforms, GpuBackend, MeshHandle, ProgramHandle, ShaderCompiler, Topology,
};
pub use error::RenderError;
pub use object::RenderableObject;
pub use recorder::{RecordedCommand, RecordingBackend};

pub fn crate_info() -> &'static str {
    "wireorbit-render v0.1.0"
}
