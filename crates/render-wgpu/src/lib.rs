//! wgpu render backend for wireorbit.
//!
//! Each object gets its own vertex buffer and a small uniform buffer holding
//! its model, view and projection matrices. Draws queued during a frame are
//! encoded into one render pass by [`WgpuBackend::submit`].
//!
//! # Invariants
//! - Depth test is always on (Depth32Float, `Less`).
//! - A mesh is drawn at most once per submitted frame.

mod gpu;
mod shaders;

pub use gpu::WgpuBackend;
pub use shaders::{FRAGMENT_SHADER, VERTEX_SHADER};
