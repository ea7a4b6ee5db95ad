//! Shared types: interleaved vertex format, attribute layout, geometry baking.
//!
//! # Invariants
//! - A vertex is six consecutive `f32`: position xyz then color rgb.
//! - Geometry buffers are always a whole number of vertices long.

pub mod geometry;
pub mod types;

pub use geometry::{GeometryError, bake_offset, validate, vertex_count};
pub use types::{FLOATS_PER_VERTEX, Vertex, VertexAttribute, VertexLayout};

pub fn crate_info() -> &'static str {
    "wireorbit-common v0.1.0"
}
