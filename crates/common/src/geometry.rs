use crate::types::FLOATS_PER_VERTEX;
use glam::Vec3;

/// Errors raised while validating raw geometry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("vertex buffer length {len} is not a multiple of 6")]
    Malformed { len: usize },
}

/// Check that `vertices` holds a whole number of interleaved vertices.
pub fn validate(vertices: &[f32]) -> Result<(), GeometryError> {
    if vertices.len() % FLOATS_PER_VERTEX != 0 {
        return Err(GeometryError::Malformed {
            len: vertices.len(),
        });
    }
    Ok(())
}

/// Number of whole vertices in an interleaved buffer.
pub fn vertex_count(vertices: &[f32]) -> usize {
    vertices.len() / FLOATS_PER_VERTEX
}

/// Add `offset` to every position triple in place. Color triples are left
/// untouched.
///
/// Not idempotent: a second call moves the geometry again.
pub fn bake_offset(vertices: &mut [f32], offset: Vec3) {
    for vertex in vertices.chunks_exact_mut(FLOATS_PER_VERTEX) {
        vertex[0] += offset.x;
        vertex[1] += offset.y;
        vertex[2] += offset.z;
    }
}
