use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Number of scalar floats making up one interleaved vertex.
pub const FLOATS_PER_VERTEX: usize = 6;

/// One interleaved vertex: position followed by flat color.
///
/// Matches the memory layout of six consecutive `f32` in a geometry buffer,
/// so a `&[f32]` of valid length can be viewed as `&[Vertex]`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn color(&self) -> Vec3 {
        Vec3::from_array(self.color)
    }
}

/// A single vertex input slot inside an interleaved buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader input location.
    pub location: u32,
    /// Number of `f32` components.
    pub components: u32,
    /// Offset from the start of the vertex, in floats.
    pub offset: u32,
}

/// Describes how vertex attributes are packed into a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    /// Distance between consecutive vertices, in floats.
    pub stride: u32,
    pub attributes: &'static [VertexAttribute],
}

impl VertexLayout {
    /// Position at location 0, color at location 1, stride of six floats.
    pub const POSITION_COLOR: VertexLayout = VertexLayout {
        stride: FLOATS_PER_VERTEX as u32,
        attributes: &[
            VertexAttribute {
                location: 0,
                components: 3,
                offset: 0,
            },
            VertexAttribute {
                location: 1,
                components: 3,
                offset: 3,
            },
        ],
    };

    /// Stride in bytes.
    pub fn stride_bytes(&self) -> u64 {
        self.stride as u64 * std::mem::size_of::<f32>() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_matches_interleaved_floats() {
        assert_eq!(
            std::mem::size_of::<Vertex>(),
            FLOATS_PER_VERTEX * std::mem::size_of::<f32>()
        );
        let floats: [f32; 6] = [1.0, 2.0, 3.0, 0.5, 0.25, 0.0];
        let verts: &[Vertex] = bytemuck::cast_slice(&floats);
        assert_eq!(verts[0].position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(verts[0].color(), Vec3::new(0.5, 0.25, 0.0));
    }

    #[test]
    fn position_color_layout() {
        let layout = VertexLayout::POSITION_COLOR;
        assert_eq!(layout.stride, 6);
        assert_eq!(layout.stride_bytes(), 24);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[1].location, 1);
        assert_eq!(layout.attributes[1].offset, 3);
    }
}
