use crate::error::RenderError;
use glam::Mat4;
use serde::Serialize;
use std::ops::Range;
use wireorbit_common::VertexLayout;

/// Opaque handle to a linked shading program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ProgramHandle(pub u32);

/// Opaque handle to an uploaded vertex buffer and its attribute bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MeshHandle(pub u32);

/// Primitive assembly mode for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Topology {
    /// Every pair of vertices forms one segment.
    LineList,
}

/// Matrices shared by every draw in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameUniforms {
    pub view: Mat4,
    pub projection: Mat4,
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }
}

/// One draw submission: which program, which mesh, which vertices, and the
/// uniforms the program reads (`model`, `view`, `projection`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawCall {
    pub program: ProgramHandle,
    pub mesh: MeshHandle,
    pub topology: Topology,
    pub vertices: Range<u32>,
    pub model: Mat4,
    pub frame: FrameUniforms,
}

/// Builds a shading program from vertex-stage and fragment-stage source.
pub trait ShaderCompiler {
    /// Compile and link both stages. Failures carry the compiler log.
    fn compile(&mut self, vertex_src: &str, fragment_src: &str)
    -> Result<ProgramHandle, RenderError>;
}

/// GPU resource and draw interface.
///
/// Every call happens on the thread that owns the device.
pub trait GpuBackend {
    /// Upload interleaved vertex data as static geometry and declare its
    /// attribute layout.
    fn create_mesh(
        &mut self,
        label: &str,
        vertices: &[f32],
        layout: &VertexLayout,
    ) -> Result<MeshHandle, RenderError>;

    /// Free a mesh. Unknown handles are ignored.
    fn destroy_mesh(&mut self, mesh: MeshHandle);

    /// Start a new frame, discarding any draws not yet submitted.
    fn begin_frame(&mut self);

    /// Queue one draw for the current frame.
    fn draw(&mut self, call: &DrawCall) -> Result<(), RenderError>;
}
