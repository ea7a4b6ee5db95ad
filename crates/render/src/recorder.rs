use crate::backend::{DrawCall, GpuBackend, MeshHandle, ProgramHandle, ShaderCompiler};
use crate::error::RenderError;
use std::collections::BTreeMap;
use wireorbit_common::{VertexLayout, geometry};

/// A backend call captured by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    Compile {
        program: ProgramHandle,
    },
    CreateMesh {
        mesh: MeshHandle,
        label: String,
        vertices: Vec<f32>,
        layout: VertexLayout,
    },
    DestroyMesh {
        mesh: MeshHandle,
    },
    BeginFrame,
    Draw(DrawCall),
}

#[derive(Debug, Clone)]
struct RecordedMesh {
    label: String,
    vertex_count: u32,
}

/// Headless backend that validates and records every call instead of
/// touching a GPU.
///
/// Enforces the same handle and range rules as a real backend, so objects
/// and controllers can be exercised in plain unit tests. Empty meshes are
/// accepted.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<RecordedCommand>,
    programs: u32,
    meshes: BTreeMap<MeshHandle, RecordedMesh>,
    next_mesh: u32,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a trivial program; handy in tests.
    pub fn compile_default(&mut self) -> ProgramHandle {
        let program = ProgramHandle(self.programs);
        self.programs += 1;
        self.commands.push(RecordedCommand::Compile { program });
        program
    }

    /// Every call in submission order.
    pub fn commands(&self) -> &[RecordedCommand] {
        &self.commands
    }

    /// Draws recorded since the last `begin_frame`.
    pub fn draws(&self) -> Vec<&DrawCall> {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, RecordedCommand::BeginFrame))
            .map_or(0, |i| i + 1);
        self.commands[start..]
            .iter()
            .filter_map(|c| match c {
                RecordedCommand::Draw(call) => Some(call),
                _ => None,
            })
            .collect()
    }

    /// Number of frames begun so far.
    pub fn frame_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RecordedCommand::BeginFrame))
            .count()
    }

    /// Number of live meshes.
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Label a live mesh was created with.
    pub fn mesh_label(&self, mesh: MeshHandle) -> Option<&str> {
        self.meshes.get(&mesh).map(|m| m.label.as_str())
    }
}

impl ShaderCompiler for RecordingBackend {
    fn compile(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<ProgramHandle, RenderError> {
        let mut log = String::new();
        if vertex_src.trim().is_empty() {
            log.push_str("vertex stage: empty source\n");
        }
        if fragment_src.trim().is_empty() {
            log.push_str("fragment stage: empty source\n");
        }
        if !log.is_empty() {
            return Err(RenderError::ShaderBuild { log });
        }
        Ok(self.compile_default())
    }
}

impl GpuBackend for RecordingBackend {
    fn create_mesh(
        &mut self,
        label: &str,
        vertices: &[f32],
        layout: &VertexLayout,
    ) -> Result<MeshHandle, RenderError> {
        geometry::validate(vertices)?;
        let mesh = MeshHandle(self.next_mesh);
        self.next_mesh += 1;
        self.meshes.insert(
            mesh,
            RecordedMesh {
                label: label.to_owned(),
                vertex_count: geometry::vertex_count(vertices) as u32,
            },
        );
        self.commands.push(RecordedCommand::CreateMesh {
            mesh,
            label: label.to_owned(),
            vertices: vertices.to_vec(),
            layout: *layout,
        });
        Ok(mesh)
    }

    fn destroy_mesh(&mut self, mesh: MeshHandle) {
        if self.meshes.remove(&mesh).is_some() {
            self.commands.push(RecordedCommand::DestroyMesh { mesh });
        }
    }

    fn begin_frame(&mut self) {
        self.commands.push(RecordedCommand::BeginFrame);
    }

    fn draw(&mut self, call: &DrawCall) -> Result<(), RenderError> {
        if call.program.0 >= self.programs {
            return Err(RenderError::UnknownProgram(call.program));
        }
        let mesh = self
            .meshes
            .get(&call.mesh)
            .ok_or(RenderError::UnknownMesh(call.mesh))?;
        if call.vertices.start > call.vertices.end || call.vertices.end > mesh.vertex_count {
            return Err(RenderError::DrawOutOfRange {
                start: call.vertices.start,
                end: call.vertices.end,
                available: mesh.vertex_count,
            });
        }
        self.commands.push(RecordedCommand::Draw(call.clone()));
        Ok(())
    }
}
