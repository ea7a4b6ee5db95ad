use crate::backend::{DrawCall, FrameUniforms, GpuBackend, MeshHandle, ProgramHandle, Topology};
use crate::error::RenderError;
use glam::{Mat4, Vec3};
use wireorbit_common::{FLOATS_PER_VERTEX, GeometryError, Vertex, VertexLayout, geometry};

/// A wireframe object: interleaved position/color lines placed at a fixed
/// center, plus the GPU mesh it is drawn from.
///
/// The center is baked into a derived copy of the geometry once, at
/// construction. The model matrix is applied on top at draw time, so the
/// world position of a vertex is `model * (local + center)`.
#[derive(Debug, Clone)]
pub struct RenderableObject {
    label: String,
    local: Vec<f32>,
    baked: Vec<f32>,
    center: Vec3,
    model: Mat4,
    mesh: Option<MeshHandle>,
}

impl RenderableObject {
    /// Build an object from caller-owned geometry. The input slice is copied,
    /// never modified.
    pub fn new(
        label: impl Into<String>,
        vertices: &[f32],
        center: Vec3,
    ) -> Result<Self, GeometryError> {
        geometry::validate(vertices)?;
        let local = vertices.to_vec();
        let mut baked = local.clone();
        geometry::bake_offset(&mut baked, center);
        Ok(Self {
            label: label.into(),
            local,
            baked,
            center,
            model: Mat4::IDENTITY,
            mesh: None,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Geometry as supplied, without the center offset.
    pub fn local_vertices(&self) -> &[f32] {
        &self.local
    }

    /// Geometry with the center offset applied; this is what gets uploaded.
    pub fn vertices(&self) -> &[f32] {
        &self.baked
    }

    pub fn vertex_count(&self) -> u32 {
        (self.baked.len() / FLOATS_PER_VERTEX) as u32
    }

    pub fn model(&self) -> Mat4 {
        self.model
    }

    /// Replace the model matrix. Takes effect on the next render.
    pub fn set_transform(&mut self, model: Mat4) {
        self.model = model;
    }

    pub fn is_initialized(&self) -> bool {
        self.mesh.is_some()
    }

    pub fn mesh(&self) -> Option<MeshHandle> {
        self.mesh
    }

    /// World-space position of vertex `index` under the current model matrix.
    pub fn world_position(&self, index: usize) -> Option<Vec3> {
        let verts: &[Vertex] = as_vertices(&self.baked);
        verts
            .get(index)
            .map(|v| self.model.transform_point3(v.position()))
    }

    /// Upload the baked geometry. Must run exactly once before `render`.
    pub fn initialize<B: GpuBackend + ?Sized>(
        &mut self,
        backend: &mut B,
    ) -> Result<(), RenderError> {
        if self.mesh.is_some() {
            return Err(RenderError::AlreadyInitialized {
                label: self.label.clone(),
            });
        }
        let mesh =
            backend.create_mesh(&self.label, &self.baked, &VertexLayout::POSITION_COLOR)?;
        tracing::debug!(
            label = %self.label,
            ?mesh,
            vertices = self.vertex_count(),
            "object initialized"
        );
        self.mesh = Some(mesh);
        Ok(())
    }

    /// Queue a line-list draw of the whole buffer with this object's model
    /// matrix and the frame's view/projection.
    pub fn render<B: GpuBackend + ?Sized>(
        &self,
        backend: &mut B,
        program: ProgramHandle,
        frame: &FrameUniforms,
    ) -> Result<(), RenderError> {
        let Some(mesh) = self.mesh else {
            return Err(RenderError::Uninitialized {
                label: self.label.clone(),
            });
        };
        let count = self.vertex_count();
        if count == 0 {
            return Ok(());
        }
        backend.draw(&DrawCall {
            program,
            mesh,
            topology: Topology::LineList,
            vertices: 0..count,
            model: self.model,
            frame: *frame,
        })
    }

    /// Free the GPU mesh. Safe to call more than once.
    pub fn release<B: GpuBackend + ?Sized>(&mut self, backend: &mut B) {
        if let Some(mesh) = self.mesh.take() {
            backend.destroy_mesh(mesh);
            tracing::debug!(label = %self.label, ?mesh, "object released");
        }
    }
}

fn as_vertices(floats: &[f32]) -> &[Vertex] {
    // Length is validated at construction, so the cast cannot fail.
    bytemuck::cast_slice(floats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{RecordedCommand, RecordingBackend};

    fn sample() -> Vec<f32> {
        vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]
    }

    fn ready(
        vertices: &[f32],
        center: Vec3,
    ) -> (RenderableObject, RecordingBackend, ProgramHandle) {
        let mut backend = RecordingBackend::new();
        let program = backend.compile_default();
        let mut obj = RenderableObject::new("obj", vertices, center).unwrap();
        obj.initialize(&mut backend).unwrap();
        (obj, backend, program)
    }

    #[test]
    fn bakes_center_into_positions() {
        let obj = RenderableObject::new("pair", &sample(), Vec3::new(2.0, 3.0, 4.0)).unwrap();
        let v = obj.vertices();
        assert_eq!(&v[0..3], &[2.0, 3.0, 4.0]);
        assert_eq!(&v[3..6], &[1.0, 1.0, 1.0]);
        assert_eq!(&v[6..9], &[3.0, 3.0, 4.0]);
        assert_eq!(&v[9..12], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn input_geometry_is_not_mutated() {
        let input = sample();
        let obj = RenderableObject::new("pair", &input, Vec3::splat(5.0)).unwrap();
        assert_eq!(input, sample());
        assert_eq!(obj.local_vertices(), sample().as_slice());
    }

    #[test]
    fn every_vertex_offset_exactly_once() {
        let input: Vec<f32> = (0..60).map(|i| i as f32 * 0.5).collect();
        let center = Vec3::new(-1.5, 0.25, 7.0);
        let obj = RenderableObject::new("ramp", &input, center).unwrap();
        for (orig, baked) in input.chunks(6).zip(obj.vertices().chunks(6)) {
            assert_eq!(baked[0], orig[0] + center.x);
            assert_eq!(baked[1], orig[1] + center.y);
            assert_eq!(baked[2], orig[2] + center.z);
            assert_eq!(&baked[3..6], &orig[3..6]);
        }
    }

    #[test]
    fn malformed_geometry_fails_fast() {
        let err = RenderableObject::new("bad", &[0.0; 10], Vec3::ZERO).unwrap_err();
        assert_eq!(err, GeometryError::Malformed { len: 10 });
    }

    #[test]
    fn render_before_initialize_is_an_error() {
        let mut backend = RecordingBackend::new();
        let program = backend.compile_default();
        let obj = RenderableObject::new("early", &sample(), Vec3::ZERO).unwrap();
        let err = obj
            .render(&mut backend, program, &FrameUniforms::default())
            .unwrap_err();
        assert_eq!(
            err,
            RenderError::Uninitialized {
                label: "early".into()
            }
        );
        assert!(backend.draws().is_empty());
    }

    #[test]
    fn initialize_twice_is_an_error() {
        let (mut obj, mut backend, _) = ready(&sample(), Vec3::ZERO);
        let err = obj.initialize(&mut backend).unwrap_err();
        assert!(matches!(err, RenderError::AlreadyInitialized { .. }));
        assert_eq!(backend.mesh_count(), 1);
    }

    #[test]
    fn initialize_uploads_baked_data_with_layout() {
        let (obj, backend, _) = ready(&sample(), Vec3::new(2.0, 3.0, 4.0));
        let upload = backend
            .commands()
            .iter()
            .find_map(|c| match c {
                RecordedCommand::CreateMesh {
                    vertices, layout, ..
                } => Some((vertices.clone(), *layout)),
                _ => None,
            })
            .unwrap();
        assert_eq!(upload.0, obj.vertices());
        assert_eq!(upload.1, VertexLayout::POSITION_COLOR);
    }

    #[test]
    fn draw_count_follows_buffer_length() {
        // Deliberately small: two vertices, one segment.
        let (obj, mut backend, program) = ready(&sample(), Vec3::ZERO);
        obj.render(&mut backend, program, &FrameUniforms::default())
            .unwrap();
        let draws = backend.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].vertices, 0..2);
        assert_eq!(draws[0].topology, Topology::LineList);
    }

    #[test]
    fn render_passes_model_and_frame_matrices() {
        let (mut obj, mut backend, program) = ready(&sample(), Vec3::ZERO);
        let model = Mat4::from_rotation_y(0.5);
        obj.set_transform(model);
        let frame = FrameUniforms {
            view: Mat4::from_translation(Vec3::new(0.0, 0.0, -20.0)),
            projection: Mat4::perspective_rh(0.7, 1.5, 0.1, 100.0),
        };
        obj.render(&mut backend, program, &frame).unwrap();
        let draw = &backend.draws()[0];
        assert_eq!(draw.model, model);
        assert_eq!(draw.frame, frame);
        assert_eq!(draw.program, program);
    }

    #[test]
    fn world_position_composes_model_with_center() {
        let mut obj = RenderableObject::new("pair", &sample(), Vec3::new(2.0, 3.0, 4.0)).unwrap();
        assert_eq!(obj.world_position(1), Some(Vec3::new(3.0, 3.0, 4.0)));
        obj.set_transform(Mat4::from_translation(Vec3::X));
        assert_eq!(obj.world_position(0), Some(Vec3::new(3.0, 3.0, 4.0)));
        assert_eq!(obj.world_position(2), None);
    }

    #[test]
    fn empty_geometry_draws_nothing() {
        let mut backend = RecordingBackend::new();
        let program = backend.compile_default();
        let mut obj = RenderableObject::new("empty", &[], Vec3::ZERO).unwrap();
        obj.initialize(&mut backend).unwrap();
        obj.render(&mut backend, program, &FrameUniforms::default())
            .unwrap();
        assert!(backend.draws().is_empty());
    }

    #[test]
    fn release_is_idempotent() {
        let (mut obj, mut backend, _) = ready(&sample(), Vec3::ZERO);
        obj.release(&mut backend);
        obj.release(&mut backend);
        assert!(!obj.is_initialized());
        assert_eq!(backend.mesh_count(), 0);
    }
}
