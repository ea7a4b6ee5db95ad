use crate::camera::OrbitCamera;
use crate::config::{SceneConfig, StepMode};
use glam::Vec3;
use wireorbit_common::GeometryError;
use wireorbit_input::{KeyboardState, poll_actions};
use wireorbit_render::{
    FrameUniforms, GpuBackend, ProgramHandle, RenderError, RenderableObject, ShaderCompiler,
};

/// What the host should do after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Continue,
    Close,
}

/// Owns the scene's objects and the orbit camera, and drives the
/// load/resize/update/render callbacks a window host fires.
///
/// Single-threaded: every callback runs on the thread owning the backend.
#[derive(Debug)]
pub struct SceneController {
    objects: Vec<RenderableObject>,
    camera: OrbitCamera,
    config: SceneConfig,
    program: Option<ProgramHandle>,
}

impl SceneController {
    pub fn new(config: SceneConfig) -> Self {
        let mut camera = OrbitCamera::from_config(&config.camera);
        camera.resize(config.window.width, config.window.height);
        Self {
            objects: Vec::new(),
            camera,
            config,
            program: None,
        }
    }

    /// Append an object; draw order follows insertion order.
    pub fn add_object(&mut self, object: RenderableObject) {
        self.objects.push(object);
    }

    /// Build and append an object from raw geometry and a center.
    pub fn spawn(
        &mut self,
        label: impl Into<String>,
        vertices: &[f32],
        center: Vec3,
    ) -> Result<usize, GeometryError> {
        self.add_object(RenderableObject::new(label, vertices, center)?);
        Ok(self.objects.len() - 1)
    }

    pub fn objects(&self) -> &[RenderableObject] {
        &self.objects
    }

    pub fn object_mut(&mut self, index: usize) -> Option<&mut RenderableObject> {
        self.objects.get_mut(index)
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn program(&self) -> Option<ProgramHandle> {
        self.program
    }

    /// Build the shading program and upload every object. Called once.
    pub fn on_load<B>(
        &mut self,
        backend: &mut B,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<(), RenderError>
    where
        B: GpuBackend + ShaderCompiler + ?Sized,
    {
        let program = backend.compile(vertex_src, fragment_src)?;
        let failed = self
            .objects
            .iter_mut()
            .enumerate()
            .find_map(|(index, object)| {
                object.initialize(backend).err().map(|err| (index, err))
            });
        if let Some((index, err)) = failed {
            // Everything before `index` was uploaded by this call; free it so a
            // retry starts clean.
            for object in &mut self.objects[..index] {
                object.release(backend);
            }
            tracing::warn!(%err, rolled_back = index, "scene load failed");
            return Err(err);
        }
        self.program = Some(program);
        tracing::info!(objects = self.objects.len(), ?program, "scene loaded");
        Ok(())
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
        tracing::info!(width, height, aspect = self.camera.aspect, "projection updated");
    }

    /// Integrate held keys into the orbit angles.
    pub fn on_update<K: KeyboardState + ?Sized>(&mut self, keys: &K, dt: f32) -> UpdateOutcome {
        let input = poll_actions(keys);
        let step = match self.config.camera.step_mode {
            StepMode::PerFrame => self.config.camera.rotation_step,
            StepMode::TimeScaled => self.config.camera.angular_speed * dt,
        };
        self.camera.orbit(input.yaw * step, input.pitch * step);
        if input.close {
            tracing::info!("close requested");
            UpdateOutcome::Close
        } else {
            UpdateOutcome::Continue
        }
    }

    /// Rebuild the view from the current angles and queue every object's draw.
    pub fn on_render<B: GpuBackend + ?Sized>(
        &mut self,
        backend: &mut B,
    ) -> Result<(), RenderError> {
        let Some(program) = self.program else {
            return Err(RenderError::Uninitialized {
                label: "scene".into(),
            });
        };
        let frame = FrameUniforms {
            view: self.camera.update_view(),
            projection: self.camera.projection(),
        };
        backend.begin_frame();
        for object in &self.objects {
            object.render(backend, program, &frame)?;
        }
        tracing::trace!(draws = self.objects.len(), "frame queued");
        Ok(())
    }

    /// Release every object's GPU resources.
    pub fn on_unload<B: GpuBackend + ?Sized>(&mut self, backend: &mut B) {
        for object in &mut self.objects {
            object.release(backend);
        }
        self.program = None;
        tracing::info!("scene unloaded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use glam::Mat4;
    use wireorbit_common::VertexLayout;
    use wireorbit_input::{HeldKeys, Key};
    use wireorbit_render::{DrawCall, MeshHandle, RecordingBackend};

    const EPS: f32 = 1e-6;

    fn loaded(config: SceneConfig) -> (SceneController, RecordingBackend) {
        let mut scene = SceneController::new(config);
        scene
            .spawn("a", &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0], Vec3::ZERO)
            .unwrap();
        scene
            .spawn("b", &[0.0; 36], Vec3::new(3.0, 2.0, 5.0))
            .unwrap();
        let mut backend = RecordingBackend::new();
        scene.on_load(&mut backend, "vs", "fs").unwrap();
        (scene, backend)
    }

    #[test]
    fn four_down_updates_accumulate_pitch() {
        let mut scene = SceneController::new(SceneConfig::default());
        let keys: HeldKeys = [Key::Down].into_iter().collect();
        for _ in 0..4 {
            scene.on_update(&keys, 1.0 / 60.0);
        }
        assert!((scene.camera().pitch - 0.008).abs() < EPS);
    }

    #[test]
    fn left_and_right_move_yaw() {
        let mut scene = SceneController::new(SceneConfig::default());
        let left: HeldKeys = [Key::Left].into_iter().collect();
        scene.on_update(&left, 0.016);
        assert!((scene.camera().yaw + 0.002).abs() < EPS);
        let right: HeldKeys = [Key::Right].into_iter().collect();
        scene.on_update(&right, 0.016);
        scene.on_update(&right, 0.016);
        assert!((scene.camera().yaw - 0.002).abs() < EPS);
    }

    #[test]
    fn per_frame_step_ignores_dt() {
        let mut scene = SceneController::new(SceneConfig::default());
        let keys: HeldKeys = [Key::Up].into_iter().collect();
        scene.on_update(&keys, 5.0);
        assert!((scene.camera().pitch + 0.002).abs() < EPS);
    }

    #[test]
    fn time_scaled_step_uses_dt() {
        let config = SceneConfig {
            camera: CameraConfig {
                step_mode: StepMode::TimeScaled,
                angular_speed: 1.0,
                ..CameraConfig::default()
            },
            ..SceneConfig::default()
        };
        let mut scene = SceneController::new(config);
        let keys: HeldKeys = [Key::Right].into_iter().collect();
        scene.on_update(&keys, 0.25);
        scene.on_update(&keys, 0.5);
        assert!((scene.camera().yaw - 0.75).abs() < EPS);
    }

    #[test]
    fn pitch_never_crosses_the_poles() {
        let mut scene = SceneController::new(SceneConfig::default());
        let up: HeldKeys = [Key::Up].into_iter().collect();
        let limit = std::f32::consts::FRAC_PI_2 - 0.1;
        for _ in 0..2_000 {
            scene.on_update(&up, 0.016);
            assert!(scene.camera().pitch >= -limit);
        }
        let down: HeldKeys = [Key::Down].into_iter().collect();
        for _ in 0..4_000 {
            scene.on_update(&down, 0.016);
            assert!(scene.camera().pitch <= limit);
        }
    }

    #[test]
    fn escape_closes() {
        let mut scene = SceneController::new(SceneConfig::default());
        let keys: HeldKeys = [Key::Escape].into_iter().collect();
        assert_eq!(scene.on_update(&keys, 0.016), UpdateOutcome::Close);
        assert_eq!(
            scene.on_update(&HeldKeys::new(), 0.016),
            UpdateOutcome::Continue
        );
    }

    #[test]
    fn resize_twice_gives_same_projection() {
        let mut scene = SceneController::new(SceneConfig::default());
        scene.on_resize(800, 600);
        let first = scene.camera().projection();
        scene.on_resize(800, 600);
        assert_eq!(first, scene.camera().projection());
    }

    #[test]
    fn render_before_load_fails() {
        let mut scene = SceneController::new(SceneConfig::default());
        let mut backend = RecordingBackend::new();
        assert!(matches!(
            scene.on_render(&mut backend),
            Err(RenderError::Uninitialized { .. })
        ));
    }

    #[test]
    fn load_fails_on_shader_error() {
        let mut scene = SceneController::new(SceneConfig::default());
        let mut backend = RecordingBackend::new();
        let err = scene.on_load(&mut backend, "", "fs").unwrap_err();
        assert!(matches!(err, RenderError::ShaderBuild { .. }));
        assert!(scene.program().is_none());
    }

    /// Recording backend that refuses to upload one named mesh.
    struct Rejecting {
        inner: RecordingBackend,
        reject: Option<&'static str>,
    }

    impl ShaderCompiler for Rejecting {
        fn compile(&mut self, vs: &str, fs: &str) -> Result<ProgramHandle, RenderError> {
            self.inner.compile(vs, fs)
        }
    }

    impl GpuBackend for Rejecting {
        fn create_mesh(
            &mut self,
            label: &str,
            vertices: &[f32],
            layout: &VertexLayout,
        ) -> Result<MeshHandle, RenderError> {
            if self.reject == Some(label) {
                return Err(RenderError::UnsupportedLayout);
            }
            self.inner.create_mesh(label, vertices, layout)
        }

        fn destroy_mesh(&mut self, mesh: MeshHandle) {
            self.inner.destroy_mesh(mesh);
        }

        fn begin_frame(&mut self) {
            self.inner.begin_frame();
        }

        fn draw(&mut self, call: &DrawCall) -> Result<(), RenderError> {
            self.inner.draw(call)
        }
    }

    #[test]
    fn failed_load_rolls_back_and_can_be_retried() {
        let mut scene = SceneController::new(SceneConfig::default());
        scene.spawn("a", &[0.0; 12], Vec3::ZERO).unwrap();
        scene.spawn("b", &[0.0; 12], Vec3::ZERO).unwrap();
        scene.spawn("c", &[0.0; 12], Vec3::ZERO).unwrap();
        let mut backend = Rejecting {
            inner: RecordingBackend::new(),
            reject: Some("c"),
        };

        let err = scene.on_load(&mut backend, "vs", "fs").unwrap_err();
        assert_eq!(err, RenderError::UnsupportedLayout);
        assert!(scene.program().is_none());
        assert_eq!(backend.inner.mesh_count(), 0);
        assert!(scene.objects().iter().all(|o| !o.is_initialized()));

        backend.reject = None;
        scene.on_load(&mut backend, "vs", "fs").unwrap();
        assert!(scene.program().is_some());
        assert_eq!(backend.inner.mesh_count(), 3);
        scene.on_render(&mut backend).unwrap();
        assert_eq!(backend.inner.draws().len(), 3);
    }

    #[test]
    fn empty_object_loads_and_draws_nothing() {
        let mut scene = SceneController::new(SceneConfig::default());
        scene.spawn("empty", &[], Vec3::ZERO).unwrap();
        scene.spawn("pair", &[0.0; 12], Vec3::ZERO).unwrap();
        let mut backend = RecordingBackend::new();
        scene.on_load(&mut backend, "vs", "fs").unwrap();
        scene.on_render(&mut backend).unwrap();
        let draws = backend.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(backend.mesh_label(draws[0].mesh), Some("pair"));
    }

    #[test]
    fn render_draws_objects_in_order_with_shared_frame() {
        let (mut scene, mut backend) = loaded(SceneConfig::default());
        scene.on_render(&mut backend).unwrap();
        let draws = backend.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].vertices, 0..2);
        assert_eq!(draws[1].vertices, 0..6);
        assert_eq!(backend.mesh_label(draws[0].mesh), Some("a"));
        assert_eq!(backend.mesh_label(draws[1].mesh), Some("b"));
        assert_eq!(draws[0].frame, draws[1].frame);
        assert_eq!(draws[0].frame.projection, scene.camera().projection());
        assert_eq!(
            draws[0].frame.view,
            Mat4::look_at_rh(Vec3::new(0.0, 0.0, 20.0), Vec3::ZERO, Vec3::Y)
        );
    }

    #[test]
    fn view_is_rebuilt_every_frame() {
        let (mut scene, mut backend) = loaded(SceneConfig::default());
        scene.on_render(&mut backend).unwrap();
        let before = backend.draws()[0].frame.view;
        scene.camera_mut().orbit(0.5, 0.2);
        scene.on_render(&mut backend).unwrap();
        let after = backend.draws()[0].frame.view;
        assert_ne!(before, after);
        assert_eq!(backend.frame_count(), 2);
    }

    #[test]
    fn each_object_keeps_its_own_model() {
        let (mut scene, mut backend) = loaded(SceneConfig::default());
        let spin = Mat4::from_rotation_z(1.0);
        scene.object_mut(1).unwrap().set_transform(spin);
        scene.on_render(&mut backend).unwrap();
        let draws = backend.draws();
        assert_eq!(draws[0].model, Mat4::IDENTITY);
        assert_eq!(draws[1].model, spin);
    }

    #[test]
    fn unload_releases_every_mesh() {
        let (mut scene, mut backend) = loaded(SceneConfig::default());
        assert_eq!(backend.mesh_count(), 2);
        scene.on_unload(&mut backend);
        assert_eq!(backend.mesh_count(), 0);
        assert!(scene.objects().iter().all(|o| !o.is_initialized()));
    }

    #[test]
    fn spawn_rejects_malformed_geometry() {
        let mut scene = SceneController::new(SceneConfig::default());
        assert!(scene.spawn("bad", &[1.0; 4], Vec3::ZERO).is_err());
        assert!(scene.objects().is_empty());
    }
}
