//! Literal geometry for the default scene.
//!
//! Each array is interleaved position/color, two vertices per line segment.

use glam::Vec3;

/// Block letter U: front and back outlines joined by eight depth edges.
/// 48 white vertices.
#[rustfmt::skip]
pub const LETTER_U: [f32; 288] = [
     -0.8,  -1.0,  -0.5,  1.0, 1.0, 1.0,
     -0.8,   1.0,  -0.5,  1.0, 1.0, 1.0,

      0.8,  -1.0,  -0.5,  1.0, 1.0, 1.0,
      0.8,   1.0,  -0.5,  1.0, 1.0, 1.0,

     -0.8,  -1.0,  -0.5,  1.0, 1.0, 1.0,
      0.8,  -1.0,  -0.5,  1.0, 1.0, 1.0,

     -0.3,  -0.5,  -0.5,  1.0, 1.0, 1.0,
      0.3,  -0.5,  -0.5,  1.0, 1.0, 1.0,

     -0.3,   1.0,  -0.5,  1.0, 1.0, 1.0,
     -0.3,  -0.5,  -0.5,  1.0, 1.0, 1.0,

      0.3,   1.0,  -0.5,  1.0, 1.0, 1.0,
      0.3,  -0.5,  -0.5,  1.0, 1.0, 1.0,

     -0.8,   1.0,  -0.5,  1.0, 1.0, 1.0,
     -0.3,   1.0,  -0.5,  1.0, 1.0, 1.0,

      0.8,   1.0,  -0.5,  1.0, 1.0, 1.0,
      0.3,   1.0,  -0.5,  1.0, 1.0, 1.0,

     -0.8,  -1.0,   0.5,  1.0, 1.0, 1.0,
     -0.8,   1.0,   0.5,  1.0, 1.0, 1.0,

      0.8,  -1.0,   0.5,  1.0, 1.0, 1.0,
      0.8,   1.0,   0.5,  1.0, 1.0, 1.0,

     -0.8,  -1.0,   0.5,  1.0, 1.0, 1.0,
      0.8,  -1.0,   0.5,  1.0, 1.0, 1.0,

     -0.3,  -0.5,   0.5,  1.0, 1.0, 1.0,
      0.3,  -0.5,   0.5,  1.0, 1.0, 1.0,

     -0.3,   1.0,   0.5,  1.0, 1.0, 1.0,
     -0.3,  -0.5,   0.5,  1.0, 1.0, 1.0,

      0.3,   1.0,   0.5,  1.0, 1.0, 1.0,
      0.3,  -0.5,   0.5,  1.0, 1.0, 1.0,

     -0.8,   1.0,   0.5,  1.0, 1.0, 1.0,
     -0.3,   1.0,   0.5,  1.0, 1.0, 1.0,

      0.8,   1.0,   0.5,  1.0, 1.0, 1.0,
      0.3,   1.0,   0.5,  1.0, 1.0, 1.0,

     -0.8,   1.0,  -0.5,  1.0, 1.0, 1.0,
     -0.8,   1.0,   0.5,  1.0, 1.0, 1.0,

      0.8,   1.0,  -0.5,  1.0, 1.0, 1.0,
      0.8,   1.0,   0.5,  1.0, 1.0, 1.0,

     -0.8,  -1.0,  -0.5,  1.0, 1.0, 1.0,
     -0.8,  -1.0,   0.5,  1.0, 1.0, 1.0,

      0.8,  -1.0,  -0.5,  1.0, 1.0, 1.0,
      0.8,  -1.0,   0.5,  1.0, 1.0, 1.0,

     -0.3,  -0.5,  -0.5,  1.0, 1.0, 1.0,
     -0.3,  -0.5,   0.5,  1.0, 1.0, 1.0,

      0.3,  -0.5,  -0.5,  1.0, 1.0, 1.0,
      0.3,  -0.5,   0.5,  1.0, 1.0, 1.0,

     -0.3,   1.0,  -0.5,  1.0, 1.0, 1.0,
     -0.3,   1.0,   0.5,  1.0, 1.0, 1.0,

      0.3,   1.0,  -0.5,  1.0, 1.0, 1.0,
      0.3,   1.0,   0.5,  1.0, 1.0, 1.0,
];

/// Axis triad spanning ±5: X green, Y blue, Z red.
#[rustfmt::skip]
pub const AXES: [f32; 36] = [
     -5.0,   0.0,   0.0,  0.0, 1.0, 0.0,
      5.0,   0.0,   0.0,  0.0, 1.0, 0.0,

      0.0,  -5.0,   0.0,  0.0, 0.0, 1.0,
      0.0,   5.0,   0.0,  0.0, 0.0, 1.0,

      0.0,   0.0,  -5.0,  1.0, 0.0, 0.0,
      0.0,   0.0,   5.0,  1.0, 0.0, 0.0,
];

/// Unit cube outline with a color per corner. 24 vertices.
#[rustfmt::skip]
pub const CUBE: [f32; 144] = [
     -0.5,  -0.5,   0.5,  1.0, 0.0, 0.0,
     -0.5,   0.5,   0.5,  0.0, 1.0, 0.0,

     -0.5,   0.5,   0.5,  0.0, 1.0, 0.0,
      0.5,   0.5,   0.5,  0.0, 0.0, 1.0,

      0.5,   0.5,   0.5,  0.0, 0.0, 1.0,
      0.5,  -0.5,   0.5,  1.0, 0.647, 0.0,

      0.5,  -0.5,   0.5,  1.0, 0.647, 0.0,
     -0.5,  -0.5,   0.5,  1.0, 0.0, 0.0,

     -0.5,  -0.5,  -0.5,  1.0, 0.0, 0.0,
     -0.5,   0.5,  -0.5,  0.0, 1.0, 0.0,

     -0.5,   0.5,  -0.5,  0.0, 1.0, 0.0,
      0.5,   0.5,  -0.5,  0.0, 0.0, 1.0,

      0.5,   0.5,  -0.5,  0.0, 0.0, 1.0,
      0.5,  -0.5,  -0.5,  1.0, 0.647, 0.0,

      0.5,  -0.5,  -0.5,  1.0, 0.647, 0.0,
     -0.5,  -0.5,  -0.5,  1.0, 0.0, 0.0,

     -0.5,  -0.5,   0.5,  1.0, 0.0, 0.0,
     -0.5,  -0.5,  -0.5,  1.0, 0.0, 0.0,

      0.5,  -0.5,   0.5,  1.0, 0.647, 0.0,
      0.5,  -0.5,  -0.5,  1.0, 0.647, 0.0,

     -0.5,   0.5,   0.5,  0.0, 1.0, 0.0,
     -0.5,   0.5,  -0.5,  0.0, 1.0, 0.0,

      0.5,   0.5,   0.5,  0.0, 0.0, 1.0,
      0.5,   0.5,  -0.5,  0.0, 0.0, 1.0,
];

/// One object of the default scene: label, local geometry, center.
pub struct Fixture {
    pub label: &'static str,
    pub vertices: &'static [f32],
    pub center: Vec3,
}

/// The default scene in draw order.
pub fn default_scene() -> [Fixture; 3] {
    [
        Fixture {
            label: "letter_u",
            vertices: &LETTER_U,
            center: Vec3::new(-2.0, -2.0, -2.0),
        },
        Fixture {
            label: "axes",
            vertices: &AXES,
            center: Vec3::ZERO,
        },
        Fixture {
            label: "cube",
            vertices: &CUBE,
            center: Vec3::new(3.0, 2.0, 5.0),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::controller::SceneController;
    use wireorbit_render::RecordingBackend;

    #[test]
    fn fixtures_are_whole_segments() {
        for fixture in default_scene() {
            assert!(wireorbit_common::validate(fixture.vertices).is_ok());
            // Line lists need an even vertex count.
            assert_eq!(wireorbit_common::vertex_count(fixture.vertices) % 2, 0);
        }
    }

    #[test]
    fn fixture_vertex_counts() {
        let counts: Vec<usize> = default_scene()
            .iter()
            .map(|f| wireorbit_common::vertex_count(f.vertices))
            .collect();
        assert_eq!(counts, vec![48, 6, 24]);
    }

    #[test]
    fn default_scene_draws_actual_counts() {
        let mut scene = SceneController::new(SceneConfig::default());
        for f in default_scene() {
            scene.spawn(f.label, f.vertices, f.center).unwrap();
        }
        let mut backend = RecordingBackend::new();
        scene.on_load(&mut backend, "vs", "fs").unwrap();
        scene.on_render(&mut backend).unwrap();
        let ranges: Vec<_> = backend.draws().iter().map(|d| d.vertices.clone()).collect();
        assert_eq!(ranges, vec![0..48, 0..6, 0..24]);
    }

    #[test]
    fn cube_is_centered_after_bake() {
        let f = &default_scene()[2];
        let scene_obj =
            wireorbit_render::RenderableObject::new(f.label, f.vertices, f.center).unwrap();
        let n = scene_obj.vertex_count() as usize;
        let sum: Vec3 = (0..n).filter_map(|i| scene_obj.world_position(i)).sum();
        assert!((sum / n as f32 - f.center).length() < 1e-5);
    }
}
