use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

// Per-frame uniforms read by the cloth mesh shader
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub time: f32, // seconds since the pass was initialized
}

const _: () = assert!(std::mem::size_of::<SceneUniforms>() == 80);

impl Default for SceneUniforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Vec3::ZERO, 0.0)
    }
}

impl SceneUniforms {
    pub fn new(view_proj: Mat4, camera_position: Vec3, time: f32) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_position: camera_position.to_array(),
            time,
        }
    }
}
