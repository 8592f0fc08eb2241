use bytemuck::{Pod, Zeroable};

// Constants for simulation
pub const COMPUTE_WORKGROUP_SIZE: u32 = 256;
pub const FRAMES_IN_FLIGHT: usize = 2;
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

// A single point mass of the cloth grid
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Particle {
    pub position: [f32; 4], // xyz = position, w = inverse mass (0 = pinned)
    pub velocity: [f32; 4], // xyz = velocity, w = unused
    pub normal: [f32; 4],   // xyz = normal, w = unused
}

impl Particle {
    pub fn new(position: [f32; 3], inverse_mass: f32) -> Self {
        Self {
            position: [position[0], position[1], position[2], inverse_mass],
            velocity: [0.0; 4],
            normal: [0.0, 1.0, 0.0, 0.0],
        }
    }

    pub fn inverse_mass(&self) -> f32 {
        self.position[3]
    }

    pub fn is_pinned(&self) -> bool {
        self.position[3] == 0.0
    }

    pub fn pin(&mut self) {
        self.position[3] = 0.0;
    }
}

// A spring between two particles, immutable after generation
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Constraint {
    pub particle_a: u32,
    pub particle_b: u32,
    pub rest_length: f32,
    pub stiffness: f32, // in [0, 1]
}

// Uniform block shared by all three compute kernels
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SimulationParams {
    pub gravity: [f32; 4],
    pub wind: [f32; 4], // xyz = direction, w = speed
    pub delta_time: f32,
    pub damping: f32,
    pub constraint_iterations: u32,
    pub particle_count: u32,
    pub friction: f32,
    pub _padding: [f32; 3], // Uniform structs are sized in multiples of 16
}

// Push constants for the constraint kernel, re-sent on every iteration
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ConstraintPushConstants {
    pub constraint_count: u32,
    pub _padding: u32,
}

// Push constants for the normal kernel
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct GridPushConstants {
    pub grid_width: u32,
    pub grid_height: u32,
}

// Layouts are shared verbatim with the WGSL kernels
const _: () = assert!(std::mem::size_of::<Particle>() == 48);
const _: () = assert!(std::mem::size_of::<Constraint>() == 16);
const _: () = assert!(std::mem::size_of::<SimulationParams>() == 64);
const _: () = assert!(std::mem::size_of::<ConstraintPushConstants>() == 8);
const _: () = assert!(std::mem::size_of::<GridPushConstants>() == 8);

/// Number of workgroups needed to cover `count` invocations.
pub fn workgroup_count(count: u32) -> u32 {
    count.div_ceil(COMPUTE_WORKGROUP_SIZE)
}
