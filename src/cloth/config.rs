use glam::Vec3;

use crate::cloth::types::{FIXED_TIMESTEP, SimulationParams};

/// Simulation parameters for one piece of cloth.
///
/// Built fluently from [`ClothConfig::default`]; every setter replaces a single
/// field and hands the value back for chaining. Inputs are taken as given, so a
/// grid with a dimension of 0 or 1 is accepted here and only produces empty
/// constraint families later on.
#[derive(Debug, Clone, PartialEq)]
pub struct ClothConfig {
    grid_width: u32,
    grid_height: u32,
    spacing: f32,
    mass: f32,
    stiffness: f32,
    damping: f32,
    friction: f32,
    constraint_iterations: u32,
    gravity: Vec3,
    wind_direction: Vec3,
    wind_speed: f32,
    pinned_corners: bool,
}

impl Default for ClothConfig {
    fn default() -> Self {
        Self {
            grid_width: 32,
            grid_height: 32,
            spacing: 0.1,
            mass: 1.0,
            stiffness: 0.8,
            damping: 0.98,
            friction: 0.1,
            constraint_iterations: 3,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            wind_direction: Vec3::X,
            wind_speed: 0.5,
            pinned_corners: true,
        }
    }
}

impl ClothConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grid_size(mut self, width: u32, height: u32) -> Self {
        self.grid_width = width;
        self.grid_height = height;
        self
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_stiffness(mut self, stiffness: f32) -> Self {
        self.stiffness = stiffness;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_constraint_iterations(mut self, iterations: u32) -> Self {
        self.constraint_iterations = iterations;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_wind(mut self, direction: Vec3, speed: f32) -> Self {
        self.wind_direction = direction;
        self.wind_speed = speed;
        self
    }

    pub fn with_pinned_corners(mut self, pinned: bool) -> Self {
        self.pinned_corners = pinned;
        self
    }

    pub fn grid_width(&self) -> u32 {
        self.grid_width
    }

    pub fn grid_height(&self) -> u32 {
        self.grid_height
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Inverse mass written into `position.w` of every free particle.
    pub fn inverse_mass(&self) -> f32 {
        1.0 / self.mass
    }

    pub fn stiffness(&self) -> f32 {
        self.stiffness
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }

    pub fn constraint_iterations(&self) -> u32 {
        self.constraint_iterations
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn wind_direction(&self) -> Vec3 {
        self.wind_direction
    }

    pub fn wind_speed(&self) -> f32 {
        self.wind_speed
    }

    pub fn pinned_corners(&self) -> bool {
        self.pinned_corners
    }

    /// Saturates at `u32::MAX` for grids too large to index.
    pub fn particle_count(&self) -> u32 {
        self.grid_width.saturating_mul(self.grid_height)
    }

    /// `None` when the grid cannot be addressed with `u32` indices.
    pub fn checked_particle_count(&self) -> Option<u32> {
        self.grid_width.checked_mul(self.grid_height)
    }

    // Live tuning goes through the simulation, which keeps its uniform mirror in sync.
    pub(crate) fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    pub(crate) fn set_wind(&mut self, direction: Vec3, speed: f32) {
        self.wind_direction = direction;
        self.wind_speed = speed;
    }

    pub(crate) fn set_damping(&mut self, damping: f32) {
        self.damping = damping;
    }

    /// Device-side parameter block for this configuration at the fixed step.
    pub fn simulation_params(&self) -> SimulationParams {
        SimulationParams {
            gravity: self.gravity.extend(0.0).to_array(),
            wind: self.wind_direction.extend(self.wind_speed).to_array(),
            delta_time: FIXED_TIMESTEP,
            damping: self.damping,
            constraint_iterations: self.constraint_iterations,
            particle_count: self.particle_count(),
            friction: self.friction,
            _padding: [0.0; 3],
        }
    }
}
