use glam::{Mat4, Vec3};
use log::{debug, error, info};

use crate::cloth::config::ClothConfig;
use crate::cloth::simulation::ClothSimulation;
use crate::error::ClothError;
use crate::rendering::cloth_mesh::ClothMesh;
use crate::rendering::context::{GpuContext, RenderTargets};
use crate::rendering::render_pass::create_overlay_render_pass;
use crate::rendering::scene::SceneUniforms;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PassState {
    Uninitialized,
    Enabled,
    Disabled,
}

/// Owns a set of resources that is built once, may be paused, and can be torn
/// down and built again.
#[derive(Debug)]
pub(crate) struct Lifecycle<T> {
    resources: Option<T>,
    enabled: bool,
}

impl<T> Lifecycle<T> {
    pub(crate) fn new() -> Self {
        Self {
            resources: None,
            enabled: true,
        }
    }

    /// Runs `build` only when nothing is built yet.
    pub(crate) fn initialize<E>(&mut self, build: impl FnOnce() -> Result<T, E>) -> Result<(), E> {
        if self.resources.is_none() {
            self.resources = Some(build()?);
        }
        Ok(())
    }

    pub(crate) fn state(&self) -> PassState {
        match (&self.resources, self.enabled) {
            (None, _) => PassState::Uninitialized,
            (Some(_), true) => PassState::Enabled,
            (Some(_), false) => PassState::Disabled,
        }
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn get(&self) -> Option<&T> {
        self.resources.as_ref()
    }

    pub(crate) fn get_mut(&mut self) -> Option<&mut T> {
        self.resources.as_mut()
    }

    /// The resources, but only while initialized and enabled.
    pub(crate) fn active_mut(&mut self) -> Option<&mut T> {
        if self.enabled { self.resources.as_mut() } else { None }
    }

    pub(crate) fn take(&mut self) -> Option<T> {
        self.resources.take()
    }
}

struct ClothResources {
    simulation: ClothSimulation,
    mesh: ClothMesh,
}

/// Render-graph facing wrapper around one [`ClothSimulation`] and its [`ClothMesh`].
pub struct ClothRenderPass {
    config: ClothConfig,
    lifecycle: Lifecycle<ClothResources>,
    model: Mat4,
    view_proj: Mat4,
    camera_position: Vec3,
    elapsed: f32,
}

impl ClothRenderPass {
    pub fn new(config: ClothConfig) -> Self {
        Self {
            config,
            lifecycle: Lifecycle::new(),
            model: Mat4::IDENTITY,
            view_proj: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            elapsed: 0.0,
        }
    }

    /// Builds the simulation, then the mesh on top of its buffers. Does nothing
    /// when already initialized.
    pub fn initialize(&mut self, ctx: &GpuContext) -> bool {
        if self.is_initialized() {
            return true;
        }

        let config = self.config.clone();
        let model = self.model;
        let result = self.lifecycle.initialize(|| {
            let simulation = ClothSimulation::new(&ctx.device, config)?;
            let mut mesh = ClothMesh::new(ctx, &simulation);
            mesh.set_model(model);
            Ok::<_, ClothError>(ClothResources { simulation, mesh })
        });

        match result {
            Ok(()) => {
                self.elapsed = 0.0;
                info!("Cloth render pass initialized");
                true
            }
            Err(e) => {
                error!("Cloth render pass failed to initialize: {}", e);
                false
            }
        }
    }

    pub fn update(&mut self, delta_time: f32, _frame_index: usize) {
        let Some(resources) = self.lifecycle.active_mut() else {
            return;
        };
        resources.simulation.update(delta_time);
        self.elapsed += delta_time;
    }

    /// Steps the simulation and draws the result into `targets`.
    pub fn render(
        &mut self,
        ctx: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        targets: &RenderTargets<'_>,
        frame_index: usize,
    ) {
        let Some(resources) = self.lifecycle.active_mut() else {
            return;
        };

        resources
            .simulation
            .simulate(&ctx.queue, encoder, frame_index);

        let scene = SceneUniforms::new(self.view_proj, self.camera_position, self.elapsed);
        resources.mesh.update_scene(&ctx.queue, frame_index, &scene);

        // A new render pass begins only after every compute pass above, which
        // fences the vertex stage off from the last Normal dispatch
        debug_assert!(
            resources.simulation.needs_draw_barrier(),
            "the draw reads particle data written by the final phase"
        );
        let mut render_pass = create_overlay_render_pass(encoder, targets, "Cloth Render Pass");
        resources
            .mesh
            .draw(&mut render_pass, &resources.simulation, frame_index);
    }

    /// Mesh first, then the simulation whose buffers it reads.
    pub fn cleanup(&mut self) {
        if let Some(ClothResources { simulation, mesh }) = self.lifecycle.take() {
            drop(mesh);
            drop(simulation);
            info!("Cloth render pass cleaned up");
        }
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.config = self.config.clone().with_gravity(gravity);
        if let Some(resources) = self.lifecycle.get_mut() {
            resources.simulation.set_gravity(gravity);
        }
        debug!("Cloth gravity set to {:?}", gravity);
    }

    pub fn set_wind(&mut self, direction: Vec3, speed: f32) {
        self.config = self.config.clone().with_wind(direction, speed);
        if let Some(resources) = self.lifecycle.get_mut() {
            resources.simulation.set_wind(direction, speed);
        }
        debug!("Cloth wind set to {:?} at {}", direction, speed);
    }

    pub fn set_damping(&mut self, damping: f32) {
        self.config = self.config.clone().with_damping(damping);
        if let Some(resources) = self.lifecycle.get_mut() {
            resources.simulation.set_damping(damping);
        }
        debug!("Cloth damping set to {}", damping);
    }

    pub fn set_camera(&mut self, view_proj: Mat4, camera_position: Vec3) {
        self.view_proj = view_proj;
        self.camera_position = camera_position;
    }

    pub fn set_model(&mut self, model: Mat4) {
        self.model = model;
        if let Some(resources) = self.lifecycle.get_mut() {
            resources.mesh.set_model(model);
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.lifecycle.set_enabled(enabled);
        info!("Cloth render pass {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn is_enabled(&self) -> bool {
        self.lifecycle.is_enabled()
    }

    pub fn is_initialized(&self) -> bool {
        self.lifecycle.state() != PassState::Uninitialized
    }

    pub fn state(&self) -> PassState {
        self.lifecycle.state()
    }

    pub fn config(&self) -> &ClothConfig {
        &self.config
    }

    pub fn simulation(&self) -> Option<&ClothSimulation> {
        self.lifecycle.get().map(|resources| &resources.simulation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_builds_once() {
        let mut lifecycle: Lifecycle<u32> = Lifecycle::new();
        let mut builds = 0;
        for _ in 0..3 {
            lifecycle
                .initialize(|| {
                    builds += 1;
                    Ok::<_, ()>(7)
                })
                .unwrap();
        }
        assert_eq!(builds, 1);
        assert_eq!(lifecycle.state(), PassState::Enabled);
    }

    #[test]
    fn failed_build_stays_uninitialized() {
        let mut lifecycle: Lifecycle<u32> = Lifecycle::new();
        assert_eq!(lifecycle.initialize(|| Err("no device")), Err("no device"));
        assert_eq!(lifecycle.state(), PassState::Uninitialized);
        assert!(lifecycle.active_mut().is_none());
    }

    #[test]
    fn disabled_resources_are_not_active() {
        let mut lifecycle: Lifecycle<u32> = Lifecycle::new();
        lifecycle.initialize(|| Ok::<_, ()>(1)).unwrap();
        lifecycle.set_enabled(false);
        assert_eq!(lifecycle.state(), PassState::Disabled);
        assert!(lifecycle.active_mut().is_none());
        assert_eq!(lifecycle.get(), Some(&1));
        lifecycle.set_enabled(true);
        assert_eq!(lifecycle.active_mut(), Some(&mut 1));
    }

    #[test]
    fn cleanup_allows_rebuilding() {
        let mut lifecycle: Lifecycle<u32> = Lifecycle::new();
        let mut builds = 0;
        let mut build = || {
            builds += 1;
            Ok::<_, ()>(builds)
        };
        lifecycle.initialize(&mut build).unwrap();
        assert_eq!(lifecycle.take(), Some(1));
        assert_eq!(lifecycle.state(), PassState::Uninitialized);
        lifecycle.initialize(&mut build).unwrap();
        assert_eq!(lifecycle.get(), Some(&2));
    }

    #[test]
    fn setters_update_config_before_initialization() {
        let mut pass = ClothRenderPass::new(ClothConfig::default());
        pass.set_gravity(Vec3::ZERO);
        pass.set_wind(Vec3::Z, 3.0);
        pass.set_damping(0.5);
        assert_eq!(pass.config().gravity(), Vec3::ZERO);
        assert_eq!(pass.config().wind_direction(), Vec3::Z);
        assert_eq!(pass.config().wind_speed(), 3.0);
        assert_eq!(pass.config().damping(), 0.5);
        assert_eq!(pass.state(), PassState::Uninitialized);
        assert!(pass.simulation().is_none());
    }
}
