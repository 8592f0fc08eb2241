use glam::Vec3;
use log::{debug, info, warn};
use wgpu::util::DeviceExt;

use crate::cloth::config::ClothConfig;
use crate::cloth::frames::FrameRing;
use crate::cloth::phases::{Phase, StepSchedule};
use crate::cloth::pipelines::{ClothPipelines, ComputeKernel};
use crate::cloth::timestep::FixedTimestep;
use crate::cloth::topology::{ConstraintKind, Topology};
use crate::cloth::types::{
    Constraint, ConstraintPushConstants, GridPushConstants, SimulationParams, workgroup_count,
};
use crate::error::ClothError;

// Per frame in flight: the parameter uniform and one bind group per kernel
struct FrameContext {
    params_buffer: wgpu::Buffer,
    integrate_bind_group: wgpu::BindGroup,
    constraint_bind_group: wgpu::BindGroup,
    normal_bind_group: wgpu::BindGroup,
}

impl FrameContext {
    fn bind_group(&self, phase: Phase) -> Option<&wgpu::BindGroup> {
        match phase {
            Phase::Integrate => Some(&self.integrate_bind_group),
            Phase::Constraint { .. } => Some(&self.constraint_bind_group),
            Phase::Normal => Some(&self.normal_bind_group),
            Phase::Draw => None,
        }
    }
}

/// Mass-spring cloth stepped entirely on the GPU.
///
/// Owns the particle, constraint and index buffers (shared by every frame) and
/// one [`FrameContext`] per frame in flight. Each fixed step records the
/// Integrate, Constraint and Normal kernels into the caller's encoder, with a
/// compute pass boundary wherever [`StepSchedule`] places a barrier.
pub struct ClothSimulation {
    config: ClothConfig,
    params: SimulationParams,
    timestep: FixedTimestep,
    schedule: StepSchedule,

    particle_count: u32,
    constraint_count: u32,
    index_count: u32,

    particle_buffer: wgpu::Buffer,
    // Kept alive for the bind groups that reference it
    _constraint_buffer: wgpu::Buffer,
    index_buffer: Option<wgpu::Buffer>,

    pipelines: ClothPipelines,
    frames: FrameRing<FrameContext>,
}

/// Rejects grids that have no particles or cannot be indexed with `u32`.
pub(crate) fn validate_grid(config: &ClothConfig) -> Result<u32, ClothError> {
    let (width, height) = (config.grid_width(), config.grid_height());
    match config.checked_particle_count() {
        None => Err(ClothError::GridTooLarge { width, height }),
        Some(0) => Err(ClothError::EmptyGrid { width, height }),
        Some(count) => Ok(count),
    }
}

impl ClothSimulation {
    pub fn new(device: &wgpu::Device, config: ClothConfig) -> Result<Self, ClothError> {
        validate_grid(&config)?;
        let topology = Topology::build(&config);
        if topology.constraints.is_empty() || topology.indices.is_empty() {
            warn!(
                "Cloth grid {}x{} is degenerate: {} constraints, {} indices",
                config.grid_width(),
                config.grid_height(),
                topology.constraints.len(),
                topology.indices.len()
            );
        }

        let particle_count = topology.particles.len() as u32;
        let constraint_count = topology.constraints.len() as u32;
        let index_count = topology.indices.len() as u32;

        let particle_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cloth Particle Buffer"),
            contents: bytemuck::cast_slice(&topology.particles),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });

        // Storage bindings cannot be empty, so a grid without springs still gets one inert record
        let placeholder = [Constraint {
            particle_a: 0,
            particle_b: 0,
            rest_length: 0.0,
            stiffness: 0.0,
        }];
        let constraint_data: &[Constraint] = if topology.constraints.is_empty() {
            &placeholder
        } else {
            &topology.constraints
        };
        let constraint_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cloth Constraint Buffer"),
            contents: bytemuck::cast_slice(constraint_data),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let index_buffer = (!topology.indices.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Cloth Index Buffer"),
                contents: bytemuck::cast_slice(&topology.indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        let mut params = config.simulation_params();
        let timestep = FixedTimestep::default();
        params.delta_time = timestep.step();

        let pipelines = ClothPipelines::new(device);
        let frames = FrameRing::new(|slot| {
            let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("Cloth Params Buffer {}", slot)),
                contents: bytemuck::bytes_of(&params),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
            let bind_group = |kernel: &ComputeKernel| {
                pipelines.create_bind_group(
                    device,
                    &format!("{} Bind Group {}", kernel.name, slot),
                    &particle_buffer,
                    &constraint_buffer,
                    &params_buffer,
                )
            };
            FrameContext {
                integrate_bind_group: bind_group(&pipelines.integrate),
                constraint_bind_group: bind_group(&pipelines.constraint),
                normal_bind_group: bind_group(&pipelines.normal),
                params_buffer,
            }
        });

        let schedule = StepSchedule::new(config.constraint_iterations(), constraint_count > 0);

        info!(
            "Cloth simulation ready: {}x{} grid, {} particles, {} constraints ({} structural, {} shear, {} bend), {} indices",
            config.grid_width(),
            config.grid_height(),
            particle_count,
            constraint_count,
            topology.count_of(ConstraintKind::Structural),
            topology.count_of(ConstraintKind::Shear),
            topology.count_of(ConstraintKind::Bend),
            index_count
        );
        debug!(
            "Cloth step schedule: {} phases, {} barriers",
            schedule.phases().len(),
            schedule.barrier_count()
        );

        Ok(Self {
            config,
            params,
            timestep,
            schedule,
            particle_count,
            constraint_count,
            index_count,
            particle_buffer,
            _constraint_buffer: constraint_buffer,
            index_buffer,
            pipelines,
            frames,
        })
    }

    /// Banks frame time for the next [`simulate`](Self::simulate) call.
    pub fn update(&mut self, delta_time: f32) {
        self.timestep.accumulate(delta_time);
    }

    /// Records every whole fixed step currently banked and returns how many ran.
    pub fn simulate(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        frame_index: usize,
    ) -> u32 {
        let steps = self.timestep.drain();
        if steps == 0 {
            return 0;
        }

        // Staged writes land before any command buffer submitted afterwards,
        // so one upload covers every step recorded this frame
        self.params.delta_time = self.timestep.step();
        let frame = self.frames.get(frame_index);
        queue.write_buffer(&frame.params_buffer, 0, bytemuck::bytes_of(&self.params));

        for _ in 0..steps {
            self.record_step(encoder, frame);
        }

        steps
    }

    fn record_step(&self, encoder: &mut wgpu::CommandEncoder, frame: &FrameContext) {
        for pass_phases in self.schedule.passes() {
            let Some(first) = pass_phases.first() else {
                continue;
            };
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(first.phase.label()),
                timestamp_writes: None,
            });
            for scheduled in pass_phases {
                self.dispatch(&mut compute_pass, frame, scheduled.phase);
            }
        }
    }

    fn dispatch(&self, compute_pass: &mut wgpu::ComputePass<'_>, frame: &FrameContext, phase: Phase) {
        let Some(bind_group) = frame.bind_group(phase) else {
            return;
        };

        match phase {
            Phase::Integrate => {
                compute_pass.set_pipeline(&self.pipelines.integrate.pipeline);
                compute_pass.set_bind_group(0, bind_group, &[]);
                compute_pass.dispatch_workgroups(workgroup_count(self.particle_count), 1, 1);
            }
            Phase::Constraint { .. } => {
                let constants = ConstraintPushConstants {
                    constraint_count: self.constraint_count,
                    _padding: 0,
                };
                compute_pass.set_pipeline(&self.pipelines.constraint.pipeline);
                compute_pass.set_bind_group(0, bind_group, &[]);
                compute_pass.set_push_constants(0, bytemuck::bytes_of(&constants));
                compute_pass.dispatch_workgroups(workgroup_count(self.constraint_count), 1, 1);
            }
            Phase::Normal => {
                let constants = GridPushConstants {
                    grid_width: self.config.grid_width(),
                    grid_height: self.config.grid_height(),
                };
                compute_pass.set_pipeline(&self.pipelines.normal.pipeline);
                compute_pass.set_bind_group(0, bind_group, &[]);
                compute_pass.set_push_constants(0, bytemuck::bytes_of(&constants));
                compute_pass.dispatch_workgroups(workgroup_count(self.particle_count), 1, 1);
            }
            Phase::Draw => {}
        }
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.config.set_gravity(gravity);
        self.params.gravity = gravity.extend(0.0).to_array();
    }

    pub fn set_wind(&mut self, direction: Vec3, speed: f32) {
        self.config.set_wind(direction, speed);
        self.params.wind = direction.extend(speed).to_array();
    }

    pub fn set_damping(&mut self, damping: f32) {
        self.config.set_damping(damping);
        self.params.damping = damping;
    }

    pub fn config(&self) -> &ClothConfig {
        &self.config
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn particle_buffer(&self) -> &wgpu::Buffer {
        &self.particle_buffer
    }

    pub fn index_buffer(&self) -> Option<&wgpu::Buffer> {
        self.index_buffer.as_ref()
    }

    pub fn particle_count(&self) -> u32 {
        self.particle_count
    }

    pub fn constraint_count(&self) -> u32 {
        self.constraint_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Whether the last recorded step must be fenced off from the vertex stage.
    pub fn needs_draw_barrier(&self) -> bool {
        self.schedule.barrier_before_draw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_grid_is_rejected() {
        let config = ClothConfig::new().with_grid_size(0, 12);
        assert_eq!(
            validate_grid(&config),
            Err(ClothError::EmptyGrid {
                width: 0,
                height: 12
            })
        );
    }

    #[test]
    fn unindexable_grid_is_rejected() {
        let config = ClothConfig::new().with_grid_size(u32::MAX, 2);
        assert_eq!(
            validate_grid(&config),
            Err(ClothError::GridTooLarge {
                width: u32::MAX,
                height: 2
            })
        );
    }

    #[test]
    fn degenerate_strip_is_accepted() {
        assert_eq!(validate_grid(&ClothConfig::new().with_grid_size(1, 9)), Ok(9));
    }
}
