use glam::Mat4;
use log::{Level, log};
use wgpu::util::DeviceExt;

use crate::cloth::frames::FrameRing;
use crate::cloth::simulation::ClothSimulation;
use crate::rendering::context::GpuContext;
use crate::rendering::scene::SceneUniforms;

// Counts draws skipped for missing index data
#[derive(Debug, Default)]
struct SkippedDraws {
    count: u64,
}

impl SkippedDraws {
    /// Level to report the next skip at: warn on the first, debug afterwards.
    fn record(&mut self) -> Level {
        self.count += 1;
        if self.count == 1 { Level::Warn } else { Level::Debug }
    }
}

struct MeshFrame {
    scene_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Draws the cloth straight from the simulation's particle buffer.
///
/// Binding 0 is the live particle storage buffer, binding 1 the scene
/// uniforms of the current frame in flight. No vertex buffer is bound; the
/// vertex shader fetches `particles[vertex_index]`, and the indexed draw walks
/// the simulation's triangle list. The model matrix travels as a push constant.
pub struct ClothMesh {
    render_pipeline: wgpu::RenderPipeline,
    frames: FrameRing<MeshFrame>,
    model: Mat4,
    skipped_draws: SkippedDraws,
}

impl ClothMesh {
    pub fn new(ctx: &GpuContext, simulation: &ClothSimulation) -> Self {
        let device = &ctx.device;

        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Cloth Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/cloth_mesh.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Cloth Mesh Bind Group Layout"),
            entries: &[
                // particles
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // scene
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Cloth Mesh Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[wgpu::PushConstantRange {
                stages: wgpu::ShaderStages::VERTEX,
                range: 0..std::mem::size_of::<[[f32; 4]; 4]>() as u32,
            }],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Cloth Mesh Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: Some("vertex_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: Some("fragment_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Both sides of the cloth are visible
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: ctx.depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let frames = FrameRing::new(|slot| {
            let scene_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("Cloth Scene Buffer {}", slot)),
                contents: bytemuck::bytes_of(&SceneUniforms::default()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("Cloth Mesh Bind Group {}", slot)),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: simulation.particle_buffer().as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: scene_buffer.as_entire_binding(),
                    },
                ],
            });
            MeshFrame {
                scene_buffer,
                bind_group,
            }
        });

        Self {
            render_pipeline,
            frames,
            model: Mat4::IDENTITY,
            skipped_draws: SkippedDraws::default(),
        }
    }

    pub fn set_model(&mut self, model: Mat4) {
        self.model = model;
    }

    pub fn model(&self) -> Mat4 {
        self.model
    }

    pub fn update_scene(&self, queue: &wgpu::Queue, frame_index: usize, scene: &SceneUniforms) {
        let frame = self.frames.get(frame_index);
        queue.write_buffer(&frame.scene_buffer, 0, bytemuck::bytes_of(scene));
    }

    /// Records the indexed draw. Returns `false` when there is nothing to draw.
    ///
    /// Every skipped draw is logged: the first at `warn`, later ones at `debug`.
    pub fn draw(
        &mut self,
        render_pass: &mut wgpu::RenderPass<'_>,
        simulation: &ClothSimulation,
        frame_index: usize,
    ) -> bool {
        let index_count = simulation.index_count();
        let Some(index_buffer) = simulation.index_buffer().filter(|_| index_count > 0) else {
            let level = self.skipped_draws.record();
            log!(
                level,
                "Cloth mesh has no index data; skipping draw ({} skipped)",
                self.skipped_draws.count
            );
            return false;
        };

        let frame = self.frames.get(frame_index);
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, &frame.bind_group, &[]);
        render_pass.set_push_constants(
            wgpu::ShaderStages::VERTEX,
            0,
            bytemuck::bytes_of(&self.model.to_cols_array_2d()),
        );
        render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..index_count, 0, 0..1);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_skip_warns_then_debug() {
        let mut skipped = SkippedDraws::default();
        assert_eq!(skipped.record(), Level::Warn);
        assert_eq!(skipped.record(), Level::Debug);
        assert_eq!(skipped.record(), Level::Debug);
        assert_eq!(skipped.count, 3);
    }
}
