use crate::cloth::types::ConstraintPushConstants;

// Push constant block shared by the constraint and normal kernels
const COMPUTE_PUSH_CONSTANT_SIZE: u32 = std::mem::size_of::<ConstraintPushConstants>() as u32;

/// A named compute pipeline built from one WGSL module.
pub struct ComputeKernel {
    pub name: &'static str,
    pub pipeline: wgpu::ComputePipeline,
}

// The three cloth kernels and the layout they share
pub struct ClothPipelines {
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub integrate: ComputeKernel,
    pub constraint: ComputeKernel,
    pub normal: ComputeKernel,
}

impl ClothPipelines {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Cloth Compute Bind Group Layout"),
            entries: &[
                // particles
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // constraints
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // simulation_params
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
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
            label: Some("Cloth Compute Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[wgpu::PushConstantRange {
                stages: wgpu::ShaderStages::COMPUTE,
                range: 0..COMPUTE_PUSH_CONSTANT_SIZE,
            }],
        });

        let integrate = create_kernel(
            device,
            &pipeline_layout,
            "Cloth Integrate",
            wgpu::ShaderSource::Wgsl(include_str!("../shaders/cloth_integrate.wgsl").into()),
        );
        let constraint = create_kernel(
            device,
            &pipeline_layout,
            "Cloth Constraint",
            wgpu::ShaderSource::Wgsl(include_str!("../shaders/cloth_constraints.wgsl").into()),
        );
        let normal = create_kernel(
            device,
            &pipeline_layout,
            "Cloth Normal",
            wgpu::ShaderSource::Wgsl(include_str!("../shaders/cloth_normals.wgsl").into()),
        );

        Self {
            bind_group_layout,
            integrate,
            constraint,
            normal,
        }
    }

    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        label: &str,
        particle_buffer: &wgpu::Buffer,
        constraint_buffer: &wgpu::Buffer,
        params_buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: particle_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: constraint_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        })
    }
}

fn create_kernel(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    name: &'static str,
    source: wgpu::ShaderSource<'static>,
) -> ComputeKernel {
    let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(name),
        source,
    });

    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(name),
        layout: Some(layout),
        module: &shader_module,
        entry_point: Some("main"),
        compilation_options: Default::default(),
        cache: None,
    });

    ComputeKernel { name, pipeline }
}
