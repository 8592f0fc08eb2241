use std::sync::Arc;
use std::time::Instant;

use glam::Vec3;
use log::{info, warn};
use winit::window::Window;

use crate::cloth::config::ClothConfig;
use crate::error::GpuError;
use crate::rendering::camera::Camera;
use crate::rendering::cloth_pass::ClothRenderPass;
use crate::rendering::context::{
    DEPTH_FORMAT, GpuContext, RenderTargets, create_depth_view, select_surface_format,
};
use crate::rendering::render_pass::create_background_render_pass;

// Cap on a single frame's delta so a stall does not queue up seconds of catch-up steps
const MAX_FRAME_TIME: f32 = 0.25;
const WIND_STEP: f32 = 0.5;
const DAMPING_STEP: f32 = 0.05;

// Main renderer struct
pub struct Renderer {
    window: Arc<Window>,
    pub ctx: GpuContext,
    pub size: winit::dpi::PhysicalSize<u32>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,

    // Cloth
    pub cloth_pass: ClothRenderPass,
    gravity_enabled: bool,

    // Timing
    last_update: Instant,
    frame_index: usize,

    // Camera
    pub camera: Camera,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, config: ClothConfig) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window.clone())?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Cloth Device"),
                required_features: GpuContext::required_features(),
                required_limits: GpuContext::required_limits(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        info!("Using adapter: {}", adapter.get_info().name);

        let size = window.inner_size();
        let cap = surface.get_capabilities(&adapter);
        let surface_format =
            select_surface_format(&cap.formats).ok_or(GpuError::NoSurfaceFormat)?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            view_formats: vec![],
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            width: size.width.max(1),
            height: size.height.max(1),
            desired_maximum_frame_latency: 2,
            present_mode: wgpu::PresentMode::AutoVsync,
        };
        surface.configure(&device, &surface_config);
        let depth_view = create_depth_view(&device, &surface_config);

        let ctx = GpuContext {
            device,
            queue,
            color_format: surface_format,
            depth_format: DEPTH_FORMAT,
        };

        // Frame the cloth from slightly above, looking at where it will hang
        let cloth_extent = config.grid_width().max(config.grid_height()) as f32 * config.spacing();
        let camera = Camera::new(Vec3::new(0.0, -cloth_extent * 0.4, 0.0), cloth_extent * 2.0);

        let mut cloth_pass = ClothRenderPass::new(config);
        cloth_pass.initialize(&ctx);

        Ok(Self {
            window,
            ctx,
            size,
            surface,
            surface_config,
            depth_view,
            cloth_pass,
            gravity_enabled: true,
            last_update: Instant::now(),
            frame_index: 0,
            camera,
        })
    }

    pub fn get_window(&self) -> &Window {
        &self.window
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.surface_config.width = new_size.width;
            self.surface_config.height = new_size.height;
            self.surface.configure(&self.ctx.device, &self.surface_config);
            self.depth_view = create_depth_view(&self.ctx.device, &self.surface_config);
        }
    }

    fn update(&mut self) {
        // Calculate time since last update
        let now = Instant::now();
        let dt = now.duration_since(self.last_update).as_secs_f32();
        self.last_update = now;

        self.cloth_pass.update(dt.min(MAX_FRAME_TIME), self.frame_index);

        let aspect = self.size.width.max(1) as f32 / self.size.height.max(1) as f32;
        self.cloth_pass
            .set_camera(self.camera.view_projection(aspect), self.camera.position());
    }

    pub fn render(&mut self) {
        self.update();

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.ctx.device, &self.surface_config);
                return;
            }
            Err(e) => {
                warn!("Skipping frame: {}", e);
                return;
            }
        };
        let texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let targets = RenderTargets {
            color: &texture_view,
            depth: &self.depth_view,
        };

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Cloth Command Encoder"),
            });

        create_background_render_pass(
            &mut encoder,
            &targets,
            wgpu::Color {
                r: 0.05,
                g: 0.06,
                b: 0.09,
                a: 1.0,
            },
        );

        self.cloth_pass
            .render(&self.ctx, &mut encoder, &targets, self.frame_index);

        self.ctx.queue.submit([encoder.finish()]);
        self.window.pre_present_notify();
        surface_texture.present();

        self.frame_index = self.frame_index.wrapping_add(1);
    }

    // Live tuning
    pub fn toggle_simulation(&mut self) {
        let enabled = !self.cloth_pass.is_enabled();
        self.cloth_pass.set_enabled(enabled);
    }

    pub fn toggle_gravity(&mut self) {
        self.gravity_enabled = !self.gravity_enabled;
        let gravity = if self.gravity_enabled {
            ClothConfig::default().gravity()
        } else {
            Vec3::ZERO
        };
        self.cloth_pass.set_gravity(gravity);
        info!("Gravity {}", if self.gravity_enabled { "on" } else { "off" });
    }

    pub fn adjust_wind(&mut self, delta: f32) {
        let config = self.cloth_pass.config();
        let direction = config.wind_direction();
        let speed = (config.wind_speed() + delta * WIND_STEP).max(0.0);
        self.cloth_pass.set_wind(direction, speed);
        info!("Wind speed {:.2}", speed);
    }

    pub fn adjust_damping(&mut self, delta: f32) {
        let damping = (self.cloth_pass.config().damping() + delta * DAMPING_STEP).max(0.0);
        self.cloth_pass.set_damping(damping);
        info!("Damping {:.2}", damping);
    }

    pub fn reset_cloth(&mut self) {
        self.cloth_pass.cleanup();
        self.cloth_pass.initialize(&self.ctx);
    }

    // Input handling methods
    pub fn handle_mouse_press(&mut self, position: [f32; 2], ctrl: bool) {
        self.camera.handle_mouse_press(position, ctrl);
    }

    pub fn handle_mouse_release(&mut self) {
        self.camera.handle_mouse_release();
    }

    pub fn handle_mouse_move(&mut self, position: [f32; 2]) {
        self.camera.handle_mouse_move(position);
    }

    pub fn handle_mouse_wheel(&mut self, delta: f32) {
        self.camera.handle_mouse_wheel(delta);
    }

    pub fn handle_key_state(&mut self, ctrl: bool) {
        self.camera.handle_key_state(ctrl);
    }
}
