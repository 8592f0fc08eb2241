use std::sync::Arc;

use log::{error, info};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::cloth::config::ClothConfig;
use crate::error::AppError;
use crate::rendering::renderer::Renderer;

// Store modifier states at the App level
pub struct App {
    config: ClothConfig,
    state: Option<Renderer>,
    ctrl_pressed: bool,
    last_cursor_x: f32,
    last_cursor_y: f32,
}

impl App {
    pub fn new(config: ClothConfig) -> Self {
        Self {
            config,
            state: None,
            ctrl_pressed: false,
            last_cursor_x: 0.0,
            last_cursor_y: 0.0,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let attributes = Window::default_attributes().with_title("wgpu cloth");
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("{}", AppError::from(e));
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(Renderer::new(window.clone(), self.config.clone())) {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                error!("{}", AppError::from(e));
                event_loop.exit();
                return;
            }
        }

        window.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => {
                info!("The close button was pressed; stopping");
                state.cloth_pass.cleanup();
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                state.render();
                // Emits a new redraw requested event.
                state.get_window().request_redraw();
            }
            WindowEvent::Resized(size) => {
                // Reconfigures the size of the surface. We do not re-render
                // here as this event is always followed up by redraw request.
                state.resize(size);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.ctrl_pressed = modifiers.state().control_key();
                state.handle_key_state(self.ctrl_pressed);
            }
            WindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(_, y) => state.handle_mouse_wheel(y),
                // Touchpad gesture - needs smaller scaling factor to feel natural
                MouseScrollDelta::PixelDelta(position) => {
                    state.handle_mouse_wheel(position.y as f32 * 0.003)
                }
            },
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => match button_state {
                ElementState::Pressed => state.handle_mouse_press(
                    [self.last_cursor_x, self.last_cursor_y],
                    self.ctrl_pressed,
                ),
                ElementState::Released => state.handle_mouse_release(),
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.last_cursor_x = position.x as f32;
                self.last_cursor_y = position.y as f32;
                state.handle_mouse_move([self.last_cursor_x, self.last_cursor_y]);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match key_code {
                KeyCode::Space => state.toggle_simulation(),
                KeyCode::KeyG => state.toggle_gravity(),
                KeyCode::ArrowUp => state.adjust_wind(1.0),
                KeyCode::ArrowDown => state.adjust_wind(-1.0),
                KeyCode::ArrowRight => state.adjust_damping(1.0),
                KeyCode::ArrowLeft => state.adjust_damping(-1.0),
                KeyCode::KeyR => state.reset_cloth(),
                KeyCode::Escape => event_loop.exit(),
                _ => (),
            },
            _ => (),
        }
    }
}

pub fn run(config: ClothConfig) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}
