use glam::{Mat4, Vec3};

const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 20.0;
const PITCH_LIMIT: f32 = 1.5;

// Orbit camera looking at the cloth
pub struct Camera {
    // Camera state
    target: Vec3,
    distance: f32,
    yaw: f32,   // rotation around Y in radians
    pitch: f32, // elevation in radians

    // Mouse interaction state for camera control
    mouse_pressed: bool,
    last_mouse_position: [f32; 2],
    ctrl_pressed: bool,
}

impl Camera {
    pub fn new(target: Vec3, distance: f32) -> Self {
        Self {
            target,
            distance: distance.clamp(MIN_DISTANCE, MAX_DISTANCE),
            yaw: 0.6,
            pitch: 0.35,
            mouse_pressed: false,
            last_mouse_position: [0.0, 0.0],
            ctrl_pressed: false,
        }
    }

    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let projection = Mat4::perspective_rh(45.0_f32.to_radians(), aspect, 0.05, 100.0);
        projection * self.view_matrix()
    }

    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        // Scale pan amount with distance (faster pan when zoomed out)
        let pan_speed = 0.002 * self.distance;

        // Move the target in the camera's horizontal plane
        let right = Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin());
        self.target += right * (-delta_x * pan_speed) + Vec3::Y * (delta_y * pan_speed);
    }

    pub fn zoom(&mut self, delta: f32) {
        // Positive delta zooms in
        let zoom_speed = 0.1;
        let new_distance = self.distance * (1.0 - delta * zoom_speed);
        self.distance = new_distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw = (self.yaw - delta_yaw * 0.01).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + delta_pitch * 0.01).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    // Input handling methods
    pub fn handle_mouse_press(&mut self, position: [f32; 2], ctrl: bool) {
        self.mouse_pressed = true;
        self.last_mouse_position = position;
        self.ctrl_pressed = ctrl;
    }

    pub fn handle_mouse_release(&mut self) {
        self.mouse_pressed = false;
    }

    pub fn handle_mouse_move(&mut self, position: [f32; 2]) -> bool {
        if !self.mouse_pressed {
            return false;
        }

        let delta_x = position[0] - self.last_mouse_position[0];
        let delta_y = position[1] - self.last_mouse_position[1];
        self.last_mouse_position = position;

        if self.ctrl_pressed {
            // Pan with Ctrl+drag
            self.pan(delta_x, delta_y);
        } else {
            self.rotate(delta_x, delta_y);
        }
        true
    }

    pub fn handle_mouse_wheel(&mut self, delta: f32) {
        self.zoom(delta);
    }

    pub fn handle_key_state(&mut self, ctrl: bool) {
        self.ctrl_pressed = ctrl;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_is_clamped() {
        let mut camera = Camera::new(Vec3::ZERO, 3.0);
        for _ in 0..100 {
            camera.zoom(5.0);
        }
        assert!((camera.position().length() - MIN_DISTANCE).abs() < 1e-4);
        for _ in 0..100 {
            camera.zoom(-5.0);
        }
        assert!((camera.position().length() - MAX_DISTANCE).abs() < 1e-3);
    }

    #[test]
    fn orbit_keeps_distance() {
        let mut camera = Camera::new(Vec3::new(0.0, -1.0, 0.0), 4.0);
        camera.rotate(250.0, -40.0);
        let offset = camera.position() - Vec3::new(0.0, -1.0, 0.0);
        assert!((offset.length() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn drag_without_press_is_ignored() {
        let mut camera = Camera::new(Vec3::ZERO, 3.0);
        assert!(!camera.handle_mouse_move([10.0, 10.0]));
        camera.handle_mouse_press([0.0, 0.0], false);
        assert!(camera.handle_mouse_move([10.0, 10.0]));
    }
}
