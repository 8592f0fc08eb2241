use crate::cloth::types::FIXED_TIMESTEP;

// Absorbs the rounding left over from summing many frame deltas
const ACCUMULATOR_EPSILON: f64 = 1e-6;

/// Accumulates variable frame time and releases it in fixed steps.
///
/// A slow frame yields several catch-up steps, a fast one may yield none.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f64,
    accumulator: f64,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(FIXED_TIMESTEP)
    }
}

impl FixedTimestep {
    pub fn new(step: f32) -> Self {
        Self {
            step: step as f64,
            accumulator: 0.0,
        }
    }

    pub fn step(&self) -> f32 {
        self.step as f32
    }

    pub fn accumulate(&mut self, delta_time: f32) {
        self.accumulator += delta_time.max(0.0) as f64;
    }

    /// Takes one step out of the accumulator if enough time is banked.
    pub fn consume(&mut self) -> bool {
        if self.accumulator + ACCUMULATOR_EPSILON >= self.step {
            self.accumulator = (self.accumulator - self.step).max(0.0);
            true
        } else {
            false
        }
    }

    /// Drains every whole step currently banked.
    pub fn drain(&mut self) -> u32 {
        let mut steps = 0;
        while self.consume() {
            steps += 1;
        }
        steps
    }

    pub fn pending(&self) -> f32 {
        self.accumulator as f32
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_frames_bank_time() {
        let mut timestep = FixedTimestep::default();
        timestep.accumulate(FIXED_TIMESTEP * 0.5);
        assert_eq!(timestep.drain(), 0);
        timestep.accumulate(FIXED_TIMESTEP * 0.5);
        assert_eq!(timestep.drain(), 1);
        assert!(timestep.pending() < 1e-6);
    }

    #[test]
    fn slow_frame_catches_up() {
        let mut timestep = FixedTimestep::default();
        timestep.accumulate(FIXED_TIMESTEP * 3.5);
        assert_eq!(timestep.drain(), 3);
        assert!((timestep.pending() - FIXED_TIMESTEP * 0.5).abs() < 1e-6);
    }

    #[test]
    fn negative_deltas_are_ignored() {
        let mut timestep = FixedTimestep::default();
        timestep.accumulate(-1.0);
        assert_eq!(timestep.drain(), 0);
        assert_eq!(timestep.pending(), 0.0);
    }
}
