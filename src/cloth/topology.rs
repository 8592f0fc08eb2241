//! CPU-side construction of the cloth grid: particles, springs and triangles.
//!
//! Particles are laid out row-major, so the particle at grid position `(x, y)`
//! lives at index `y * width + x`. The grid is centred on the origin in the
//! XZ plane with every particle starting at `y = 0`.

use crate::cloth::config::ClothConfig;
use crate::cloth::types::{Constraint, Particle};

const SHEAR_STIFFNESS_SCALE: f32 = 0.7;
const BEND_STIFFNESS_SCALE: f32 = 0.5;

/// Which family a spring belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// Horizontal and vertical neighbours.
    Structural,
    /// Both diagonals of every grid cell.
    Shear,
    /// Neighbours two steps apart, horizontally and vertically.
    Bend,
}

impl ConstraintKind {
    pub const ALL: [ConstraintKind; 3] = [
        ConstraintKind::Structural,
        ConstraintKind::Shear,
        ConstraintKind::Bend,
    ];

    /// Number of springs this family yields on a `width` x `height` grid.
    pub fn expected_count(self, width: u32, height: u32) -> usize {
        let (w, h) = (width as usize, height as usize);
        match self {
            ConstraintKind::Structural => h * w.saturating_sub(1) + w * h.saturating_sub(1),
            ConstraintKind::Shear => 2 * w.saturating_sub(1) * h.saturating_sub(1),
            ConstraintKind::Bend => h * w.saturating_sub(2) + w * h.saturating_sub(2),
        }
    }

    fn rest_length(self, spacing: f32) -> f32 {
        match self {
            ConstraintKind::Structural => spacing,
            ConstraintKind::Shear => spacing * std::f32::consts::SQRT_2,
            ConstraintKind::Bend => 2.0 * spacing,
        }
    }

    fn stiffness(self, base: f32) -> f32 {
        match self {
            ConstraintKind::Structural => base,
            ConstraintKind::Shear => base * SHEAR_STIFFNESS_SCALE,
            ConstraintKind::Bend => base * BEND_STIFFNESS_SCALE,
        }
    }
}

/// Everything generated from a [`ClothConfig`] before upload.
#[derive(Debug, Clone)]
pub struct Topology {
    pub particles: Vec<Particle>,
    pub constraints: Vec<Constraint>,
    /// Family of each entry in `constraints`, in the same order.
    pub kinds: Vec<ConstraintKind>,
    pub indices: Vec<u32>,
}

impl Topology {
    pub fn build(config: &ClothConfig) -> Self {
        let particles = generate_particles(config);
        let (constraints, kinds) = generate_constraints(config);
        let indices = generate_indices(config.grid_width(), config.grid_height());
        Self {
            particles,
            constraints,
            kinds,
            indices,
        }
    }

    pub fn count_of(&self, kind: ConstraintKind) -> usize {
        self.kinds.iter().filter(|k| **k == kind).count()
    }
}

pub fn particle_index(width: u32, x: u32, y: u32) -> u32 {
    y * width + x
}

pub fn generate_particles(config: &ClothConfig) -> Vec<Particle> {
    let (width, height) = (config.grid_width(), config.grid_height());
    let spacing = config.spacing();
    let inverse_mass = config.inverse_mass();

    // Offsets that centre the grid on the origin
    let half_x = width.saturating_sub(1) as f32 * spacing * 0.5;
    let half_z = height.saturating_sub(1) as f32 * spacing * 0.5;

    let mut particles = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            let position = [
                x as f32 * spacing - half_x,
                0.0,
                y as f32 * spacing - half_z,
            ];
            particles.push(Particle::new(position, inverse_mass));
        }
    }

    if config.pinned_corners() && width > 0 && height > 0 {
        particles[particle_index(width, 0, 0) as usize].pin();
        particles[particle_index(width, width - 1, 0) as usize].pin();
    }

    particles
}

/// Structural, then shear, then bend springs.
pub fn generate_constraints(config: &ClothConfig) -> (Vec<Constraint>, Vec<ConstraintKind>) {
    let (width, height) = (config.grid_width(), config.grid_height());
    let capacity = ConstraintKind::ALL
        .iter()
        .map(|kind| kind.expected_count(width, height))
        .sum();

    let mut constraints = Vec::with_capacity(capacity);
    let mut kinds = Vec::with_capacity(capacity);

    let mut push = |kind: ConstraintKind, a: (u32, u32), b: (u32, u32)| {
        constraints.push(Constraint {
            particle_a: particle_index(width, a.0, a.1),
            particle_b: particle_index(width, b.0, b.1),
            rest_length: kind.rest_length(config.spacing()),
            stiffness: kind.stiffness(config.stiffness()),
        });
        kinds.push(kind);
    };

    for y in 0..height {
        for x in 0..width {
            if x + 1 < width {
                push(ConstraintKind::Structural, (x, y), (x + 1, y));
            }
            if y + 1 < height {
                push(ConstraintKind::Structural, (x, y), (x, y + 1));
            }
        }
    }

    for y in 0..height.saturating_sub(1) {
        for x in 0..width.saturating_sub(1) {
            push(ConstraintKind::Shear, (x, y), (x + 1, y + 1));
            push(ConstraintKind::Shear, (x + 1, y), (x, y + 1));
        }
    }

    for y in 0..height {
        for x in 0..width {
            if x + 2 < width {
                push(ConstraintKind::Bend, (x, y), (x + 2, y));
            }
            if y + 2 < height {
                push(ConstraintKind::Bend, (x, y), (x, y + 2));
            }
        }
    }

    (constraints, kinds)
}

/// Two triangles per grid cell, as a triangle list.
pub fn generate_indices(width: u32, height: u32) -> Vec<u32> {
    let cells = width.saturating_sub(1) as usize * height.saturating_sub(1) as usize;
    let mut indices = Vec::with_capacity(cells * 6);
    for y in 0..height.saturating_sub(1) {
        for x in 0..width.saturating_sub(1) {
            let top_left = particle_index(width, x, y);
            let top_right = top_left + 1;
            let bottom_left = top_left + width;
            let bottom_right = bottom_left + 1;
            indices.extend_from_slice(&[
                top_left,
                bottom_left,
                top_right,
                top_right,
                bottom_left,
                bottom_right,
            ]);
        }
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families_are_emitted_in_order() {
        let topology = Topology::build(&ClothConfig::new().with_grid_size(3, 3));
        let first_shear = topology
            .kinds
            .iter()
            .position(|k| *k == ConstraintKind::Shear)
            .unwrap();
        let first_bend = topology
            .kinds
            .iter()
            .position(|k| *k == ConstraintKind::Bend)
            .unwrap();
        assert!(topology.kinds[..first_shear]
            .iter()
            .all(|k| *k == ConstraintKind::Structural));
        assert!(topology.kinds[first_shear..first_bend]
            .iter()
            .all(|k| *k == ConstraintKind::Shear));
        assert!(topology.kinds[first_bend..]
            .iter()
            .all(|k| *k == ConstraintKind::Bend));
    }

    #[test]
    fn rest_lengths_and_stiffness_follow_family() {
        let config = ClothConfig::new()
            .with_grid_size(3, 3)
            .with_spacing(2.0)
            .with_stiffness(1.0);
        let topology = Topology::build(&config);
        for (constraint, kind) in topology.constraints.iter().zip(&topology.kinds) {
            let (length, stiffness) = match kind {
                ConstraintKind::Structural => (2.0, 1.0),
                ConstraintKind::Shear => (2.0 * std::f32::consts::SQRT_2, 0.7),
                ConstraintKind::Bend => (4.0, 0.5),
            };
            assert!((constraint.rest_length - length).abs() < 1e-6);
            assert!((constraint.stiffness - stiffness).abs() < 1e-6);
        }
    }

    #[test]
    fn rest_lengths_match_initial_distances() {
        let config = ClothConfig::new().with_grid_size(5, 4).with_spacing(0.25);
        let topology = Topology::build(&config);
        for constraint in &topology.constraints {
            let a = topology.particles[constraint.particle_a as usize].position;
            let b = topology.particles[constraint.particle_b as usize].position;
            let distance = ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt();
            assert!((distance - constraint.rest_length).abs() < 1e-5);
        }
    }

    #[test]
    fn grid_is_centred_on_origin() {
        let topology = Topology::build(&ClothConfig::new().with_grid_size(3, 5).with_spacing(1.0));
        let first = topology.particles[0].position;
        let last = topology.particles[14].position;
        assert_eq!(&first[..3], &[-1.0, 0.0, -2.0]);
        assert_eq!(&last[..3], &[1.0, 0.0, 2.0]);
    }

    #[test]
    fn empty_grid_produces_nothing() {
        let topology = Topology::build(&ClothConfig::new().with_grid_size(0, 0));
        assert!(topology.particles.is_empty());
        assert!(topology.constraints.is_empty());
        assert!(topology.indices.is_empty());
    }

    #[test]
    fn single_column_only_has_vertical_springs() {
        let topology = Topology::build(&ClothConfig::new().with_grid_size(1, 4));
        assert_eq!(topology.count_of(ConstraintKind::Structural), 3);
        assert_eq!(topology.count_of(ConstraintKind::Shear), 0);
        assert_eq!(topology.count_of(ConstraintKind::Bend), 2);
        assert!(topology.indices.is_empty());
        // Both pinned corners collapse onto the single top particle
        assert_eq!(topology.particles.iter().filter(|p| p.is_pinned()).count(), 1);
    }
}
