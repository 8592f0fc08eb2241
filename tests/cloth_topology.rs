//! Grid topology properties over fixed scenarios and random grid sizes.

use rand::Rng;
use wgpu_cloth::cloth::topology::generate_indices;
use wgpu_cloth::cloth::{ClothConfig, ConstraintKind, Topology};

fn random_grid(rng: &mut impl Rng) -> (u32, u32) {
    (rng.gen_range(0..40), rng.gen_range(0..40))
}

// ============================================================================
// Scenario: 4x4 grid with unit spacing
// ============================================================================

#[test]
fn test_four_by_four_scenario() {
    let config = ClothConfig::new().with_grid_size(4, 4).with_spacing(1.0);
    assert_eq!(config.particle_count(), 16);

    let topology = Topology::build(&config);
    assert_eq!(topology.particles.len(), 16);
    assert_eq!(topology.count_of(ConstraintKind::Structural), 24);
    assert_eq!(topology.count_of(ConstraintKind::Shear), 18);
    assert_eq!(topology.count_of(ConstraintKind::Bend), 16);
    assert_eq!(topology.constraints.len(), 58);
    assert_eq!(topology.indices.len(), 54);
}

// ============================================================================
// Counts
// ============================================================================

#[test]
fn test_particle_count_is_width_times_height() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let (w, h) = random_grid(&mut rng);
        let config = ClothConfig::new().with_grid_size(w, h);
        assert_eq!(config.particle_count(), w * h);
        assert_eq!(Topology::build(&config).particles.len(), (w * h) as usize);
    }
}

#[test]
fn test_constraint_family_counts() {
    let mut rng = rand::thread_rng();
    for _ in 0..100 {
        let (w, h) = random_grid(&mut rng);
        let topology = Topology::build(&ClothConfig::new().with_grid_size(w, h));
        let (w, h) = (w as usize, h as usize);

        let structural = h * w.saturating_sub(1) + w * h.saturating_sub(1);
        let shear = 2 * w.saturating_sub(1) * h.saturating_sub(1);
        let bend = h * w.saturating_sub(2) + w * h.saturating_sub(2);

        assert_eq!(topology.count_of(ConstraintKind::Structural), structural, "{}x{}", w, h);
        assert_eq!(topology.count_of(ConstraintKind::Shear), shear, "{}x{}", w, h);
        assert_eq!(topology.count_of(ConstraintKind::Bend), bend, "{}x{}", w, h);
        assert_eq!(topology.constraints.len(), structural + shear + bend);
    }
}

#[test]
fn test_expected_count_matches_generation() {
    for (w, h) in [(0, 0), (1, 1), (1, 7), (2, 2), (3, 9), (32, 32)] {
        let topology = Topology::build(&ClothConfig::new().with_grid_size(w, h));
        for kind in ConstraintKind::ALL {
            assert_eq!(topology.count_of(kind), kind.expected_count(w, h));
        }
    }
}

// ============================================================================
// Constraint validity
// ============================================================================

#[test]
fn test_constraints_reference_distinct_particles() {
    let mut rng = rand::thread_rng();
    for _ in 0..100 {
        let (w, h) = random_grid(&mut rng);
        let config = ClothConfig::new().with_grid_size(w, h);
        let topology = Topology::build(&config);
        let count = config.particle_count();
        for constraint in &topology.constraints {
            assert!(constraint.particle_a < count);
            assert!(constraint.particle_b < count);
            assert_ne!(constraint.particle_a, constraint.particle_b);
            assert!(constraint.rest_length > 0.0);
            assert!((0.0..=1.0).contains(&constraint.stiffness));
        }
    }
}

// ============================================================================
// Pinning
// ============================================================================

#[test]
fn test_only_top_corners_are_pinned() {
    let mut rng = rand::thread_rng();
    for _ in 0..100 {
        let w = rng.gen_range(2..30);
        let h = rng.gen_range(2..30);
        let config = ClothConfig::new().with_grid_size(w, h).with_mass(4.0);
        let topology = Topology::build(&config);

        for (index, particle) in topology.particles.iter().enumerate() {
            let index = index as u32;
            let is_corner = index == 0 || index == w - 1;
            if is_corner {
                assert_eq!(particle.position[3], 0.0);
            } else {
                assert_eq!(particle.position[3], 0.25);
            }
        }
    }
}

#[test]
fn test_unpinned_cloth_is_all_free() {
    let config = ClothConfig::new().with_grid_size(8, 8).with_pinned_corners(false);
    let topology = Topology::build(&config);
    assert!(topology.particles.iter().all(|p| !p.is_pinned()));
}

// ============================================================================
// Indices
// ============================================================================

#[test]
fn test_index_buffer_covers_every_cell() {
    let mut rng = rand::thread_rng();
    for _ in 0..100 {
        let (w, h) = random_grid(&mut rng);
        let indices = generate_indices(w, h);
        let cells = w.saturating_sub(1) as usize * h.saturating_sub(1) as usize;
        assert_eq!(indices.len(), 6 * cells);
        assert!(indices.iter().all(|&i| i < w * h));
    }
}

#[test]
fn test_triangles_are_not_degenerate() {
    let indices = generate_indices(5, 5);
    for triangle in indices.chunks_exact(3) {
        assert_ne!(triangle[0], triangle[1]);
        assert_ne!(triangle[1], triangle[2]);
        assert_ne!(triangle[0], triangle[2]);
    }
}
