//! Fixed-step accounting, frame slot selection and the host-side kernels.

use wgpu_cloth::cloth::{
    ClothConfig, FIXED_TIMESTEP, FRAMES_IN_FLIGHT, FixedTimestep, FrameRing, Phase, StepSchedule,
    Topology, cpu,
};

// ============================================================================
// Fixed timestep
// ============================================================================

#[test]
fn test_k_steps_regardless_of_frame_split() {
    // Every split sums to exactly k fixed steps
    let splits: [(&[f32], u32); 4] = [
        (&[1.0], 1),
        (&[0.5, 0.5, 0.5, 0.5, 0.5, 0.5], 3),
        (&[0.25, 0.25, 0.5, 2.0, 1.0], 4),
        (&[0.125; 16], 2),
    ];

    for (fractions, k) in splits {
        let mut timestep = FixedTimestep::default();
        let mut steps = 0;
        for fraction in fractions {
            timestep.accumulate(FIXED_TIMESTEP * fraction);
            steps += timestep.drain();
        }
        assert_eq!(steps, k, "split {:?}", fractions);
        assert_eq!(timestep.step(), FIXED_TIMESTEP);
    }
}

#[test]
fn test_many_small_frames_do_not_lose_steps() {
    let mut timestep = FixedTimestep::default();
    let mut steps = 0;
    for _ in 0..600 {
        timestep.accumulate(FIXED_TIMESTEP / 4.0);
        steps += timestep.drain();
    }
    assert_eq!(steps, 150);
}

#[test]
fn test_reset_discards_banked_time() {
    let mut timestep = FixedTimestep::default();
    timestep.accumulate(FIXED_TIMESTEP * 0.9);
    timestep.reset();
    timestep.accumulate(FIXED_TIMESTEP * 0.9);
    assert_eq!(timestep.drain(), 0);
}

// ============================================================================
// Frames in flight
// ============================================================================

#[test]
fn test_frame_ring_is_double_buffered() {
    assert_eq!(FRAMES_IN_FLIGHT, 2);
    let ring = FrameRing::new(|slot| slot);
    let slots: Vec<usize> = (0..6).map(|frame| *ring.get(frame)).collect();
    assert_eq!(slots, vec![0, 1, 0, 1, 0, 1]);
}

// ============================================================================
// Phase ordering
// ============================================================================

#[test]
fn test_schedule_orders_integrate_constraints_normals() {
    let config = ClothConfig::default();
    let schedule = StepSchedule::new(config.constraint_iterations(), true);
    let phases = schedule.phases();

    assert_eq!(phases.first().map(|p| p.phase), Some(Phase::Integrate));
    assert_eq!(phases.last().map(|p| p.phase), Some(Phase::Normal));
    assert_eq!(phases.len() as u32, config.constraint_iterations() + 2);
    assert_eq!(schedule.barrier_count(), phases.len());
    assert!(schedule.barrier_before_draw());
}

// ============================================================================
// Host-side kernels
// ============================================================================

#[test]
fn test_hanging_cloth_stays_finite_and_pinned() {
    let config = ClothConfig::new()
        .with_grid_size(8, 8)
        .with_spacing(0.1)
        .with_constraint_iterations(8);
    let mut topology = Topology::build(&config);
    let pinned_before: Vec<[f32; 4]> = topology
        .particles
        .iter()
        .filter(|p| p.is_pinned())
        .map(|p| p.position)
        .collect();
    let params = config.simulation_params();

    for _ in 0..240 {
        cpu::step(&mut topology.particles, &topology.constraints, &params, 8, 8);
    }

    assert!(
        topology
            .particles
            .iter()
            .all(|p| p.position.iter().chain(&p.normal).all(|v| v.is_finite()))
    );

    let pinned_after: Vec<[f32; 4]> = topology
        .particles
        .iter()
        .filter(|p| p.is_pinned())
        .map(|p| p.position)
        .collect();
    assert_eq!(pinned_before, pinned_after);

    // The cloth hangs below its pinned corners
    let free_lowest = topology
        .particles
        .iter()
        .filter(|p| !p.is_pinned())
        .map(|p| p.position[1])
        .fold(f32::INFINITY, f32::min);
    assert!(free_lowest < 0.0);
}

#[test]
fn test_weightless_cloth_stays_flat_without_wind() {
    let config = ClothConfig::new()
        .with_grid_size(6, 6)
        .with_gravity(glam::Vec3::ZERO)
        .with_wind(glam::Vec3::X, 0.0);
    let mut topology = Topology::build(&config);
    let before = topology.particles.clone();
    let params = config.simulation_params();

    for _ in 0..30 {
        cpu::step(&mut topology.particles, &topology.constraints, &params, 6, 6);
    }

    for (a, b) in before.iter().zip(&topology.particles) {
        for axis in 0..3 {
            assert!((a.position[axis] - b.position[axis]).abs() < 1e-5);
        }
        assert!((b.normal[1] - 1.0).abs() < 1e-5);
    }
}
