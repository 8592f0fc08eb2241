// Host-side mirror of the three cloth kernels (cloth_integrate.wgsl,
// cloth_constraints.wgsl, cloth_normals.wgsl). Same math, run sequentially.

use glam::Vec3;

use crate::cloth::types::{Constraint, Particle, SimulationParams};

const MIN_DISTANCE: f32 = 1e-6;

#[inline]
fn xyz(v: [f32; 4]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

#[inline]
fn store(v: &mut [f32; 4], value: Vec3) {
    v[0] = value.x;
    v[1] = value.y;
    v[2] = value.z;
}

pub fn integrate(particles: &mut [Particle], params: &SimulationParams) {
    let gravity = xyz(params.gravity);
    let wind = xyz(params.wind) * params.wind[3];
    let dt = params.delta_time;

    for particle in particles.iter_mut() {
        let inverse_mass = particle.inverse_mass();
        if inverse_mass == 0.0 {
            continue;
        }

        let mut velocity = xyz(particle.velocity);
        let acceleration = gravity + wind * inverse_mass - params.damping * velocity;
        velocity += acceleration * dt;

        let position = xyz(particle.position) + velocity * dt;
        store(&mut particle.velocity, velocity);
        store(&mut particle.position, position);
    }
}

/// Moves both endpoints towards the rest length, weighted by inverse mass.
pub fn relax(particles: &mut [Particle], constraint: &Constraint) {
    let a = constraint.particle_a as usize;
    let b = constraint.particle_b as usize;
    let weight_a = particles[a].inverse_mass();
    let weight_b = particles[b].inverse_mass();
    let total_weight = weight_a + weight_b;
    if total_weight == 0.0 {
        return;
    }

    let position_a = xyz(particles[a].position);
    let position_b = xyz(particles[b].position);
    let delta = position_b - position_a;
    let distance = delta.length();
    if distance < MIN_DISTANCE {
        return;
    }

    let correction = delta * ((distance - constraint.rest_length) / distance) * constraint.stiffness;
    store(&mut particles[a].position, position_a + correction * (weight_a / total_weight));
    store(&mut particles[b].position, position_b - correction * (weight_b / total_weight));
}

pub fn solve_constraints(particles: &mut [Particle], constraints: &[Constraint], iterations: u32) {
    for _ in 0..iterations {
        for constraint in constraints {
            relax(particles, constraint);
        }
    }
}

/// Central differences over the grid, clamped at the borders.
pub fn recompute_normals(particles: &mut [Particle], width: u32, height: u32) {
    if width == 0 || height == 0 {
        return;
    }
    let position = |particles: &[Particle], x: u32, y: u32| -> Vec3 {
        xyz(particles[(y * width + x) as usize].position)
    };

    let mut normals = Vec::with_capacity(particles.len());
    for y in 0..height {
        for x in 0..width {
            let left = position(particles, x.saturating_sub(1), y);
            let right = position(particles, (x + 1).min(width - 1), y);
            let up = position(particles, x, y.saturating_sub(1));
            let down = position(particles, x, (y + 1).min(height - 1));

            let normal = (down - up).cross(right - left);
            normals.push(normal.try_normalize().unwrap_or(Vec3::Y));
        }
    }

    for (particle, normal) in particles.iter_mut().zip(normals) {
        store(&mut particle.normal, normal);
    }
}

/// One full fixed step: integrate, relax, recompute normals.
pub fn step(
    particles: &mut [Particle],
    constraints: &[Constraint],
    params: &SimulationParams,
    width: u32,
    height: u32,
) {
    integrate(particles, params);
    solve_constraints(particles, constraints, params.constraint_iterations);
    recompute_normals(particles, width, height);
}
