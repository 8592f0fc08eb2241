//! GPU mass-spring cloth: configuration, topology, stepping.

pub mod config;
pub mod cpu;
pub mod frames;
pub mod phases;
pub mod pipelines;
pub mod simulation;
pub mod timestep;
pub mod topology;
pub mod types;

pub use config::ClothConfig;
pub use frames::FrameRing;
pub use phases::{Phase, Resource, StepSchedule};
pub use simulation::ClothSimulation;
pub use timestep::FixedTimestep;
pub use topology::{ConstraintKind, Topology};
pub use types::{Constraint, FIXED_TIMESTEP, FRAMES_IN_FLIGHT, Particle, SimulationParams};
