//! Mass-spring cloth simulated in wgpu compute shaders and drawn straight
//! from the simulation's particle buffer.

pub mod app;
pub mod cloth;
pub mod error;
pub mod rendering;

pub use cloth::{ClothConfig, ClothSimulation};
pub use error::{AppError, ClothError, GpuError};
pub use rendering::{ClothMesh, ClothRenderPass};
