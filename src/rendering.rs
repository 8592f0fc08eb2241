pub mod camera;
pub mod cloth_mesh;
pub mod cloth_pass;
pub mod context;
pub(crate) mod render_pass;
pub mod renderer;
pub mod scene;

// Re-export rendering components
pub use camera::Camera;
pub use cloth_mesh::ClothMesh;
pub use cloth_pass::{ClothRenderPass, PassState};
pub use context::{GpuContext, RenderTargets};
pub use renderer::Renderer;
pub use scene::SceneUniforms;
