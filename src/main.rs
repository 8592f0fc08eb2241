use log::{error, info};

use wgpu_cloth::app;
use wgpu_cloth::cloth::ClothConfig;

fn main() {
    // Initialize logger
    env_logger::init();

    let config = ClothConfig::new().with_grid_size(48, 48).with_spacing(0.05);
    info!(
        "Controls: drag to orbit, Ctrl+drag to pan, wheel to zoom, Space pause, G gravity, Up/Down wind, Left/Right damping, R reset"
    );

    if let Err(e) = app::run(config) {
        error!("{}", e);
        std::process::exit(1);
    }
}
