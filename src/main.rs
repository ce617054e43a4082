// Palette Display - Demo entry point
//
// Opens a window and animates a palette-cycling test pattern through the
// frame lock. Usage: palette-display [config.toml]

use palette_display::app::run_demo;
use palette_display::config::{DisplayConfig, CONFIG_FILE};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| CONFIG_FILE.to_string());
    let config = DisplayConfig::load_or_default(&config_path);
    log::info!("Display configuration loaded from '{}'", config_path);

    if let Some(violation) = run_demo(config)? {
        log::error!("Terminating: {}", violation);
        std::process::exit(1);
    }

    log::info!("Display window closed.");
    Ok(())
}
