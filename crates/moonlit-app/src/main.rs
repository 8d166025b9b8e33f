//! The binary entry point for Moonlit.

use clap::Parser;
use moonlit_app::PlatformDirs;
use moonlit_config::{CliArgs, Config};

fn main() {
    let args = CliArgs::parse();

    let dirs = match args.config.clone() {
        Some(dir) => PlatformDirs::from_config_dir(dir),
        None => match PlatformDirs::resolve() {
            Ok(dirs) => dirs,
            Err(e) => {
                eprintln!("Failed to resolve platform directories: {e}");
                std::process::exit(1);
            }
        },
    };
    if let Err(e) = dirs.create_dirs() {
        eprintln!("Failed to create {}: {e}", dirs.config_dir.display());
    }

    let mut config = match Config::load_or_create(&dirs.config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config, using defaults: {e}");
            Config::default()
        }
    };
    config.apply_cli_overrides(&args);

    moonlit_log::init_logging(
        Some(&dirs.log_dir),
        cfg!(debug_assertions),
        Some(&config),
    );
    tracing::info!(config_dir = %dirs.config_dir.display(), "Moonlit starting");

    if let Err(e) = moonlit_app::run(config) {
        tracing::error!("{e}");
        eprintln!("moonlit: {e}");
        std::process::exit(1);
    }
}
