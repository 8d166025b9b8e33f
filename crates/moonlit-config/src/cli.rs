//! Command-line argument parsing for Moonlit.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Moonlit command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "moonlit", about = "A moon in a starfield")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Number of stars to scatter around the moon.
    #[arg(long)]
    pub stars: Option<u32>,

    /// Fixed seed for star placement.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory containing `moon.jpg` and `normal.jpg`.
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Disable camera auto-rotation.
    #[arg(long)]
    pub no_auto_rotate: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(stars) = args.stars {
            self.scene.star_count = stars;
        }
        if let Some(seed) = args.seed {
            self.scene.star_seed = Some(seed);
        }
        if let Some(ref dir) = args.assets {
            self.scene.asset_dir = dir.clone();
        }
        if args.no_auto_rotate {
            self.controls.auto_rotate = false;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
