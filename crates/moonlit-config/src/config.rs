//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Rendering settings.
    pub render: RenderConfig,
    /// Camera projection and placement.
    pub camera: CameraConfig,
    /// Orbit control behavior.
    pub controls: ControlsConfig,
    /// Moon, lights, and starfield construction.
    pub scene: SceneConfig,
    /// Startup timeline and color tween timing.
    pub animation: AnimationConfig,
    /// Pointer color tween behavior.
    pub pointer: PointerConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Backing buffer texels per logical pixel. The backing buffer is always
    /// this multiple of the viewport size, regardless of the display's scale.
    pub pixel_ratio: f64,
    /// Background clear color (sRGB, 0.0 - 1.0).
    pub clear_color: [f64; 3],
}

/// Camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
    /// Initial distance from the orbit target along +Z.
    pub distance: f32,
}

/// Orbit controls configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    /// Decay drag rotation gradually instead of stopping instantly.
    pub enable_damping: bool,
    /// Fraction of the pending rotation applied each update when damping.
    pub damping_factor: f32,
    /// Orbit automatically around the target.
    pub auto_rotate: bool,
    /// Auto-rotate speed; 2.0 is one revolution every 30 seconds.
    pub auto_rotate_speed: f32,
    /// Drag rotation multiplier.
    pub rotate_speed: f32,
    /// Allow scroll-wheel zoom.
    pub enable_zoom: bool,
    /// Allow secondary-button panning.
    pub enable_pan: bool,
}

/// Scene construction configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Directory the texture paths are resolved against.
    pub asset_dir: PathBuf,
    /// Moon color map file name.
    pub moon_texture: String,
    /// Moon normal map file name.
    pub normal_texture: String,
    /// Moon sphere radius.
    pub moon_radius: f32,
    /// Moon sphere width and height segment count.
    pub moon_segments: u32,
    /// Moon material base color as 0xRRGGBB.
    pub moon_color: u32,
    /// Moon material roughness.
    pub moon_roughness: f32,
    /// Point light color as 0xRRGGBB.
    pub point_light_color: u32,
    /// Point light intensity.
    pub point_light_intensity: f32,
    /// Point light range; contribution reaches zero at this distance.
    pub point_light_distance: f32,
    /// Point light falloff exponent within its range.
    pub point_light_decay: f32,
    /// Point light position.
    pub point_light_position: [f32; 3],
    /// Ambient light color as 0xRRGGBB.
    pub ambient_color: u32,
    /// Ambient light intensity.
    pub ambient_intensity: f32,
    /// Number of stars generated at startup.
    pub star_count: u32,
    /// Edge length of the cube the stars are scattered in, centered at the origin.
    pub star_spread: f32,
    /// Star sphere radius.
    pub star_radius: f32,
    /// Star sphere width and height segment count.
    pub star_segments: u32,
    /// Fixed seed for star placement. `None` picks a fresh seed every run.
    pub star_seed: Option<u64>,
}

/// Animation timing configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationConfig {
    /// Duration of each startup timeline step in seconds.
    pub step_duration: f32,
    /// Duration of the pointer color tween in seconds.
    pub color_duration: f32,
}

/// Pointer color tween configuration.
///
/// Both switches default to the legacy behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PointerConfig {
    /// Return to idle when the primary button is released. Legacy behavior
    /// keeps the tween armed forever after the first press.
    pub release_returns_idle: bool,
    /// Derive the green channel from the pointer's y coordinate. Legacy
    /// behavior uses x for both red and green.
    pub green_from_y: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            title: "Moonlit".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pixel_ratio: 2.0,
            clear_color: [0.0, 0.0, 0.0],
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
            distance: 20.0,
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            auto_rotate: true,
            auto_rotate_speed: 2.0,
            rotate_speed: 1.0,
            enable_zoom: false,
            enable_pan: false,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("assets"),
            moon_texture: "moon.jpg".to_string(),
            normal_texture: "normal.jpg".to_string(),
            moon_radius: 3.0,
            moon_segments: 64,
            moon_color: 0xfffde7,
            moon_roughness: 0.8,
            point_light_color: 0xffecaf,
            point_light_intensity: 1.5,
            point_light_distance: 100.0,
            point_light_decay: 1.0,
            point_light_position: [0.0, 10.0, 10.0],
            ambient_color: 0xffffff,
            ambient_intensity: 0.1,
            star_count: 200,
            star_spread: 100.0,
            star_radius: 0.25,
            star_segments: 24,
            star_seed: None,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            step_duration: 1.0,
            color_duration: 0.5,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl SceneConfig {
    /// Full path of the moon color map.
    pub fn moon_texture_path(&self) -> PathBuf {
        self.asset_dir.join(&self.moon_texture)
    }

    /// Full path of the moon normal map.
    pub fn normal_texture_path(&self) -> PathBuf {
        self.asset_dir.join(&self.normal_texture)
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    ///
    /// Library surface only: the running app reads its config once at
    /// startup and never calls this.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
