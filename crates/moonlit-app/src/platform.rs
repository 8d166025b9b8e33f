//! Platform directories and the application's top-level error type.

use std::path::{Path, PathBuf};

use moonlit_render::{RenderContextError, ShaderError};
use moonlit_scene::TextureLoadError;

/// Errors that abort the application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("GPU initialization failed: {0}")]
    Gpu(#[from] RenderContextError),

    #[error("renderer setup failed: {0}")]
    Shader(#[from] ShaderError),

    #[error("texture loader unavailable: {0}")]
    TextureLoader(#[from] TextureLoadError),

    #[error("could not determine OS configuration directory")]
    NoConfigDir,
}

const APP_NAME: &str = "moonlit";

/// OS-specific directories for Moonlit (XDG on Linux, Known Folders on
/// Windows, Library on macOS).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// JSON log files in debug builds.
    pub log_dir: PathBuf,
}

impl PlatformDirs {
    /// Resolve platform directories without creating them.
    pub fn resolve() -> Result<Self, AppError> {
        let base = dirs::config_dir().ok_or(AppError::NoConfigDir)?;
        Ok(Self::resolve_with_root(&base))
    }

    /// Directories rooted under `root` instead of the OS location.
    pub fn resolve_with_root(root: &Path) -> Self {
        let app_dir = root.join(APP_NAME);
        Self {
            config_dir: app_dir.clone(),
            log_dir: app_dir.join("logs"),
        }
    }

    /// Directories for an explicit `--config` path.
    pub fn from_config_dir(config_dir: PathBuf) -> Self {
        let log_dir = config_dir.join("logs");
        Self {
            config_dir,
            log_dir,
        }
    }

    pub fn create_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_with_root_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::resolve_with_root(tmp.path());
        assert_eq!(dirs.config_dir, tmp.path().join("moonlit"));
        assert_eq!(dirs.log_dir, tmp.path().join("moonlit").join("logs"));
    }

    #[test]
    fn test_directory_creation() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::resolve_with_root(tmp.path());
        dirs.create_dirs().unwrap();
        assert!(dirs.config_dir.is_dir());
        assert!(dirs.log_dir.is_dir());
    }

    #[test]
    fn test_explicit_config_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::from_config_dir(tmp.path().join("custom"));
        assert_eq!(dirs.config_dir, tmp.path().join("custom"));
        assert_eq!(dirs.log_dir, tmp.path().join("custom").join("logs"));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AppError::NoConfigDir.to_string(),
            "could not determine OS configuration directory"
        );
        let err = AppError::from(RenderContextError::NoAdapter);
        assert!(err.to_string().contains("no compatible GPU adapter"));
    }
}
