//! Shader module loading and caching.

use log::{debug, info};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use wgpu::{ShaderModuleDescriptor, ShaderSource};

use crate::pipeline::OVERLAY_SHADER_SOURCE;
use crate::present::PRESENT_SHADER_SOURCE;
use crate::standard_pipeline::STANDARD_SHADER_SOURCE;

/// Names of the shaders compiled into the binary.
pub const STANDARD_SHADER: &str = "standard";
pub const OVERLAY_SHADER: &str = "overlay";
pub const PRESENT_SHADER: &str = "present";

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("shader '{name}' not found in library")]
    NotLoaded { name: String },
}

/// Central registry for compiled shader modules.
pub struct ShaderLibrary {
    modules: HashMap<String, Arc<wgpu::ShaderModule>>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }

    /// Library holding every built-in shader.
    pub fn with_builtins(device: &wgpu::Device) -> Self {
        let mut library = Self::new();
        for (name, source) in [
            (STANDARD_SHADER, STANDARD_SHADER_SOURCE),
            (OVERLAY_SHADER, OVERLAY_SHADER_SOURCE),
            (PRESENT_SHADER, PRESENT_SHADER_SOURCE),
        ] {
            library.load_from_source(device, name, source);
        }
        library
    }

    /// Compile a WGSL source string, replacing any module with the same name.
    ///
    /// Compilation errors surface through the device's uncaptured error
    /// handler, which panics by default.
    pub fn load_from_source(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        source: &str,
    ) -> Arc<wgpu::ShaderModule> {
        debug!("Loading shader '{}' from source", name);

        let module = Arc::new(device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        }));

        if self
            .modules
            .insert(name.to_string(), module.clone())
            .is_some()
        {
            info!("Replaced shader '{}'", name);
        } else {
            info!("Loaded shader '{}'", name);
        }

        module
    }

    /// Get a previously loaded shader by name.
    pub fn get(&self, name: &str) -> Option<Arc<wgpu::ShaderModule>> {
        self.modules.get(name).cloned()
    }

    /// Like [`get`](Self::get) but an error for missing shaders.
    pub fn require(&self, name: &str) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        self.get(name).ok_or_else(|| ShaderError::NotLoaded {
            name: name.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for ShaderLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_gpu::create_test_device;

    const VALID_SHADER: &str = r#"
        @vertex
        fn vs_main(@builtin(vertex_index) idx: u32) -> @builtin(position) vec4<f32> {
            return vec4<f32>(0.0, 0.0, 0.0, 1.0);
        }

        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return vec4<f32>(1.0, 0.0, 0.0, 1.0);
        }
    "#;

    const INVALID_SHADER: &str = r#"
        @vertex
        fn vs_main() -> @builtin(position) vec4<f32> {
            return undeclared_variable;
        }
    "#;

    #[test]
    fn test_builtins_compile() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let library = ShaderLibrary::with_builtins(&device);
        assert_eq!(library.len(), 3);
        for name in [STANDARD_SHADER, OVERLAY_SHADER, PRESENT_SHADER] {
            assert!(library.require(name).is_ok(), "{name} missing");
        }
    }

    #[test]
    #[should_panic(expected = "Validation Error")]
    fn test_load_invalid_shader_panics() {
        let Some((device, _queue)) = create_test_device() else {
            panic!("Validation Error (no adapter, skipped)");
        };
        let mut library = ShaderLibrary::new();
        library.load_from_source(&device, "bad", INVALID_SHADER);
    }

    #[test]
    fn test_cache_returns_same_module_for_same_name() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        library.load_from_source(&device, "shared", VALID_SHADER);

        let a = library.get("shared").unwrap();
        let b = library.get("shared").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_reload_replaces_cached_module() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        let original = library.load_from_source(&device, "reloadable", VALID_SHADER);
        library.load_from_source(&device, "reloadable", VALID_SHADER);
        let reloaded = library.get("reloadable").unwrap();

        assert!(!Arc::ptr_eq(&original, &reloaded));
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_require_missing_shader_is_error() {
        let library = ShaderLibrary::new();
        assert!(library.is_empty());
        assert!(matches!(
            library.require("nonexistent"),
            Err(ShaderError::NotLoaded { name }) if name == "nonexistent"
        ));
    }
}
