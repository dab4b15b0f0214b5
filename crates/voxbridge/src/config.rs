//! Conversion settings, loadable from TOML.
//!
//! ```toml
//! [import]
//! scale = 0.1
//! apply_colors = true
//!
//! [export]
//! voxel_size = 0.05
//! max_dimension = 200
//! ray_samples = 5
//! fill_interior = true
//! fallback_color = { r = 180, g = 180, b = 180, a = 255 }
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use voxbridge_format::{Rgba, MAX_DIMENSION};
use voxbridge_geometry::mesh_builder::BuildOptions;
use voxbridge_geometry::voxelizer::DEFAULT_RAY_SEED;
use voxbridge_geometry::{ColorSampling, VoxelizerConfig};

use crate::error::{BridgeResult, ConfigError};

/// Import settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Edge length of one generated cube.
    pub scale: f32,
    /// Color cubes from the palette (otherwise neutral gray).
    pub apply_colors: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self { scale: 0.1, apply_colors: true }
    }
}

impl ImportConfig {
    /// Mesh builder options.
    #[must_use]
    pub const fn build_options(&self) -> BuildOptions {
        BuildOptions {
            scale: self.scale,
            apply_colors: self.apply_colors,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "import.scale must be finite and > 0, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}

/// Export settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Edge length of one voxel in mesh units.
    pub voxel_size: f32,
    /// Largest grid dimension; values above 256 are clamped.
    pub max_dimension: u32,
    /// Rays cast per cell.
    pub ray_samples: u32,
    /// Fill enclosed empty space.
    pub fill_interior: bool,
    /// Seed for the ray direction set.
    pub ray_seed: u64,
    /// Sample per-vertex colors.
    pub use_vertex_colors: bool,
    /// Sample material base colors.
    pub use_material_colors: bool,
    /// Reuse round-trip metadata when the host object carries it.
    pub preserve_roundtrip: bool,
    /// Color for faces without color data.
    pub fallback_color: Rgba,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            voxel_size: 0.1,
            max_dimension: 126,
            ray_samples: 3,
            fill_interior: false,
            ray_seed: DEFAULT_RAY_SEED,
            use_vertex_colors: true,
            use_material_colors: true,
            preserve_roundtrip: true,
            fallback_color: Rgba::NEUTRAL_GRAY,
        }
    }
}

impl ExportConfig {
    /// Voxelizer parameters, with `max_dimension` clamped to the format limit.
    #[must_use]
    pub fn voxelizer_config(&self) -> VoxelizerConfig {
        VoxelizerConfig {
            voxel_size: self.voxel_size,
            max_dimension: self.max_dimension.min(MAX_DIMENSION),
            ray_samples: self.ray_samples,
            fill_interior: self.fill_interior,
            ray_seed: self.ray_seed,
        }
    }

    /// Face color sampling rules.
    #[must_use]
    pub const fn color_sampling(&self) -> ColorSampling {
        ColorSampling {
            use_vertex_colors: self.use_vertex_colors,
            use_material_colors: self.use_material_colors,
            fallback: self.fallback_color,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.voxelizer_config()
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("export: {e}")))
    }
}

/// Complete conversion configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Import settings.
    pub import: ImportConfig,
    /// Export settings.
    pub export: ExportConfig,
}

impl ConvertConfig {
    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if a value cannot be represented.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BridgeError::Io`] if the file cannot be read, otherwise
    /// any [`ConvertConfig::from_toml_str`] error.
    pub fn load<P: AsRef<Path>>(path: P) -> BridgeResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded conversion config from {}", path.display());
        Ok(config)
    }

    /// Checks both sections.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.import.validate()?;
        self.export.validate()
    }
}
