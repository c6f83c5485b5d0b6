//! Configuration file support for rev2
//!
//! Configuration is stored in TOML format at:
//! - Linux: `~/.config/rev2/config.toml`
//! - macOS: `~/Library/Application Support/rev2/config.toml`
//! - Windows: `%APPDATA%\rev2\config.toml`

use crate::error::{ConfigError, Result};
use clap::ValueEnum;
use directories::ProjectDirs;
use rev2_core::FrameFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sequencer conversion defaults
    pub sequencer: SequencerSettings,
    /// Output file defaults
    pub output: OutputSettings,
}

impl Config {
    /// Load configuration from the default config file location
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Err(ConfigError::Config(format!("Config file not found at {:?}", path)))
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if not found
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "rev2") {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            Err(ConfigError::Config("Could not determine config directory".to_string()))
        }
    }

    /// Create a default config file with comments
    pub fn create_default_config_file() -> Result<PathBuf> {
        let path = Self::config_path()?;
        Self::write_default_config(&path)?;
        Ok(path)
    }

    /// Write the commented default configuration to `path`
    pub fn write_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = r#"# rev2 configuration file

[sequencer]
# Poly sequencer track (0-5) read by to-gated
poly_track = 0

# First gated sequencer track (0-2) written by to-gated;
# velocities go to the next track
gated_track = 0

# Layers cleared by clear-poly: "a", "b" or "both"
clear_layers = "both"

[output]
# Message written by edit commands: "edit-buffer" or "program-dump"
format = "edit-buffer"

# Replace existing output files
overwrite = false
"#;

        fs::write(path, content)?;
        Ok(())
    }
}

/// Which layers an operation applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LayerSelection {
    /// Layer A only
    A,
    /// Layer B only
    B,
    /// Both layers
    Both,
}

impl LayerSelection {
    /// Flags for layer A and layer B
    pub fn flags(self) -> (bool, bool) {
        match self {
            LayerSelection::A => (true, false),
            LayerSelection::B => (false, true),
            LayerSelection::Both => (true, true),
        }
    }
}

/// Output message shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Edit buffer dump, does not overwrite stored programs
    EditBuffer,
    /// Program dump to the patch's slot
    ProgramDump,
}

impl From<OutputFormat> for FrameFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::EditBuffer => FrameFormat::EditBuffer,
            OutputFormat::ProgramDump => FrameFormat::ProgramDump,
        }
    }
}

/// Sequencer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerSettings {
    /// Poly sequencer source track (0-5)
    pub poly_track: usize,
    /// First gated sequencer target track (0-2)
    pub gated_track: usize,
    /// Layers cleared by clear-poly
    pub clear_layers: LayerSelection,
}

impl Default for SequencerSettings {
    fn default() -> Self {
        Self {
            poly_track: 0,
            gated_track: 0,
            clear_layers: LayerSelection::Both,
        }
    }
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Message format for edited programs
    pub format: OutputFormat,
    /// Replace existing output files
    pub overwrite: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::EditBuffer,
            overwrite: false,
        }
    }
}
