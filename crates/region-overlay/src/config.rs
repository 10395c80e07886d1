use core::time::Duration;
use std::{fs, io::ErrorKind, path::PathBuf};

use overlay_core::{KeyBindings, ScanCode, Size, geometry::DEFAULT_REFERENCE_SIZE};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

const FILE_NAME: &str = "overlay-config.toml";
const DIRECTORY_NAME: &str = "Region Overlay";

/// Path to the config directory, `None` if the platform has none.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(DIRECTORY_NAME))
}

/// User configuration, read once at start-up and never written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Scan code of the key held to drag.
    pub drag_key: u32,

    /// Scan code of the key that turns a drag into a window move.
    pub modifier_key: u32,

    /// Initial width of the overlay window.
    pub display_width: u32,

    /// Initial height of the overlay window.
    pub display_height: u32,

    /// The width transforms are expressed against.
    pub reference_width: u32,

    /// The height transforms are expressed against.
    pub reference_height: u32,

    /// Pause before retrying when duplication access is denied.
    pub access_denied_backoff_ms: u64,

    /// Longest wait for a desktop frame, waits indefinitely if absent.
    pub frame_timeout_ms: Option<u32>,
}

impl Config {
    /// Load the config file, falling back to the defaults if it is missing or invalid.
    pub fn load() -> Self {
        let Some(path) = config_dir().map(|dir| dir.join(FILE_NAME)) else {
            warn!("No config directory, using the default config");
            return Self::default();
        };

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                info!("No config file at {}, using the default config", path.display());
                return Self::default();
            }
            Err(error) => {
                warn!("Could not read {}, using the default config:\n{error}", path.display());
                return Self::default();
            }
        };

        match Self::parse(&contents) {
            Ok(config) => {
                info!("Loaded {config:?}");
                config
            }
            Err(error) => {
                warn!("Invalid config file, using the default config:\n{error}");
                Self::default()
            }
        }
    }

    /// Parse and validate a config file's contents.
    pub fn parse(contents: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(contents)?;

        if config.reference_width == 0 || config.reference_height == 0 {
            return Err(Error::ZeroReferenceSize);
        }

        Ok(config)
    }

    /// The drag and modifier keys.
    pub fn key_bindings(&self) -> KeyBindings {
        KeyBindings {
            drag: ScanCode(self.drag_key),
            modifier: ScanCode(self.modifier_key),
        }
    }

    /// The initial overlay size.
    pub fn display_size(&self) -> Size {
        Size::new(self.display_width, self.display_height).at_least_one()
    }

    /// The size transforms are expressed against.
    pub fn reference_size(&self) -> Size {
        Size::new(self.reference_width, self.reference_height)
    }

    /// Pause before retrying when duplication access is denied.
    pub fn access_denied_backoff(&self) -> Duration {
        Duration::from_millis(self.access_denied_backoff_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        let keys = KeyBindings::default();

        Self {
            drag_key: keys.drag.0,
            modifier_key: keys.modifier.0,
            display_width: 200,
            display_height: 200,
            reference_width: DEFAULT_REFERENCE_SIZE.width,
            reference_height: DEFAULT_REFERENCE_SIZE.height,
            access_denied_backoff_ms: 100,
            frame_timeout_ms: None,
        }
    }
}

/// Config file error.
#[derive(Debug, Error)]
pub enum Error {
    /// The file isn't valid TOML or has unknown fields.
    #[error("Failed to deserialize the config:\n{0}")]
    Deserialize(#[from] toml::de::Error),

    /// Transforms can't be expressed against an empty reference.
    #[error("The reference size must be non-zero")]
    ZeroReferenceSize,
}
