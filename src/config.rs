//! Input system configuration
//!
//! Supports multiple profiles (debug, release) with different settings.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Pointer table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointerConfig {
    /// Number of simultaneous pointer slots (mouse cursor shares slot 0
    /// with the first touch contact)
    pub max_pointers: usize,
    /// Force touch-screen event routing on or off; unset picks the
    /// target platform default
    #[serde(default)]
    pub touch_screen: Option<bool>,
}

/// Android gamepad path configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamepadConfig {
    /// Stick deflection magnitude treated as a directional press
    pub deadzone: f32,
}

/// Head tracking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadTrackingConfig {
    /// Apply the display-orientation correction to tracking transforms
    pub orientation_correction: bool,
}

/// Input system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// The active profile (debug, release, etc.)
    pub profile: String,
    /// Pointer table configuration
    pub pointer: PointerConfig,
    /// Android gamepad path configuration
    pub gamepad: GamepadConfig,
    /// Head tracking configuration
    pub head_tracking: HeadTrackingConfig,
}

impl InputConfig {
    /// Loads configuration based on the specified profile
    ///
    /// Profiles are loaded from config files in the following order:
    /// 1. config/{profile}.toml (profile-specific configuration)
    /// 2. Environment variables with prefix INPUT_ (e.g., INPUT_GAMEPAD__DEADZONE=0.4)
    ///
    /// Config files are searched for in:
    /// 1. Next to the executable (target/debug/config or target/release/config)
    /// 2. In the current directory (./config)
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        // Find config directory - try relative to executable first, then current directory
        let config_dir = Self::find_config_dir();

        let mut builder = Config::builder()
            .set_default("pointer.max_pointers", 10_i64)?
            .set_default("gamepad.deadzone", 0.5_f64)?
            .set_default("head_tracking.orientation_correction", false)?;

        // Add profile-specific configuration
        if let Some(ref dir) = config_dir {
            let profile_path = dir.join(profile);
            builder = builder.add_source(File::from(profile_path.as_path()).required(false));
        } else {
            builder =
                builder.add_source(File::with_name(&format!("config/{}", profile)).required(false));
        }

        // Add environment variables with INPUT_ prefix
        // Use __ as separator for nested fields (e.g., INPUT_POINTER__MAX_POINTERS)
        builder = builder.add_source(
            Environment::with_prefix("INPUT")
                .separator("__")
                .try_parsing(true),
        );

        // Set the profile
        let config = builder.set_override("profile", profile)?.build()?;

        config.try_deserialize()
    }

    /// Finds the config directory by searching in multiple locations
    fn find_config_dir() -> Option<std::path::PathBuf> {
        // Try to find config dir relative to executable
        if let Ok(exe_path) = std::env::current_exe()
            && let Some(exe_dir) = exe_path.parent()
        {
            let config_dir = exe_dir.join("config");
            if config_dir.exists() {
                return Some(config_dir);
            }
        }

        // Fall back to current directory
        let cwd_config = std::path::PathBuf::from("config");
        if cwd_config.exists() {
            return Some(cwd_config);
        }

        None
    }

    /// Loads configuration using the INPUT_PROFILE environment variable,
    /// defaulting to "release"
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let profile = std::env::var("INPUT_PROFILE").unwrap_or_else(|_| "release".to_string());
        Self::load(&profile)
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self::load("release").unwrap_or_else(|_| Self {
            profile: "release".to_string(),
            pointer: PointerConfig {
                max_pointers: 10,
                touch_screen: None,
            },
            gamepad: GamepadConfig { deadzone: 0.5 },
            head_tracking: HeadTrackingConfig {
                orientation_correction: false,
            },
        })
    }
}
