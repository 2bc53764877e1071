use crate::keys;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub border: BorderConfig,
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct BorderConfig {
    pub width: u32,
    pub color: u32,
}

/// One `[[bindings]]` entry, e.g. `keys = "Alt+Return"`, `action = "Spawn st"`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BindingConfig {
    pub keys: String,
    pub action: String,
}

impl BindingConfig {
    fn new(keys: &str, action: &str) -> Self {
        Self {
            keys: keys.to_string(),
            action: action.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            border: BorderConfig::default(),
            bindings: vec![
                BindingConfig::new("Alt+Shift+c", "Quit"),
                BindingConfig::new("Alt+Return", "Spawn st"),
            ],
        }
    }
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            width: 5,
            color: 0xffffff,
        }
    }
}

impl Config {
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("pwm").join("pwm.toml"))
            .unwrap_or_else(|| PathBuf::from("pwm.toml"))
    }

    pub fn load() -> Self {
        let config_path = Self::path();

        if !config_path.exists() {
            log::info!("Config not found at {:?}, using defaults", config_path);
            return Self::default();
        }

        let content = match fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(e) => {
                log::error!("Failed to read config {:?}: {}", config_path, e);
                return Self::default();
            }
        };
        match Self::from_toml(&content) {
            Ok(config) => {
                log::info!("Loaded config from {:?}", config_path);
                config
            }
            Err(e) => {
                log::error!("Failed to parse config: {}", e);
                Self::default()
            }
        }
    }

    /// Parses a config file and layers it over the defaults. A binding with
    /// the same key combination as a default replaces it in place, however
    /// the modifiers are spelled; the rest are appended in file order.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let file: Config = toml::from_str(content)?;
        let mut config = Self::default();
        config.border = file.border;

        for binding in file.bindings {
            let existing = keys::parse_keybind(&binding.keys).and_then(|combo| {
                config
                    .bindings
                    .iter_mut()
                    .find(|b| keys::parse_keybind(&b.keys) == Some(combo))
            });
            match existing {
                Some(existing) => *existing = binding,
                None => config.bindings.push(binding),
            }
        }
        Ok(config)
    }
}
