// SessionKeeper Config Store
// The persistent half of the configuration: one JSON file at the platform
// config path, read once at startup and rewritten on every change. The
// options surface edits single fields by dot-notation key, so updates go
// through a keyed setter rather than whole-struct replacement.

use std::fs;
use std::path::Path;

use crate::platform;
use crate::types::config::KeeperConfig;
use crate::types::errors::ConfigError;

/// Trait defining the config store interface.
pub trait ConfigStoreTrait {
    fn load(&mut self) -> Result<KeeperConfig, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn get_config(&self) -> &KeeperConfig;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), ConfigError>;
    fn reset(&mut self) -> Result<(), ConfigError>;
    fn get_config_path(&self) -> &str;
}

/// Config store implementation that persists configuration as JSON on disk.
pub struct ConfigStore {
    config_path: String,
    config: KeeperConfig,
}

impl ConfigStore {
    /// Creates a new ConfigStore.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise, uses the platform-specific config directory with `config.json`.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => {
                let config_dir = platform::get_config_dir();
                config_dir.join("config.json").to_string_lossy().to_string()
            }
        };

        Self {
            config_path,
            config: KeeperConfig::default(),
        }
    }
}

impl ConfigStoreTrait for ConfigStore {
    /// Loads the configuration file.
    ///
    /// A missing file means a fresh install and yields the defaults; a file
    /// that exists but fails to parse is an error, not silently replaced.
    fn load(&mut self) -> Result<KeeperConfig, ConfigError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            self.config = KeeperConfig::default();
            return Ok(self.config.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("Failed to read config file: {}", e)))?;

        let config: KeeperConfig = serde_json::from_str(&content).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;

        self.config = config;
        Ok(self.config.clone())
    }

    /// Writes the in-memory configuration out as pretty-printed JSON.
    fn save(&self) -> Result<(), ConfigError> {
        let path = Path::new(&self.config_path);

        // First save on a fresh profile has no config directory yet
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.config).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| ConfigError::IoError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Returns a reference to the current in-memory configuration.
    fn get_config(&self) -> &KeeperConfig {
        &self.config
    }

    /// Updates one field addressed by a dot-notation key, such as
    /// `"automation.retry_interval_secs"` or `"rotation.rotate_on_idle"`,
    /// and persists on success. Unknown keys and wrong-typed values are
    /// rejected with the configuration untouched.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), ConfigError> {
        if key.is_empty() {
            return Err(ConfigError::InvalidKey("Key cannot be empty".to_string()));
        }

        let parts: Vec<&str> = key.split('.').collect();
        if parts.is_empty() {
            return Err(ConfigError::InvalidKey("Key cannot be empty".to_string()));
        }

        // Edit through a JSON tree of the current config so the key path can
        // be walked without per-field match arms
        let mut json_value = serde_json::to_value(&self.config).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to serialize config: {}", e))
        })?;

        {
            let mut current = &mut json_value;
            for (i, part) in parts.iter().enumerate() {
                if i == parts.len() - 1 {
                    match current {
                        serde_json::Value::Object(map) => {
                            if !map.contains_key(*part) {
                                return Err(ConfigError::InvalidKey(format!(
                                    "Key '{}' not found in config",
                                    key
                                )));
                            }
                            map.insert(part.to_string(), value.clone());
                        }
                        _ => {
                            return Err(ConfigError::InvalidKey(format!(
                                "Cannot navigate to key '{}': intermediate value is not an object",
                                key
                            )));
                        }
                    }
                } else {
                    current = match current.get_mut(*part) {
                        Some(v) => v,
                        None => {
                            return Err(ConfigError::InvalidKey(format!(
                                "Key '{}' not found in config",
                                key
                            )));
                        }
                    };
                }
            }
        }

        // Reparsing into KeeperConfig rejects wrong-typed values before
        // anything is committed
        let new_config: KeeperConfig = serde_json::from_value(json_value).map_err(|e| {
            ConfigError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;

        self.config = new_config;
        self.save()?;

        Ok(())
    }

    /// Resets all configuration to factory defaults and saves to disk.
    fn reset(&mut self) -> Result<(), ConfigError> {
        self.config = KeeperConfig::default();
        self.save()?;
        Ok(())
    }

    /// Returns the path to the config file.
    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
