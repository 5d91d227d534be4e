//! Settings for the lava-device tool

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub devices: DevicesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevicesConfig {
    /// Directory holding `<hostname>.yaml` device configurations
    #[serde(default = "default_devices_path")]
    pub path: PathBuf,
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            path: default_devices_path(),
        }
    }
}

fn default_devices_path() -> PathBuf {
    PathBuf::from("/etc/lava-server/dispatcher-config/devices")
}

impl Config {
    /// Resolve a device argument to a file: an existing path is used as-is,
    /// anything else is treated as a hostname in the devices directory
    pub fn device_path(&self, device: &str) -> PathBuf {
        let direct = Path::new(device);
        if direct.is_file() {
            return direct.to_path_buf();
        }
        let path = self.devices.path.join(format!("{}.yaml", device));
        debug!(device, path = %path.display(), "Resolved device by hostname");
        path
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        debug!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("lava-device.toml")).unwrap();
        assert_eq!(config.devices.path, default_devices_path());
    }

    #[test]
    fn test_load_devices_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lava-device.toml");
        std::fs::write(&path, "[devices]\npath = \"/srv/devices\"\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.devices.path, PathBuf::from("/srv/devices"));
    }

    #[test]
    fn test_device_path_resolution() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("local.yaml");
        std::fs::write(&file, "device_type: qemu\n").unwrap();

        let config = Config {
            devices: DevicesConfig {
                path: PathBuf::from("/srv/devices"),
            },
        };
        assert_eq!(config.device_path(file.to_str().unwrap()), file);
        assert_eq!(
            config.device_path("qemu01"),
            PathBuf::from("/srv/devices/qemu01.yaml")
        );
    }

    #[test]
    fn test_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lava-device.toml");
        std::fs::write(&path, "[devices\n").unwrap();
        assert!(load_config(&path).is_err());
    }
}
