//! Layered configuration loading
//!
//! Config files may be TOML, JSON or YAML (chosen by extension). Layers are
//! merged through their JSON representation; `null` in an upper layer never
//! clears a value set by a lower one, so partially filled layers compose.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "auditview";
const CONFIG_FILE: &str = "config.toml";

/// Default config location: `$XDG_CONFIG_HOME/auditview/config.toml`, falling
/// back to `$HOME/.config/auditview/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join(APP_DIR).join(CONFIG_FILE))
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Load configuration from file (format chosen by extension)
pub fn load_config<T>(path: &Path) -> crate::Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content = std::fs::read_to_string(path)?;

    match extension_of(path).as_str() {
        "toml" => toml::from_str(&content)
            .map_err(|e| crate::UtilError::Config(format!("TOML parse error in {}: {e}", path.display()))),
        "json" => serde_json::from_str(&content)
            .map_err(|e| crate::UtilError::Config(format!("JSON parse error in {}: {e}", path.display()))),
        "yml" | "yaml" => serde_yaml::from_str(&content)
            .map_err(|e| crate::UtilError::Config(format!("YAML parse error in {}: {e}", path.display()))),
        other => Err(crate::UtilError::Config(format!("Unsupported config format: {other}"))),
    }
}

/// Write configuration as TOML, creating parent directories as needed
pub fn save_config<T>(path: &Path, config: &T) -> crate::Result<()>
where
    T: Serialize,
{
    let content = toml::to_string_pretty(config)
        .map_err(|e| crate::UtilError::Serialization(format!("TOML serialization error: {e}")))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn merge_json_values(base: &mut serde_json::Value, override_value: serde_json::Value) {
    match (base, override_value) {
        (_, serde_json::Value::Null) => {}
        (serde_json::Value::Object(base_obj), serde_json::Value::Object(override_obj)) => {
            for (key, value) in override_obj {
                match base_obj.get_mut(&key) {
                    Some(existing) => merge_json_values(existing, value),
                    None => {
                        base_obj.insert(key, value);
                    }
                }
            }
        }
        (base_value, override_value) => {
            *base_value = override_value;
        }
    }
}

/// Merge two configurations (set values in the second override the first)
pub fn merge_configs<T>(base: &mut T, override_config: T) -> crate::Result<()>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    let mut base_value = serde_json::to_value(&*base)
        .map_err(|e| crate::UtilError::Serialization(format!("Base serialization error: {e}")))?;
    let override_value = serde_json::to_value(override_config)
        .map_err(|e| crate::UtilError::Serialization(format!("Override serialization error: {e}")))?;

    merge_json_values(&mut base_value, override_value);

    *base = serde_json::from_value(base_value)
        .map_err(|e| crate::UtilError::Serialization(format!("Result deserialization error: {e}")))?;
    Ok(())
}

/// Configuration builder for fluent layering
#[derive(Debug)]
pub struct ConfigBuilder<T> {
    config: T,
}

impl<T> ConfigBuilder<T>
where
    T: Default + Serialize + for<'de> Deserialize<'de>,
{
    /// Start from `T::default()`
    pub fn new() -> Self {
        Self { config: T::default() }
    }

    /// Merge a config file on top
    pub fn load_file(mut self, path: &Path) -> crate::Result<Self> {
        let file_config: T = load_config(path)?;
        merge_configs(&mut self.config, file_config)?;
        Ok(self)
    }

    /// Merge a config file on top if it exists
    pub fn load_optional_file(self, path: Option<&Path>) -> crate::Result<Self> {
        match path {
            Some(path) if path.exists() => self.load_file(path),
            _ => Ok(self),
        }
    }

    /// Merge another layer on top
    pub fn merge(mut self, other: T) -> crate::Result<Self> {
        merge_configs(&mut self.config, other)?;
        Ok(self)
    }

    pub fn build(self) -> T {
        self.config
    }
}

impl<T> Default for ConfigBuilder<T>
where
    T: Default + Serialize + for<'de> Deserialize<'de>,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct TestConfig {
        name: Option<String>,
        port: Option<u16>,
        enabled: bool,
        items: Vec<String>,
    }

    #[test]
    fn test_load_config_by_extension() -> crate::Result<()> {
        let temp_dir = tempdir()?;

        let toml_path = temp_dir.path().join("test.toml");
        std::fs::write(&toml_path, "name = \"toml\"\nport = 9000\nenabled = true\nitems = [\"x\"]\n")?;
        let config: TestConfig = load_config(&toml_path)?;
        assert_eq!(config.name.as_deref(), Some("toml"));
        assert_eq!(config.port, Some(9000));

        let json_path = temp_dir.path().join("test.json");
        std::fs::write(&json_path, r#"{"name": "json", "enabled": false, "items": []}"#)?;
        let config: TestConfig = load_config(&json_path)?;
        assert_eq!(config.name.as_deref(), Some("json"));
        assert_eq!(config.port, None);

        let yaml_path = temp_dir.path().join("test.yaml");
        std::fs::write(&yaml_path, "name: yaml\nenabled: true\nitems:\n  - a\n")?;
        let config: TestConfig = load_config(&yaml_path)?;
        assert_eq!(config.items, vec!["a"]);

        Ok(())
    }

    #[test]
    fn test_unsupported_extension() -> crate::Result<()> {
        let temp_dir = tempdir()?;
        let ini_path = temp_dir.path().join("config.ini");
        std::fs::write(&ini_path, "[main]\nname = ini\n")?;

        let result: crate::Result<TestConfig> = load_config(&ini_path);
        match result {
            Err(crate::UtilError::Config(message)) => {
                assert_eq!(message, "Unsupported config format: ini");
            }
            other => panic!("expected unsupported format error, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_merge_keeps_values_not_overridden() -> crate::Result<()> {
        let mut base = TestConfig {
            name: Some("base".to_string()),
            port: Some(8080),
            enabled: false,
            items: vec!["a".to_string()],
        };
        let layer = TestConfig {
            name: None,
            port: Some(9000),
            enabled: true,
            items: vec![],
        };

        merge_configs(&mut base, layer)?;

        assert_eq!(base.name.as_deref(), Some("base"));
        assert_eq!(base.port, Some(9000));
        assert!(base.enabled);
        assert!(base.items.is_empty());
        Ok(())
    }

    #[test]
    fn test_save_then_build() -> crate::Result<()> {
        let temp_dir = tempdir()?;
        let path = temp_dir.path().join("nested").join("config.toml");
        let config = TestConfig {
            name: Some("saved".to_string()),
            ..TestConfig::default()
        };
        save_config(&path, &config)?;

        let loaded: TestConfig = ConfigBuilder::new().load_optional_file(Some(&path))?.build();
        assert_eq!(loaded.name.as_deref(), Some("saved"));

        let missing: TestConfig = ConfigBuilder::new()
            .load_optional_file(Some(&temp_dir.path().join("absent.toml")))?
            .build();
        assert_eq!(missing, TestConfig::default());
        Ok(())
    }
}
