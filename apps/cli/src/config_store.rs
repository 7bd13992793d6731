//! Project configuration kept in `<project root>/.multicloud/config.yaml`.
//!
//! The document is an untyped YAML mapping addressed with dot-separated keys
//! (`author.name`, `defaults.runtime`), so users may add keys of their own.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

pub const PROJECT_ROOT_ENV: &str = "MULTICLOUD_PROJECT_ROOT";
pub const CONFIG_DIR: &str = ".multicloud";
pub const CONFIG_FILE: &str = "config.yaml";

pub fn default_config() -> Value {
    json!({
        "author": {"name": "", "email": ""},
        "defaults": {
            "runtime": "python",
            "memory": "128Mi",
            "timeout": "30s",
            "log_level": "INFO",
            "license": "",
            "version": "0.1.0",
        },
        "platforms": {"knative": {}, "aws": {}, "azure": {}, "gcp": {}},
    })
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
    file: PathBuf,
}

impl ConfigStore {
    pub fn for_root(root: impl AsRef<Path>) -> Self {
        let dir = root.as_ref().join(CONFIG_DIR);
        let file = dir.join(CONFIG_FILE);
        Self { dir, file }
    }

    /// Store under `MULTICLOUD_PROJECT_ROOT`, or the current directory.
    pub fn discover() -> Result<Self> {
        let root = match env::var_os(PROJECT_ROOT_ENV) {
            Some(root) if !root.is_empty() => PathBuf::from(root),
            _ => env::current_dir().context("cannot determine current directory")?,
        };
        Ok(Self::for_root(root))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Reads the configuration, writing the defaults first when no file exists.
    /// A file that does not parse yields the defaults and is left untouched.
    pub fn load(&self) -> Result<Value> {
        if !self.file.exists() {
            let config = default_config();
            self.save(&config)?;
            return Ok(config);
        }

        let raw = fs::read_to_string(&self.file)
            .with_context(|| format!("failed to read {}", self.file.display()))?;
        if raw.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        match serde_yaml_bw::from_str::<Value>(&raw) {
            Ok(Value::Null) => Ok(Value::Object(Map::new())),
            Ok(config) => Ok(config),
            Err(err) => {
                warn!(error = %err, path = %self.file.display(), "error loading config, using defaults");
                Ok(default_config())
            }
        }
    }

    pub fn save(&self, config: &Value) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let rendered = serde_yaml_bw::to_string(config).context("failed to render config")?;
        fs::write(&self.file, rendered)
            .with_context(|| format!("failed to write {}", self.file.display()))?;
        debug!(path = %self.file.display(), "config saved");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let config = self.load()?;
        Ok(lookup(&config, key).cloned())
    }

    /// Stores `value` as a string under `key` and persists the file.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_many(&[(key, value)])
    }

    pub fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut config = self.load()?;
        for (key, value) in entries {
            assign(&mut config, key, Value::String((*value).to_string()))?;
        }
        self.save(&config)
    }

    /// Removes the file. Returns whether one existed.
    pub fn reset(&self) -> Result<bool> {
        match fs::remove_file(&self.file) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => {
                Err(err).with_context(|| format!("failed to remove {}", self.file.display()))
            }
        }
    }
}

pub fn lookup<'a>(config: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.')
        .try_fold(config, |current, part| current.as_object()?.get(part))
}

/// Writes `value` at a dotted `key`, creating missing intermediate mappings.
pub fn assign(config: &mut Value, key: &str, value: Value) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|part| part.is_empty()) {
        bail!("invalid key '{key}'");
    }
    let (last, parents) = parts
        .split_last()
        .with_context(|| format!("invalid key '{key}'"))?;

    let mut current = config;
    for (depth, part) in parents.iter().enumerate() {
        let map = match current {
            Value::Object(map) => map,
            _ => bail!("'{}' is not a mapping", parents[..depth].join(".")),
        };
        current = map
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    match current {
        Value::Object(map) => {
            map.insert(last.to_string(), value);
            Ok(())
        }
        _ => bail!("'{}' is not a mapping", parents.join(".")),
    }
}

/// Renders a value for display: scalars inline, mappings and lists as YAML.
pub fn render(value: &Value) -> Result<String> {
    Ok(match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(_) | Value::Object(_) => serde_yaml_bw::to_string(value)?
            .trim_end()
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::for_root(dir.path());

        let config = store.load().unwrap();

        assert_eq!(config, default_config());
        assert!(dir.path().join(".multicloud/config.yaml").exists());
        assert_eq!(
            lookup(&config, "defaults.memory"),
            Some(&Value::String("128Mi".into()))
        );
    }

    #[test]
    fn set_creates_nested_keys_and_persists() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::for_root(dir.path());

        store.set("platforms.knative.namespace", "functions").unwrap();
        store.set("author.name", "Ana Lima").unwrap();

        let reopened = ConfigStore::for_root(dir.path());
        assert_eq!(
            reopened.get("platforms.knative.namespace").unwrap(),
            Some(json!("functions"))
        );
        assert_eq!(reopened.get("author.name").unwrap(), Some(json!("Ana Lima")));
        assert_eq!(reopened.get("defaults.runtime").unwrap(), Some(json!("python")));
        assert_eq!(reopened.get("author.phone").unwrap(), None);
    }

    #[test]
    fn assign_refuses_to_descend_into_scalars() {
        let mut config = default_config();
        let err = assign(&mut config, "defaults.runtime.version", json!("3.12")).unwrap_err();
        assert!(err.to_string().contains("'defaults.runtime' is not a mapping"));
        assert!(assign(&mut config, "defaults..x", json!("1")).is_err());
    }

    #[test]
    fn unparsable_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::for_root(dir.path());
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.file(), "author: [unclosed\n").unwrap();

        assert_eq!(store.load().unwrap(), default_config());
        assert_eq!(
            fs::read_to_string(store.file()).unwrap(),
            "author: [unclosed\n"
        );
    }

    #[test]
    fn reset_removes_file() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::for_root(dir.path());
        assert!(!store.reset().unwrap());
        store.load().unwrap();
        assert!(store.reset().unwrap());
        assert!(!store.file().exists());
    }

    #[test]
    fn render_scalars_inline() {
        assert_eq!(render(&json!("python")).unwrap(), "python");
        assert_eq!(render(&json!(3)).unwrap(), "3");
        assert!(render(&json!({"name": "Ana"})).unwrap().contains("name: Ana"));
    }
}
