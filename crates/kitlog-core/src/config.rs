//! Configuration file parsing for kitlog
//!
//! Supports multiple configuration file formats:
//! - TOML (.toml)
//! - YAML (.yaml, .yml)
//! - JSON (.json)

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::entry::Level;
use crate::error::{Error, Result};
use crate::size::ByteSize;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    /// Detect format from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Rotating file section of a config file
#[derive(Debug, Clone, Deserialize)]
pub struct RotateSection {
    /// Active log file; archives are created next to it
    pub path: PathBuf,
    /// Rotation threshold, e.g. `2MB` or `1048576`
    pub max_file_size: Option<ByteSize>,
    /// Number of archives to keep
    pub max_files: Option<usize>,
    /// Capacity of the pending-line queue
    pub queue_capacity: Option<usize>,
}

impl RotateSection {
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size.map(ByteSize::bytes).unwrap_or(DEFAULT_FILE_SIZE)
    }

    pub fn max_files(&self) -> usize {
        self.max_files.unwrap_or(DEFAULT_FILE_COUNT)
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY)
    }
}

/// Configuration file structure (kitlog.toml/yaml/json)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Program name stamped on entries that carry none
    pub program: Option<String>,
    /// Also write entries to the console
    #[serde(default)]
    pub console: bool,
    /// Only entries with these levels pass; empty means all
    #[serde(default)]
    pub levels: Vec<Level>,
    /// Plain, non-rotating log file
    pub file: Option<PathBuf>,
    /// Rotating log file
    pub rotate: Option<RotateSection>,
}

impl ConfigFile {
    /// Load config from file, automatically detecting format from extension
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::ConfigError(format!(
                "Unsupported config file extension: {}. Expected .toml, .yaml, .yml, or .json",
                path.display()
            ))
        })?;

        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content, format)?;

        // Relative log paths are relative to the config file
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.resolve_paths(base_dir))
    }

    /// Parse config content with specified format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        match format {
            ConfigFormat::Toml => Self::from_toml(content),
            ConfigFormat::Yaml => Self::from_yaml(content),
            ConfigFormat::Json => Self::from_json(content),
        }
    }

    /// Parse TOML config content
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ConfigFile = toml::from_str(content)?;
        Ok(config)
    }

    /// Parse YAML config content
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: ConfigFile = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Parse JSON config content
    pub fn from_json(content: &str) -> Result<Self> {
        let config: ConfigFile = serde_json::from_str(content)?;
        Ok(config)
    }

    /// Find and load config file from a directory
    pub fn find_and_load(dir: &Path) -> Result<(Self, PathBuf)> {
        for name in CONFIG_FILES {
            let path = dir.join(name);
            if path.exists() {
                let config = Self::load(&path)?;
                return Ok((config, path));
            }
        }
        Err(Error::ConfigError(format!(
            "No config file found in {}. Expected one of: {:?}",
            dir.display(),
            CONFIG_FILES
        )))
    }

    /// Program name, falling back to the default logger name
    pub fn program(&self) -> &str {
        self.program.as_deref().unwrap_or(DEFAULT_PROGRAM)
    }

    fn resolve_paths(mut self, base_dir: &Path) -> Self {
        let resolve = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base_dir.join(p)
            }
        };
        self.file = self.file.as_deref().map(resolve);
        if let Some(rotate) = self.rotate.as_mut() {
            rotate.path = resolve(&rotate.path);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_format_detection() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("yaml"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("yml"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("JSON"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("txt"), None);
    }

    #[test]
    fn test_config_parse_toml() {
        let config_content = r#"
program = "api"
console = true
levels = ["info", "warn", "error"]

[rotate]
path = "/var/log/api/api.log"
max_file_size = "2MB"
max_files = 3
"#;
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = ConfigFile::load(file.path()).unwrap();
        assert_eq!(config.program(), "api");
        assert!(config.console);
        assert_eq!(config.levels, vec![Level::Info, Level::Warn, Level::Error]);

        let rotate = config.rotate.unwrap();
        assert_eq!(rotate.path, PathBuf::from("/var/log/api/api.log"));
        assert_eq!(rotate.max_file_size(), 2 * MB);
        assert_eq!(rotate.max_files(), 3);
        assert_eq!(rotate.queue_capacity(), DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn test_config_parse_yaml() {
        let config_content = r#"
program: worker
rotate:
  path: logs/worker.log
  max_file_size: 65536
  queue_capacity: 128
"#;
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = ConfigFile::load(file.path()).unwrap();
        assert_eq!(config.program(), "worker");
        assert!(!config.console);

        let rotate = config.rotate.unwrap();
        let base = file.path().parent().unwrap();
        assert_eq!(rotate.path, base.join("logs/worker.log"));
        assert_eq!(rotate.max_file_size(), 64 * KB);
        assert_eq!(rotate.max_files(), DEFAULT_FILE_COUNT);
        assert_eq!(rotate.queue_capacity(), 128);
    }

    #[test]
    fn test_config_parse_json() {
        let config_content = r#"
{
    "file": "/tmp/plain.log",
    "levels": ["access"]
}
"#;
        let config = ConfigFile::parse(config_content, ConfigFormat::Json).unwrap();
        assert_eq!(config.program(), DEFAULT_PROGRAM);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/plain.log")));
        assert_eq!(config.levels, vec![Level::Access]);
        assert!(config.rotate.is_none());
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let bad_size = "[rotate]\npath = \"a.log\"\nmax_file_size = \"huge\"\n";
        assert!(matches!(ConfigFile::from_toml(bad_size), Err(Error::TomlError(_))));

        let bad_level = "levels:\n  - verbose\n";
        assert!(matches!(ConfigFile::from_yaml(bad_level), Err(Error::YamlError(_))));
    }

    #[test]
    fn test_config_not_found() {
        let result = ConfigFile::load(Path::new("/nonexistent/kitlog.toml"));
        assert!(matches!(result, Err(Error::ConfigNotFound(_))));
    }

    #[test]
    fn test_config_unsupported_extension() {
        let file = NamedTempFile::with_suffix(".ini").unwrap();
        let result = ConfigFile::load(file.path());
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_find_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("kitlog.yml"), "program: found\n").unwrap();

        let (config, path) = ConfigFile::find_and_load(dir.path()).unwrap();
        assert_eq!(config.program(), "found");
        assert_eq!(path, dir.path().join("kitlog.yml"));

        let empty = tempfile::TempDir::new().unwrap();
        assert!(ConfigFile::find_and_load(empty.path()).is_err());
    }
}
