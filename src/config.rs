//! Configuration file handling.
//!
//! Settings are read from `compdetect.toml` in the scanned directory, or
//! from the file given with `--config`. Command-line flags override them.
//!
//! # Example Configuration
//!
//! ```toml
//! max_workers = 4
//! ecosystems = ["conan", "pip"]
//! exclude_dirs = [".git", ".venv", "third_party"]
//!
//! [pip]
//! ignored_packages = ["pip", "setuptools", "wheel"]
//! ```

use crate::domain::Ecosystem;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;

/// File name looked up in the scanned directory
pub const CONFIG_FILE_NAME: &str = "compdetect.toml";

/// Packaging tools that show up in setup scripts but are not dependencies
const DEFAULT_PIP_IGNORED: &[&str] = &[
    "pip",
    "pip-tools",
    "pip-review",
    "pkg-resources",
    "setuptools",
    "wheel",
    "-markerlib",
];

const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".tox",
    ".venv",
    "venv",
    "__pycache__",
    "node_modules",
    "target",
];

/// Detection run configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectionConfig {
    /// Upper bound on manifests processed concurrently.
    ///
    /// Default: available parallelism
    pub max_workers: Option<usize>,

    /// Ecosystems to detect.
    ///
    /// Default: all
    pub ecosystems: Vec<Ecosystem>,

    /// Directory names skipped during discovery
    pub exclude_dirs: Vec<String>,

    /// pip specific settings
    pub pip: PipConfig,
}

/// pip specific settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipConfig {
    /// Package names dropped before normalization.
    ///
    /// Compared by normalized name; a trailing `*` matches any suffix.
    pub ignored_packages: Vec<String>,
}

impl Default for PipConfig {
    fn default() -> Self {
        Self {
            ignored_packages: DEFAULT_PIP_IGNORED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            max_workers: None,
            ecosystems: Ecosystem::all().to_vec(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            pip: PipConfig::default(),
        }
    }
}

impl DetectionConfig {
    /// Loads and validates a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
        let config: Self =
            toml::from_str(&content).map_err(|e| ConfigError::invalid(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `compdetect.toml` from `dir`, or returns defaults when absent
    pub fn from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Rejects values that cannot drive a run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(0) = self.max_workers {
            return Err(ConfigError::InvalidWorkers { value: 0 });
        }
        Ok(())
    }

    /// Effective worker count
    pub fn workers(&self) -> usize {
        self.max_workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        })
    }

    /// Returns true if the ecosystem is enabled
    pub fn is_enabled(&self, ecosystem: Ecosystem) -> bool {
        self.ecosystems.contains(&ecosystem)
    }

    /// Returns true if a declared package should be dropped
    pub fn should_ignore(&self, ecosystem: Ecosystem, name: &str) -> bool {
        match ecosystem {
            Ecosystem::Pip => {
                let key = ecosystem.name_key(name);
                self.pip.ignored_packages.iter().any(|pattern| {
                    match pattern.strip_suffix('*') {
                        Some(prefix) => key.starts_with(&ecosystem.name_key(prefix)),
                        None => key == ecosystem.name_key(pattern),
                    }
                })
            }
            Ecosystem::Conan => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = DetectionConfig::default();
        assert_eq!(config.ecosystems, vec![Ecosystem::Conan, Ecosystem::Pip]);
        assert!(config.exclude_dirs.contains(&".git".to_string()));
        assert!(config.workers() >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_file() {
        let config: DetectionConfig = toml::from_str(
            r#"
max_workers = 3
ecosystems = ["pip"]
exclude_dirs = ["vendor"]

[pip]
ignored_packages = ["setuptools"]
"#,
        )
        .unwrap();
        assert_eq!(config.workers(), 3);
        assert!(config.is_enabled(Ecosystem::Pip));
        assert!(!config.is_enabled(Ecosystem::Conan));
        assert_eq!(config.exclude_dirs, vec!["vendor"]);
        assert!(config.should_ignore(Ecosystem::Pip, "setuptools"));
        assert!(!config.should_ignore(Ecosystem::Pip, "wheel"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: DetectionConfig = toml::from_str("max_workers = 2\n").unwrap();
        assert_eq!(config.ecosystems, Ecosystem::all().to_vec());
        assert!(config.should_ignore(Ecosystem::Pip, "wheel"));
    }

    #[test]
    fn test_should_ignore_folds_names() {
        let config = DetectionConfig::default();
        assert!(config.should_ignore(Ecosystem::Pip, "Pkg_Resources"));
        assert!(config.should_ignore(Ecosystem::Pip, "SetupTools"));
        assert!(!config.should_ignore(Ecosystem::Pip, "requests"));
        assert!(!config.should_ignore(Ecosystem::Conan, "setuptools"));
    }

    #[test]
    fn test_should_ignore_prefix_pattern() {
        let mut config = DetectionConfig::default();
        config.pip.ignored_packages = vec!["types-*".to_string()];
        assert!(config.should_ignore(Ecosystem::Pip, "types_requests"));
        assert!(!config.should_ignore(Ecosystem::Pip, "typing"));
    }

    #[test]
    fn test_load_rejects_unknown_field() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "max_wrkers = 2\n").unwrap();
        let err = DetectionConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_load_rejects_unknown_ecosystem() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "ecosystems = [\"npm\"]\n").unwrap();
        assert!(DetectionConfig::load(&path).is_err());
    }

    #[test]
    fn test_load_rejects_zero_workers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "max_workers = 0\n").unwrap();
        let err = DetectionConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWorkers { value: 0 }));
    }

    #[test]
    fn test_from_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            DetectionConfig::from_dir(dir.path()).unwrap(),
            DetectionConfig::default()
        );

        fs::write(dir.path().join(CONFIG_FILE_NAME), "max_workers = 5\n").unwrap();
        assert_eq!(DetectionConfig::from_dir(dir.path()).unwrap().workers(), 5);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = DetectionConfig::load(Path::new("/nonexistent/compdetect.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
