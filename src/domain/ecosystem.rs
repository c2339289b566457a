//! Ecosystem type definitions for supported package managers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Supported package-manager ecosystems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// Conan (conanfile.py, conanfile.txt, conan.lock)
    Conan,
    /// pip (setup.py, requirements.txt)
    Pip,
}

impl Ecosystem {
    /// Returns the manifest filenames recognized for this ecosystem
    pub fn manifest_filenames(&self) -> &'static [&'static str] {
        match self {
            Ecosystem::Conan => &["conanfile.py", "conanfile.txt", "conan.lock"],
            Ecosystem::Pip => &["setup.py", "requirements.txt"],
        }
    }

    /// Returns the display name for this ecosystem
    pub fn display_name(&self) -> &'static str {
        match self {
            Ecosystem::Conan => "Conan",
            Ecosystem::Pip => "pip",
        }
    }

    /// Returns the lowercase tag used in reports and configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Conan => "conan",
            Ecosystem::Pip => "pip",
        }
    }

    /// Folds a package name into the key used for identity comparison.
    ///
    /// Conan names compare case-insensitively. pip names follow PEP 503:
    /// case-insensitive, with runs of `-`, `_` and `.` treated as one `-`.
    pub fn name_key(&self, name: &str) -> String {
        let trimmed = name.trim();
        match self {
            Ecosystem::Conan => trimmed.to_lowercase(),
            Ecosystem::Pip => {
                let mut key = String::with_capacity(trimmed.len());
                let mut in_separator = false;
                for c in trimmed.chars() {
                    if matches!(c, '-' | '_' | '.') {
                        if !in_separator {
                            key.push('-');
                        }
                        in_separator = true;
                    } else {
                        key.extend(c.to_lowercase());
                        in_separator = false;
                    }
                }
                key
            }
        }
    }

    /// Returns all supported ecosystems
    pub fn all() -> &'static [Ecosystem] {
        &[Ecosystem::Conan, Ecosystem::Pip]
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Ecosystem {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conan" => Ok(Ecosystem::Conan),
            "pip" | "python" | "pypi" => Ok(Ecosystem::Pip),
            _ => Err(ConfigError::InvalidEcosystem {
                value: s.to_string(),
            }),
        }
    }
}
