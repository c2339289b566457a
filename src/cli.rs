//! CLI argument parsing module for compdetect

use crate::config::DetectionConfig;
use crate::domain::Ecosystem;
use crate::error::ConfigError;
use crate::output::{OutputConfig, OutputFormat};
use clap::Parser;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Static dependency manifest detector
#[derive(Parser, Debug, Clone)]
#[command(
    name = "compdetect",
    version,
    about = "Detect Conan and pip dependencies and build a component graph"
)]
pub struct CliArgs {
    /// Directory to scan, or a single manifest file (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    // Output options
    /// Report format: text or json
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable verbose output and debug logging
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - summary only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    // Ecosystem filters
    /// Detect only Conan manifests (conanfile.py, conanfile.txt, conan.lock)
    #[arg(long)]
    pub conan: bool,

    /// Detect only pip manifests (setup.py, requirements*.txt)
    #[arg(long)]
    pub pip: bool,

    // Run options
    /// Configuration file (default: compdetect.toml in the scanned directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum number of manifests processed concurrently
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,
}

impl CliArgs {
    /// Check if any ecosystem filter is specified
    pub fn has_ecosystem_filter(&self) -> bool {
        self.conan || self.pip
    }

    /// Ecosystems selected on the command line, if any
    pub fn ecosystems(&self) -> Option<Vec<Ecosystem>> {
        if !self.has_ecosystem_filter() {
            return None;
        }
        let mut selected = Vec::new();
        if self.conan {
            selected.push(Ecosystem::Conan);
        }
        if self.pip {
            selected.push(Ecosystem::Pip);
        }
        Some(selected)
    }

    /// Directory holding the default configuration file
    pub fn config_dir(&self) -> &Path {
        if self.path.is_file() {
            self.path.parent().unwrap_or(Path::new("."))
        } else {
            &self.path
        }
    }

    /// Loads the configuration file and applies command-line overrides
    pub fn load_config(&self) -> Result<DetectionConfig, ConfigError> {
        let config = match &self.config {
            Some(path) => DetectionConfig::load(path)?,
            None => DetectionConfig::from_dir(self.config_dir())?,
        };
        self.apply_overrides(config)
    }

    /// Applies command-line flags on top of file values
    pub fn apply_overrides(&self, mut config: DetectionConfig) -> Result<DetectionConfig, ConfigError> {
        if let Some(workers) = self.workers {
            config.max_workers = Some(workers);
        }
        if let Some(ecosystems) = self.ecosystems() {
            config.ecosystems = ecosystems;
        }
        config.validate()?;
        Ok(config)
    }

    /// Output configuration derived from the flags
    pub fn output_config(&self) -> OutputConfig {
        let color = !self.no_color && self.output.is_none() && std::io::stdout().is_terminal();
        OutputConfig::from_cli(self.format, self.verbose, self.quiet, color)
    }

    /// Whether to draw progress on stderr
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Text && std::io::stderr().is_terminal()
    }
}
