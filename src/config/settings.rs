//! Configuration settings for the puzzle solver

use crate::numberlink::EncodingOptions;
use crate::sat::SolverOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub encoding: EncodingConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Numberlink redundancy elimination
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncodingConfig {
    #[serde(default)]
    pub u_shape: bool,
    #[serde(default)]
    pub u_shape_long: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub max_solutions: usize,
    pub track_core: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    #[serde(default)]
    pub dimacs_file: Option<PathBuf>,
    #[serde(default)]
    pub meaning_file: Option<PathBuf>,
    pub output_directory: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Worker threads, `None` for the rayon default
    #[serde(default)]
    pub threads: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_solutions: 1,
            track_core: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            dimacs_file: None,
            meaning_file: None,
            output_directory: PathBuf::from("output/solutions"),
        }
    }
}

impl EncodingConfig {
    pub fn options(&self) -> EncodingOptions {
        EncodingOptions {
            u_shape: self.u_shape,
            u_shape_long: self.u_shape_long,
        }
    }
}

impl SolverConfig {
    pub fn options(&self) -> SolverOptions {
        SolverOptions {
            track_core: self.track_core,
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.solver.max_solutions == 0 {
            anyhow::bail!("Maximum solutions must be positive");
        }

        if self.batch.threads == Some(0) {
            anyhow::bail!("Batch thread count must be positive");
        }

        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(max_solutions) = cli_overrides.max_solutions {
            self.solver.max_solutions = max_solutions;
        }
        if cli_overrides.u_shape {
            self.encoding.u_shape = true;
        }
        if cli_overrides.u_shape_long {
            self.encoding.u_shape_long = true;
        }
        if let Some(ref dimacs_file) = cli_overrides.dimacs_file {
            self.output.dimacs_file = Some(dimacs_file.clone());
        }
        if let Some(ref meaning_file) = cli_overrides.meaning_file {
            self.output.meaning_file = Some(meaning_file.clone());
        }
        if let Some(ref output_dir) = cli_overrides.output_dir {
            self.output.output_directory = output_dir.clone();
        }
        if let Some(format) = cli_overrides.format {
            self.output.format = format;
        }
        if let Some(threads) = cli_overrides.threads {
            self.batch.threads = Some(threads);
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub max_solutions: Option<usize>,
    /// Flags only switch a family on; the file decides otherwise
    pub u_shape: bool,
    pub u_shape_long: bool,
    pub dimacs_file: Option<PathBuf>,
    pub meaning_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub threads: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.solver.max_solutions, 1);
        assert!(settings.solver.track_core);
        assert!(!settings.encoding.u_shape);
        assert_eq!(settings.output.format, OutputFormat::Text);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut settings = Settings::default();
        settings.encoding.u_shape_long = true;
        settings.solver.max_solutions = 3;
        settings.output.dimacs_file = Some(PathBuf::from("out.cnf"));
        settings.to_file(&path).unwrap();

        let loaded = Settings::from_file(&path).unwrap();
        assert!(loaded.encoding.u_shape_long);
        assert_eq!(loaded.solver.max_solutions, 3);
        assert_eq!(loaded.output.dimacs_file, Some(PathBuf::from("out.cnf")));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "encoding:\n  u_shape: true\n").unwrap();

        let loaded = Settings::from_file(&path).unwrap();
        assert!(loaded.encoding.u_shape);
        assert!(!loaded.encoding.u_shape_long);
        assert_eq!(loaded.solver.max_solutions, 1);
        assert_eq!(loaded.batch.threads, None);
    }

    #[test]
    fn test_validation_rejects_zero() {
        let mut settings = Settings::default();
        settings.solver.max_solutions = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.batch.threads = Some(0);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_merge_with_cli() {
        let mut settings = Settings::default();
        settings.merge_with_cli(&CliOverrides {
            max_solutions: Some(4),
            u_shape: true,
            format: Some(OutputFormat::Json),
            threads: Some(2),
            ..Default::default()
        });

        assert_eq!(settings.solver.max_solutions, 4);
        assert!(settings.encoding.u_shape);
        assert!(!settings.encoding.u_shape_long);
        assert_eq!(settings.output.format, OutputFormat::Json);
        assert_eq!(settings.batch.threads, Some(2));
        assert!(settings.encoding.options().u_shape);
    }
}
