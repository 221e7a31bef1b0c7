//! Layered configuration for passview.
//!
//! `defaults/passview.default.toml` is embedded into the binary so the
//! documented defaults and runtime behavior stay in sync. Callers layer user
//! files and CLI overrides on top via [`Loader`] before deserializing into
//! [`PassviewConfig`].

use crate::highlight::Palette;
use crate::runner::ProcessRunner;
use crate::view::Tab;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

const DEFAULT_TOML: &str = include_str!("../defaults/passview.default.toml");

/// Configuration problems; all of them are fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),
    #[error("invalid tab configuration: {0}")]
    InvalidTabConfig(String),
    #[error("unknown highlight style '{0}'")]
    UnknownHighlightStyle(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PassviewConfig {
    pub view: ViewConfig,
    pub runner: RunnerConfig,
}

/// What the viewer shows at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub tab: Option<String>,
    #[serde(default)]
    pub pass: Option<String>,
    #[serde(default)]
    pub pass2: Option<String>,
    pub line_numbers: bool,
    pub highlight_style: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            tab: None,
            pass: None,
            pass2: None,
            line_numbers: true,
            highlight_style: Palette::default_palette().name.to_string(),
        }
    }
}

/// External optimizer used for re-runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunnerConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl RunnerConfig {
    pub fn runner(&self) -> ProcessRunner {
        ProcessRunner::new(self.program.clone(), self.args.clone())
    }
}

impl PassviewConfig {
    /// Check the values that can be checked without a stage store.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(tab) = &self.view.tab {
            tab.parse::<Tab>()
                .map_err(|name| ConfigError::InvalidTabConfig(format!("unknown tab '{name}'")))?;
        }
        if Palette::by_name(&self.view.highlight_style).is_none() {
            return Err(ConfigError::UnknownHighlightStyle(
                self.view.highlight_style.clone(),
            ));
        }
        Ok(())
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (CLI flags).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize, deserialize and validate.
    pub fn build(self) -> Result<PassviewConfig, ConfigError> {
        let config: PassviewConfig = self.builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<PassviewConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.view.tab.as_deref(), Some("sequential"));
        assert_eq!(config.view.pass, None);
        assert!(config.view.line_numbers);
        assert_eq!(config.view.highlight_style, "default");
        assert_eq!(config.runner.program, "mlir-opt");
        assert!(config.runner.args.is_empty());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("view.tab", "double")
            .expect("override to apply")
            .set_override("view.pass2", "--cse")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.view.tab.as_deref(), Some("double"));
        assert_eq!(config.view.pass2.as_deref(), Some("--cse"));
    }

    #[test]
    fn rejects_unknown_tab() {
        let err = Loader::new()
            .set_override("view.tab", "triple")
            .expect("override to apply")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTabConfig(_)));
    }

    #[test]
    fn rejects_unknown_style() {
        let err = Loader::new()
            .set_override("view.highlight_style", "neon")
            .expect("override to apply")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownHighlightStyle(name) if name == "neon"));
    }

    #[test]
    fn runner_config_builds_process_runner() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.runner.runner().program(), "mlir-opt");
    }
}
