//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.docintel.toml` files.

use crate::backend::OllamaConfig;
use crate::cli::{Args, OutputFormat};
use crate::report::ReportOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".docintel.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Completion backend settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Report output path; stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Ollama backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Use the model instead of the heuristics.
    #[serde(default)]
    pub enabled: bool,

    /// Ollama API URL.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ollama_url: default_ollama_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl BackendConfig {
    /// Connection settings for the Ollama client.
    pub fn ollama_config(&self) -> OllamaConfig {
        OllamaConfig {
            ollama_url: self.ollama_url.clone(),
            temperature: self.temperature,
            timeout_seconds: self.timeout_seconds,
        }
    }
}

fn default_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout() -> u64 {
    300
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the statistics section.
    #[serde(default = "default_true")]
    pub include_statistics: bool,

    /// Include the per-analyzer status table.
    #[serde(default = "default_true")]
    pub include_analyzer_status: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_statistics: true,
            include_analyzer_status: true,
        }
    }
}

impl ReportConfig {
    pub fn options(&self) -> ReportOptions {
        ReportOptions {
            include_statistics: self.include_statistics,
            include_analyzer_status: self.include_analyzer_status,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given on the command line (or via env) override the file.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if args.verbose {
            self.general.verbose = true;
        }

        if args.llm {
            self.backend.enabled = true;
        }
        if let Some(ref model) = args.model {
            self.backend.model = model.clone();
        }
        if let Some(ref url) = args.ollama_url {
            self.backend.ollama_url = url.clone();
        }
        if let Some(temperature) = args.temperature {
            self.backend.temperature = temperature;
        }
        if let Some(timeout) = args.timeout {
            self.backend.timeout_seconds = timeout;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend.model, "llama3.2:latest");
        assert!(!config.backend.enabled);
        assert_eq!(config.general.format, OutputFormat::Markdown);
        assert!(config.general.output.is_none());
        assert!(config.report.include_statistics);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "minutes_report.md"
format = "json"
verbose = true

[backend]
enabled = true
model = "mistral:7b"
temperature = 0.2

[report]
include_analyzer_status = false
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output.as_deref(), Some("minutes_report.md"));
        assert_eq!(config.general.format, OutputFormat::Json);
        assert!(config.general.verbose);
        assert!(config.backend.enabled);
        assert_eq!(config.backend.model, "mistral:7b");
        assert_eq!(config.backend.temperature, 0.2);
        assert_eq!(config.backend.ollama_url, "http://localhost:11434");
        assert!(config.report.include_statistics);
        assert!(!config.report.include_analyzer_status);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[backend]\ntimeout_seconds = 42").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.backend.timeout_seconds, 42);
        assert_eq!(config.backend.ollama_config().timeout_seconds, 42);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[backend\nenabled = yes").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config: Config = toml::from_str(
            "[backend]\nmodel = \"mistral:7b\"\nollama_url = \"http://gpu:11434\"\n",
        )
        .unwrap();
        let args = Args::try_parse_from([
            "docintel",
            "doc.txt",
            "--llm",
            "--model",
            "llama3.2:latest",
            "--format",
            "text",
        ])
        .unwrap();

        config.merge_with_args(&args);

        assert!(config.backend.enabled);
        assert_eq!(config.backend.model, "llama3.2:latest");
        assert_eq!(config.general.format, OutputFormat::Text);
        assert!(config.general.output.is_none());
        // Not given on the command line, so the file value stays.
        if std::env::var_os("OLLAMA_URL").is_none() {
            assert_eq!(config.backend.ollama_url, "http://gpu:11434");
        }
    }

    #[test]
    fn test_verbose_setting_drives_log_level() {
        let mut config: Config = toml::from_str("[general]\nverbose = true\n").unwrap();
        let args = Args::try_parse_from(["docintel", "doc.txt"]).unwrap();
        config.merge_with_args(&args);

        assert!(config.general.verbose);
        assert_eq!(args.log_level(config.general.verbose), tracing::Level::DEBUG);

        let quiet = Args::try_parse_from(["docintel", "doc.txt", "--quiet"]).unwrap();
        assert_eq!(quiet.log_level(config.general.verbose), tracing::Level::ERROR);

        let mut plain = Config::default();
        plain.merge_with_args(&args);
        assert_eq!(args.log_level(plain.general.verbose), tracing::Level::INFO);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[backend]"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.backend.timeout_seconds, 300);
    }
}
