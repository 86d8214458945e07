//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::RiskLevel;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// docintel - multi-analyzer document intelligence
///
/// Summarizes documents, flags legal, financial and operational risks, and
/// extracts decisions, action items and deadlines. Runs on local heuristics
/// by default, or delegates to an Ollama model with --llm.
///
/// Examples:
///   docintel minutes.txt
///   docintel contract.txt --format json --output contract.json
///   cat memo.txt | docintel - --format text
///   docintel a.txt b.txt --history --fail-on-risk high
///   docintel report.txt --llm --model llama3.2:latest
///   docintel --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Plain-text documents to analyze (`-` reads stdin)
    #[arg(value_name = "INPUT", required_unless_present = "init_config")]
    pub inputs: Vec<PathBuf>,

    /// Output file for the report
    ///
    /// Defaults to stdout. With several inputs, reports are concatenated.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .docintel.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Delegate extraction to an Ollama model instead of heuristics
    #[arg(long)]
    pub llm: bool,

    /// Ollama model to use with --llm
    #[arg(short, long, env = "DOCINTEL_MODEL")]
    pub model: Option<String>,

    /// Ollama API endpoint URL
    #[arg(long, env = "OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Temperature for LLM responses (0.0 - 1.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Fail if any document's risk level is at or above this level
    ///
    /// Useful for CI pipelines. Exit code 2 when threshold is reached.
    #[arg(long, value_name = "LEVEL")]
    pub fail_on_risk: Option<RiskThreshold>,

    /// Print each analyzer's status after the run
    #[arg(long)]
    pub show_status: bool,

    /// Print a table of every analysis run in this invocation
    #[arg(long)]
    pub history: bool,

    /// Generate a default .docintel.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
    /// Numbered plain-text export
    Text,
}

/// Risk level accepted by --fail-on-risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RiskThreshold {
    Low,
    Medium,
    High,
}

impl RiskThreshold {
    pub fn level(self) -> RiskLevel {
        match self {
            RiskThreshold::Low => RiskLevel::Low,
            RiskThreshold::Medium => RiskLevel::Medium,
            RiskThreshold::High => RiskLevel::High,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.ollama_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Ollama URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=1.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 1.0".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        let stdin_inputs = self.inputs.iter().filter(|p| is_stdin(p)).count();
        if stdin_inputs > 1 {
            return Err("stdin ('-') can only be given once".to_string());
        }

        for input in self.inputs.iter().filter(|p| !is_stdin(p)) {
            if !input.exists() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
            if !input.is_file() {
                return Err(format!("Input is not a file: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is `[general] verbose` from the config file;
    /// `--quiet` still wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

/// True for the `-` placeholder.
pub fn is_stdin(path: &std::path::Path) -> bool {
    path.as_os_str() == "-"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn make_args() -> Args {
        Args {
            inputs: vec![PathBuf::from("-")],
            output: None,
            format: None,
            config: None,
            verbose: false,
            quiet: false,
            llm: false,
            model: None,
            ollama_url: None,
            temperature: None,
            timeout: None,
            fail_on_risk: None,
            show_status: false,
            history: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "docintel",
            "a.txt",
            "b.txt",
            "--format",
            "json",
            "--fail-on-risk",
            "medium",
            "--llm",
            "--temperature",
            "0.3",
        ])
        .unwrap();

        assert_eq!(args.inputs.len(), 2);
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert_eq!(args.fail_on_risk, Some(RiskThreshold::Medium));
        assert!(args.llm);
        assert_eq!(args.temperature, Some(0.3));
    }

    #[test]
    fn test_input_required_unless_init_config() {
        assert!(Args::try_parse_from(["docintel"]).is_err());
        assert!(Args::try_parse_from(["docintel", "--init-config"]).is_ok());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.ollama_url = Some("localhost:11434".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_temperature_and_timeout() {
        let mut args = make_args();
        args.temperature = Some(1.5);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_inputs() {
        let mut args = make_args();
        args.inputs = vec![PathBuf::from("-"), PathBuf::from("-")];
        assert!(args.validate().is_err());

        args.inputs = vec![PathBuf::from("/definitely/not/here.txt")];
        assert!(args.validate().unwrap_err().contains("does not exist"));

        let dir = tempfile::tempdir().unwrap();
        args.inputs = vec![dir.path().to_path_buf()];
        assert!(args.validate().unwrap_err().contains("not a file"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "The board met.").unwrap();
        args.inputs = vec![file.path().to_path_buf()];
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_config_verbose_raises_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }

    #[test]
    fn test_threshold_maps_to_risk_level() {
        assert_eq!(RiskThreshold::Medium.level(), RiskLevel::Medium);
        assert!(RiskLevel::High >= RiskThreshold::Medium.level());
    }
}
