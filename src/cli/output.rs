use chrono::{DateTime, Utc};
use clap::ValueEnum;
use console::style;
use serde::Serialize;

use crate::error::{ErrorCode, Result, StError, StructuredError};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable formatted output with colors (default)
    #[default]
    Human,
    /// Pretty-printed JSON in the response envelope
    Json,
    /// YAML of the response data
    Yaml,
    /// Plain text without colors
    Plain,
}

impl OutputFormat {
    /// Parse the `output.format` config value; unknown values fall back to human.
    #[must_use]
    pub fn from_config(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "json" => Self::Json,
            "yaml" => Self::Yaml,
            "plain" => Self::Plain,
            _ => Self::Human,
        }
    }

    /// Check if this format should use colors
    #[must_use]
    pub const fn use_colors(&self) -> bool {
        matches!(self, Self::Human)
    }

    /// Check if this format is machine-readable
    #[must_use]
    pub const fn is_machine_readable(&self) -> bool {
        matches!(self, Self::Json | Self::Yaml)
    }
}

#[derive(Serialize)]
pub struct RobotResponse<T> {
    pub status: RobotStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    Ok,
    /// Rich error with structured information
    #[serde(rename = "error")]
    StructuredError {
        /// Error code enum value (e.g., "NODE_NOT_FOUND")
        code: ErrorCode,
        /// Numeric error code (e.g., 101)
        numeric_code: u16,
        message: String,
        /// Actionable suggestion for recovery
        suggestion: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        context: Option<serde_json::Value>,
        recoverable: bool,
        /// Error category (e.g., "graph", "transaction")
        category: String,
    },
}

pub fn robot_ok<T: Serialize>(data: T) -> RobotResponse<T> {
    RobotResponse {
        status: RobotStatus::Ok,
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data,
        warnings: Vec::new(),
    }
}

/// Create a robot error response from an StError with structured information.
pub fn robot_error_structured(err: &StError) -> RobotResponse<serde_json::Value> {
    RobotResponse {
        status: err.to_structured().into(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data: serde_json::Value::Null,
        warnings: Vec::new(),
    }
}

impl From<StructuredError> for RobotStatus {
    fn from(err: StructuredError) -> Self {
        Self::StructuredError {
            code: err.code,
            numeric_code: err.numeric_code,
            message: err.message,
            suggestion: err.suggestion,
            context: err.context,
            recoverable: err.recoverable,
            category: err.category,
        }
    }
}

pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)
        .map_err(|err| StError::Serialization(format!("serialize output: {err}")))?;
    println!("{payload}");
    Ok(())
}

pub fn emit_yaml<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_yaml::to_string(value)
        .map_err(|err| StError::Serialization(format!("serialize output: {err}")))?;
    print!("{payload}");
    Ok(())
}

/// Emit `data` in the requested format. Human and plain output come from
/// `human`; plain simply runs with colors disabled.
pub fn emit_data<T: Serialize>(
    format: OutputFormat,
    data: &T,
    human: impl FnOnce(&T) -> HumanLayout,
) -> Result<()> {
    match format {
        OutputFormat::Json => emit_json(&robot_ok(data)),
        OutputFormat::Yaml => emit_yaml(data),
        OutputFormat::Human | OutputFormat::Plain => {
            emit_human(human(data));
            Ok(())
        }
    }
}

/// Report a failed command: the structured envelope on stdout for machine
/// formats, a message plus suggestion on stderr otherwise.
pub fn emit_error(format: OutputFormat, err: &StError) {
    if format.is_machine_readable() {
        let response = robot_error_structured(err);
        match serde_json::to_string_pretty(&response) {
            Ok(payload) => println!("{payload}"),
            Err(_) => println!("{{\"status\":\"error\",\"message\":{:?}}}", err.to_string()),
        }
        return;
    }

    let structured = err.to_structured();
    eprintln!("{} {}", style(structured.code.code_string()).red().bold(), err);
    eprintln!("  {}", style(structured.suggestion).dim());
}

pub struct HumanLayout {
    lines: Vec<String>,
    key_width: usize,
}

impl Default for HumanLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanLayout {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            key_width: 18,
        }
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self.lines.push(String::new());
        self
    }

    pub fn section(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self.lines.push("-".repeat(text.len().max(3)));
        self
    }

    pub fn kv(&mut self, key: &str, value: &str) -> &mut Self {
        let padded = format!("{key:width$}", width = self.key_width);
        self.lines
            .push(format!("{} {value}", style(padded).dim()));
        self
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        self.lines.push(format!("- {text}"));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    #[must_use]
    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}

pub fn emit_human(layout: HumanLayout) {
    println!("{}", layout.build());
}
