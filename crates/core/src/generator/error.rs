//! Error types for the generator module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while invoking the report generator.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Generator script not found.
    #[error("Report generator not found at path: {path}")]
    ScriptNotFound { path: PathBuf },

    /// Generator exited with a non-zero status.
    #[error("Report generator exited with code {status:?}: {command}")]
    Failed {
        command: String,
        status: Option<i32>,
        /// Trimmed stderr, or a fallback naming the script when empty.
        message: String,
    },

    /// Reports directory could not be created.
    #[error("Failed to create report directory: {path}")]
    ReportDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while spawning or waiting on the generator.
    #[error("I/O error running {command}: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl GeneratorError {
    /// Creates a failed error, falling back to a generic message when the
    /// generator wrote nothing to stderr.
    pub fn failed(command: impl Into<String>, status: Option<i32>, stderr: &str, script_name: &str) -> Self {
        let stderr = stderr.trim();
        let message = if stderr.is_empty() {
            format!("Error encountered in {}", script_name)
        } else {
            stderr.to_string()
        };
        Self::Failed {
            command: command.into(),
            status,
            message,
        }
    }

    /// Human-readable description for error notifications.
    pub fn description(&self) -> String {
        match self {
            Self::Failed { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// The command line that was attempted, if one was built.
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::Failed { command, .. } | Self::Io { command, .. } => Some(command),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_uses_stderr() {
        let err = GeneratorError::failed("gen.csh 1 VIIRS REFINED today", Some(2), "  bad input\n", "gen.csh");
        assert_eq!(err.description(), "bad input");
        assert_eq!(err.command(), Some("gen.csh 1 VIIRS REFINED today"));
    }

    #[test]
    fn test_failed_fallback_message() {
        let err = GeneratorError::failed("gen.csh", Some(1), "", "print_generic_daily_report.csh");
        assert_eq!(
            err.description(),
            "Error encountered in print_generic_daily_report.csh"
        );
    }
}
