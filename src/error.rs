// src/error.rs
//
// Error taxonomy for the decision-log pipeline.
// - InvalidConfiguration: bad counts / seed, raised before any draw happens.
// - InvalidParameter:     a distribution was asked for an out-of-domain draw.
// - Io / Parse:           tabular exchange failures.
//
// Empty subgroups are NOT errors; the confusion reducer smooths them to zero.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    InvalidConfiguration { field: String, message: String },
    InvalidParameter { distribution: String, message: String },
    Io { path: String, source: String },
    Parse { line: usize, message: String },
}

impl SimError {
    pub fn config(field: &str, message: impl Into<String>) -> Self {
        SimError::InvalidConfiguration {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn parameter(distribution: &str, message: impl Into<String>) -> Self {
        SimError::InvalidParameter {
            distribution: distribution.to_string(),
            message: message.into(),
        }
    }

    pub fn io(path: impl fmt::Display, source: impl fmt::Display) -> Self {
        SimError::Io {
            path: path.to_string(),
            source: source.to_string(),
        }
    }

    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        SimError::Parse {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidConfiguration { field, message } => {
                write!(f, "Invalid configuration '{}': {}", field, message)
            }
            SimError::InvalidParameter {
                distribution,
                message,
            } => {
                write!(f, "Invalid {} parameter: {}", distribution, message)
            }
            SimError::Io { path, source } => {
                write!(f, "I/O error on '{}': {}", path, source)
            }
            SimError::Parse { line, message } => {
                write!(f, "Parse error at line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for SimError {}

pub type SimResult<T> = Result<T, SimError>;
