//! Error types.
//!
//! This module provides error types for settings validation and path-based
//! configuration access.

use std::fmt;

/// Errors that can occur when validating a settings tree.
#[derive(Debug)]
pub enum SettingsError {
    /// A gradient has no stops to sample.
    EmptyGradient {
        /// Settings path of the offending gradient.
        name: &'static str,
    },
    /// A range field has `min` greater than `max`.
    InvertedRange {
        /// Settings path of the offending range.
        field: &'static str,
    },
    /// A field that must be positive is zero or negative.
    NonPositive {
        /// Settings path of the offending field.
        field: &'static str,
    },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::EmptyGradient { name } => {
                write!(f, "Gradient '{}' has no stops", name)
            }
            SettingsError::InvertedRange { field } => {
                write!(f, "Range '{}' has min greater than max", field)
            }
            SettingsError::NonPositive { field } => {
                write!(f, "Field '{}' must be positive", field)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

/// Errors that can occur during path-based settings access.
#[derive(Debug)]
pub enum ConfigError {
    /// The path does not name a known settings leaf.
    UnknownPath(String),
    /// The leaf exists but holds a different kind of value.
    WrongKind {
        /// Path of the mismatched leaf.
        path: String,
        /// Kind of value the leaf holds.
        expected: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownPath(path) => {
                write!(f, "Unknown settings path '{}'", path)
            }
            ConfigError::WrongKind { path, expected } => {
                write!(f, "Settings path '{}' expects a {} value", path, expected)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
