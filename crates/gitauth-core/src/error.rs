//! Core error types for gitauth-core.
//!
//! This module defines the error hierarchy using thiserror. Every
//! scheduling error is terminal for the run that produced it: no partial
//! schedule is ever returned alongside one.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for gitauth-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Scheduling errors
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rewrite engine errors
    #[error("Rewrite error: {0}")]
    Rewrite(#[from] RewriteError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while resolving the window, allocating items or
/// resolving timestamps.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// Clock time that is not a valid `HH:MM`
    #[error("Invalid time format '{0}': use HH:MM")]
    InvalidClockTime(String),

    /// Calendar range whose start lies after its end
    #[error("Invalid date range: start date ({start}) is after end date ({end})")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Daily window whose end is not after its start
    #[error("Invalid time range: end time ({end}) must be after start time ({start})")]
    InvalidTimeRange { start: String, end: String },

    /// No eligible day in the calendar range
    #[error("No valid days found between {start} and {end} (check weekends/dates)")]
    EmptyWindow { start: NaiveDate, end: NaiveDate },

    /// Nothing to schedule
    #[error("No items to schedule")]
    EmptyItems,

    /// Weight below zero or not a number
    #[error("Invalid weight {weight} for item '{id}': weights must be non-negative")]
    NegativeWeight { id: String, weight: f64 },

    /// Weight provider has no weight for an item
    #[error("No weight available for item '{0}'")]
    MissingWeight(String),

    /// Every weight is zero
    #[error("Total weight is zero: at least one item needs a positive weight")]
    DegenerateWeights,

    /// Same identifier supplied twice
    #[error("Duplicate item identifier '{0}'")]
    DuplicateItem(String),

    /// Zone name no resolver recognises
    #[error("Unknown timezone: {0}")]
    UnknownTimeZone(String),

    /// Local time skipped by a zone transition that could not be shifted
    #[error("Local time {datetime} does not exist in timezone {zone}")]
    NonexistentLocalTime { datetime: String, zone: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Errors raised by a [`RewriteEngine`](crate::rewrite::RewriteEngine).
#[derive(Error, Debug)]
pub enum RewriteError {
    /// Failed to write the schedule to its destination
    #[error("Failed to write schedule to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to encode the schedule
    #[error("Failed to encode schedule: {0}")]
    Encode(#[from] serde_json::Error),

    /// Engine refused the schedule
    #[error("Rewrite rejected: {0}")]
    Rejected(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}
