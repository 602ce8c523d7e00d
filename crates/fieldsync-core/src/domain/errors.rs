//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! including validation failures and invalid identifier formats.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid data point record identifier
    #[error("Invalid record ID: {0}")]
    InvalidRecordId(String),

    /// Invalid survey group identifier
    #[error("Invalid survey group ID: {0}")]
    InvalidSurveyGroupId(String),

    /// Invalid sync watermark token
    #[error("Invalid sync time: {0}")]
    InvalidSyncTime(String),

    /// Latitude/longitude pair is incomplete or out of range
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}
