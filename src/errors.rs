/*!
 * Error types for the lenslate application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

use crate::capabilities::CapabilityKind;

/// Errors that can occur when talking to a capability provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The service refused the call on permission or policy grounds
    #[error("Restricted by the host system: {0}")]
    Restricted(String),
}

/// Errors raised while a pipeline stage runs, classified at the provider
/// call boundary
#[derive(Error, Debug)]
pub enum StageError {
    /// No implementation is registered for the capability the stage needs
    #[error("no {0} capability is registered")]
    CapabilityMissing(CapabilityKind),

    /// The capability is registered but reports it cannot serve requests
    #[error("{capability} capability is unavailable: {reason}")]
    CapabilityUnavailable {
        /// Capability that reported itself unusable
        capability: CapabilityKind,
        /// Human-readable reason from the probe
        reason: String,
    },

    /// The stage produced no usable output
    #[error("{0} returned an empty result")]
    EmptyResult(CapabilityKind),

    /// A security or system policy blocked the call
    #[error("Blocked by a system restriction: {0}")]
    Restricted(String),

    /// Any other failure from the provider call
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl StageError {
    /// True for errors that deserve the distinct restriction message in
    /// user-facing output
    pub fn is_restriction(&self) -> bool {
        matches!(
            self,
            StageError::Restricted(_) | StageError::Provider(ProviderError::Restricted(_))
        )
    }
}

/// Errors raised by the pipeline runner before any stage executes
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A run is already executing on this runner
    #[error("A run is already in flight, concurrent runs are rejected")]
    RunInFlight,

    /// The input failed pre-flight validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The stage plan is malformed
    #[error("Invalid stage plan: {0}")]
    InvalidPlan(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a capability provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from a pipeline stage
    #[error("Stage error: {0}")]
    Stage(#[from] StageError),

    /// Error from the pipeline runner
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
