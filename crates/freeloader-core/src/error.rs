// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Freeloader router.

use thiserror::Error;

use crate::types::{AttemptFailure, BudgetPeriod};

/// The primary error type used across all Freeloader traits and core operations.
#[derive(Debug, Error)]
pub enum FreeloaderError {
    /// Configuration errors (invalid TOML, missing required fields, bad limits).
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed request or out-of-range value, rejected before routing starts.
    #[error("invalid request: {0}")]
    Validation(String),

    /// A hard budget limit would be crossed by the request.
    #[error(
        "{period} budget exceeded for project {project}: spent ${spent:.2} of ${limit:.2}"
    )]
    BudgetExceeded {
        project: String,
        period: BudgetPeriod,
        spent: f64,
        limit: f64,
    },

    /// No candidate could serve the request: either none survived filtering,
    /// or every candidate failed execution.
    #[error("no providers available: {reason}")]
    NoProvidersAvailable {
        reason: String,
        failures: Vec<AttemptFailure>,
    },

    /// A single completion attempt failed (HTTP error, bad response body).
    #[error("backend error: {message}")]
    Backend {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FreeloaderError {
    /// Shorthand for a [`FreeloaderError::Backend`] without an underlying source.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a [`FreeloaderError::NoProvidersAvailable`] with no attempts.
    pub fn no_providers(reason: impl Into<String>) -> Self {
        Self::NoProvidersAvailable {
            reason: reason.into(),
            failures: Vec::new(),
        }
    }

    /// HTTP status code a transport layer should answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::BudgetExceeded { .. } => 400,
            Self::NoProvidersAvailable { .. } => 503,
            Self::Backend { .. } => 502,
            Self::Config(_) | Self::Storage { .. } | Self::Internal(_) => 500,
        }
    }

    /// Per-candidate failures carried by an aggregate routing failure.
    pub fn attempt_failures(&self) -> &[AttemptFailure] {
        match self {
            Self::NoProvidersAvailable { failures, .. } => failures,
            _ => &[],
        }
    }
}
