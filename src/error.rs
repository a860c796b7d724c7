//! Error types for Reposcout operations.
//!
//! This module defines [`ScoutError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `ScoutError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `ScoutError::Other`) for unexpected errors
//! - Listing errors must carry the backend's own reason text so callers can
//!   classify them by substring (e.g. "Not Found")
//! - Every error aborts the whole detection pipeline; there are no retries
//!   and no partial reports

use thiserror::Error;

/// Core error type for Reposcout operations.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Repository URL could not be parsed.
    #[error("Invalid repository URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Every registered matcher declined the source.
    #[error("No compatible backend for '{url}'")]
    NoCompatibleBackend { url: String },

    /// Supplied credential could not be decoded (e.g. an encrypted SSH key
    /// without its passphrase). Raised at adapter construction, never during
    /// listing.
    #[error("Cannot decode credential: {message}")]
    CredentialDecode { message: String },

    /// A matcher accepted the source but its adapter could not be built
    /// (e.g. a failed token exchange). Fatal; later matchers are not tried.
    #[error("Failed to construct {backend} backend: {message}")]
    BackendConstruction {
        backend: &'static str,
        message: String,
    },

    /// An authenticated backend rejected a listing call. The reason retains
    /// the backend's own failure text.
    #[error("{backend} listing failed: {reason}")]
    Listing {
        backend: &'static str,
        reason: String,
    },

    /// Git transport error from the generic fallback.
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Reposcout operations.
pub type Result<T> = std::result::Result<T, ScoutError>;
