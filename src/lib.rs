//! Reposcout - remote repository build-environment detection.
//!
//! Reposcout inspects a remote source-code repository — identified by a URL,
//! an optional ref, an optional platform flavor hint, and a credential — and
//! reports which build tools it uses (root-level marker files) and which
//! programming languages it contains (ranked by estimated usage). File
//! contents are never inspected.
//!
//! # Modules
//!
//! - [`backend`] - Repository access strategies (GitHub API, GitLab API,
//!   generic git clone) and the matcher chain selecting between them
//! - [`detect`] - Signature table, language ranking, and the detection engine
//! - [`error`] - Error types and result aliases
//! - [`source`] - Source descriptors, credentials, and URL parsing
//!
//! # Example
//!
//! ```no_run
//! use reposcout::{detect_build_environment, Credential, RepoSource};
//!
//! let source = RepoSource::new(
//!     "https://github.com/wildfly/wildfly",
//!     Credential::username_password("anonymous", ""),
//! );
//! let report = detect_build_environment(&source).unwrap();
//! for tool in &report.detected_build_tools {
//!     println!("{} ({})", tool.name, tool.evidence);
//! }
//! println!("{:?}", report.sorted_languages);
//! ```

pub mod backend;
pub mod detect;
pub mod error;
pub mod source;

pub use backend::{Language, RepositoryService, Selector};
pub use detect::{BuildEnvReport, DetectedBuildTool, DetectionEngine};
pub use error::{Result, ScoutError};
pub use source::{Credential, RepoSource, RepoUrl, DEFAULT_REF};

/// Detect the build environment of a repository using the standard matcher
/// chain and signature table.
///
/// This is the caller-facing entry point: one synchronous pipeline per call,
/// no persisted state, no retries. Fails with
/// [`ScoutError::NoCompatibleBackend`] when no backend can handle the
/// source, or with the first error any stage produced.
pub fn detect_build_environment(source: &RepoSource) -> Result<BuildEnvReport> {
    DetectionEngine::standard().detect(source)
}
