//! Repository access backends.
//!
//! A backend is one concrete strategy for listing a repository's root files
//! and languages: the GitHub and GitLab REST APIs, or a generic git clone
//! when no platform API is usable. Each backend ships a [`BackendMatcher`]
//! deciding whether it can handle a given source; the [`Selector`] walks an
//! ordered chain of matchers and hands back the first willing backend.

pub mod generic;
pub mod github;
pub mod gitlab;
pub mod selector;

pub use generic::{GenericGitMatcher, GenericGitService};
pub use github::{GithubMatcher, GithubService};
pub use gitlab::{GitlabMatcher, GitlabService};
pub use selector::Selector;

use crate::error::Result;
use crate::source::RepoSource;

/// One language present in a repository.
#[derive(Debug, Clone, PartialEq)]
pub struct Language {
    /// Language name as the provider reports it (e.g. "Java").
    pub name: String,
    /// Relative usage weight, when the provider supplies statistics.
    /// Backends without statistics report `None` for every language.
    pub weight: Option<f64>,
}

impl Language {
    /// Language with a provider-supplied usage weight.
    pub fn weighted(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight: Some(weight),
        }
    }

    /// Language without usage information.
    pub fn unweighted(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight: None,
        }
    }
}

/// Capability contract of one resolved backend, bound to a single
/// repository and ref.
///
/// Both operations are idempotent reads and may be called any number of
/// times; neither mutates the service.
pub trait RepositoryService {
    /// Short backend identifier used in logs and error messages.
    fn backend_name(&self) -> &'static str;

    /// File and directory names present at the root of the repository for
    /// the configured ref.
    fn list_root_files(&self) -> Result<Vec<String>>;

    /// Languages present in the repository, with usage weights when the
    /// backend has them.
    fn list_languages(&self) -> Result<Vec<Language>>;
}

impl std::fmt::Debug for dyn RepositoryService + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryService")
            .field("backend", &self.backend_name())
            .finish()
    }
}

/// A predicate + constructor pair deciding whether one backend can and
/// should handle a source.
///
/// The return value is deliberately tri-state:
/// - `Ok(None)` — this matcher declines; the chain continues
/// - `Ok(Some(service))` — matched and constructed
/// - `Err(_)` — matched but construction failed; fatal for the whole
///   resolve call, never retried against a later matcher
pub trait BackendMatcher {
    fn try_create(&self, source: &RepoSource) -> Result<Option<Box<dyn RepositoryService>>>;
}
