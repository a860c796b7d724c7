//! Backend selection.
//!
//! The selector holds an ordered chain of matchers and resolves a source to
//! the first backend willing to handle it. Order is significant: platform
//! API matchers come before the generic git fallback, because the fallback
//! accepts almost any URL and must not pre-empt a more precise backend.

use tracing::debug;

use super::{BackendMatcher, GenericGitMatcher, GithubMatcher, GitlabMatcher, RepositoryService};
use crate::error::Result;
use crate::source::RepoSource;

/// Ordered chain of backend matchers.
pub struct Selector {
    matchers: Vec<Box<dyn BackendMatcher>>,
}

impl Selector {
    /// Build a selector from an explicit matcher chain, evaluated in the
    /// given order.
    pub fn new(matchers: Vec<Box<dyn BackendMatcher>>) -> Self {
        Self { matchers }
    }

    /// The standard chain: GitHub API, GitLab API, then generic git.
    pub fn default_chain() -> Self {
        Self::new(vec![
            Box::new(GithubMatcher::new()),
            Box::new(GitlabMatcher::new()),
            Box::new(GenericGitMatcher),
        ])
    }

    /// Number of registered matchers.
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Resolve a source to a repository service.
    ///
    /// Returns `Ok(None)` when every matcher declines — "this source is
    /// unsupported", which is distinct from "this source failed". A matcher
    /// that matches but fails to construct its adapter aborts the whole
    /// resolve call; later matchers are not consulted.
    pub fn resolve(&self, source: &RepoSource) -> Result<Option<Box<dyn RepositoryService>>> {
        for matcher in &self.matchers {
            if let Some(service) = matcher.try_create(source)? {
                debug!(
                    backend = service.backend_name(),
                    url = %source.url,
                    "resolved backend"
                );
                return Ok(Some(service));
            }
        }
        debug!(url = %source.url, "no matcher claimed the source");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoutError;
    use crate::source::Credential;

    struct DeclineAll;

    impl BackendMatcher for DeclineAll {
        fn try_create(
            &self,
            _source: &RepoSource,
        ) -> Result<Option<Box<dyn RepositoryService>>> {
            Ok(None)
        }
    }

    struct FailConstruction;

    impl BackendMatcher for FailConstruction {
        fn try_create(
            &self,
            _source: &RepoSource,
        ) -> Result<Option<Box<dyn RepositoryService>>> {
            Err(ScoutError::BackendConstruction {
                backend: "fake",
                message: "creation failed".into(),
            })
        }
    }

    fn source() -> RepoSource {
        RepoSource::new("https://example.com/org/repo", Credential::oauth_token("t"))
    }

    #[test]
    fn default_chain_has_three_matchers() {
        assert_eq!(Selector::default_chain().len(), 3);
    }

    #[test]
    fn empty_chain_resolves_to_none() {
        let selector = Selector::new(vec![]);
        assert!(selector.is_empty());
        assert!(selector.resolve(&source()).unwrap().is_none());
    }

    #[test]
    fn all_declining_resolves_to_none() {
        let selector = Selector::new(vec![Box::new(DeclineAll), Box::new(DeclineAll)]);
        assert!(selector.resolve(&source()).unwrap().is_none());
    }

    #[test]
    fn construction_failure_is_terminal() {
        // A later matcher would decline anyway, but the point is that it is
        // never consulted once an earlier matcher has claimed the source.
        let selector = Selector::new(vec![Box::new(FailConstruction), Box::new(DeclineAll)]);
        let err = selector.resolve(&source()).unwrap_err();
        assert!(err.to_string().contains("creation failed"));
    }
}
