//! GitLab REST API backend.
//!
//! Lists root files through the repository-tree API and languages through
//! the languages API (percentage weights). Matches when the URL host is
//! `gitlab.com` or the flavor hint names GitLab, and the credential is one
//! the REST API can use.
//!
//! OAuth token credentials are exchanged eagerly: construction trades the
//! static token for a bearer session token via `POST /oauth/token`, and a
//! failed exchange fails construction — it is never retried per call.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::{BackendMatcher, Language, RepositoryService};
use crate::error::{Result, ScoutError};
use crate::source::{Credential, RepoSource, RepoUrl};

const BACKEND: &str = "gitlab";
const DOMAIN: &str = "gitlab.com";

/// Matcher for the GitLab backend.
pub struct GitlabMatcher {
    api_base: Option<String>,
}

impl GitlabMatcher {
    /// Matcher using the API base derived from the source URL.
    pub fn new() -> Self {
        Self { api_base: None }
    }

    /// Matcher with a fixed API base, overriding derivation. Used to point
    /// the backend at a mock server.
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: Some(api_base.into()),
        }
    }
}

impl Default for GitlabMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendMatcher for GitlabMatcher {
    fn try_create(&self, source: &RepoSource) -> Result<Option<Box<dyn RepositoryService>>> {
        if !source.credential.is_api_compatible() {
            return Ok(None);
        }
        let url = RepoUrl::parse(&source.url)?;
        if !(url.host_is(DOMAIN) || source.flavor_is(BACKEND)) {
            return Ok(None);
        }

        let api_base = match &self.api_base {
            Some(base) => base.clone(),
            None => format!("https://{}", url.host.as_deref().unwrap_or(DOMAIN)),
        };
        let service = GitlabService::new(
            api_base,
            url.project,
            &source.ref_name,
            source.credential.clone(),
        )?;
        Ok(Some(Box::new(service)))
    }
}

/// Authentication state after construction.
enum GitlabAuth {
    /// Bearer session token obtained from the eager token exchange.
    Bearer(String),
    /// Basic auth applied per request.
    Basic { username: String, password: String },
}

/// GitLab repository service bound to one project and ref.
pub struct GitlabService {
    client: reqwest::blocking::Client,
    api_base: String,
    /// URL-encoded project path, ready for interpolation into API paths.
    encoded_project: String,
    ref_name: String,
    auth: GitlabAuth,
}

/// One entry from the repository-tree API.
#[derive(Debug, Deserialize)]
struct TreeNode {
    name: String,
}

/// Response of the token exchange.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl GitlabService {
    /// Create a service for `project` at `ref_name`. OAuth tokens trigger
    /// the construction-time exchange against `{api_base}/oauth/token`.
    pub fn new(
        api_base: impl Into<String>,
        project: impl Into<String>,
        ref_name: impl Into<String>,
        credential: Credential,
    ) -> Result<Self> {
        let api_base = api_base.into();
        let project = project.into();
        let client = reqwest::blocking::Client::builder()
            .user_agent("reposcout")
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        let auth = match credential {
            Credential::OauthToken(token) => {
                let session = exchange_token(&client, &api_base, &token)?;
                GitlabAuth::Bearer(session)
            }
            Credential::UsernamePassword { username, password } => {
                GitlabAuth::Basic { username, password }
            }
            Credential::SshKey { .. } => {
                return Err(ScoutError::BackendConstruction {
                    backend: BACKEND,
                    message: "SSH keys are not usable with the REST API".into(),
                });
            }
        };

        Ok(Self {
            client,
            api_base,
            encoded_project: urlencoding::encode(&project).into_owned(),
            ref_name: ref_name.into(),
            auth,
        })
    }

    fn authorize(&self, request: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.auth {
            GitlabAuth::Bearer(token) => {
                request.header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"))
            }
            GitlabAuth::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{}", self.api_base, path);
        let response = self
            .authorize(self.client.get(&url).query(query))
            .send()
            .map_err(|e| ScoutError::Listing {
                backend: BACKEND,
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ScoutError::Listing {
                backend: BACKEND,
                reason: format!("{status} {body}"),
            });
        }
        response.json().map_err(|e| ScoutError::Listing {
            backend: BACKEND,
            reason: e.to_string(),
        })
    }
}

/// Trade a static token for a bearer session token.
fn exchange_token(
    client: &reqwest::blocking::Client,
    api_base: &str,
    token: &str,
) -> Result<String> {
    debug!(api_base, "exchanging static token for session token");
    let response = client
        .post(format!("{api_base}/oauth/token"))
        .form(&[("grant_type", "refresh_token"), ("refresh_token", token)])
        .send()
        .map_err(|e| ScoutError::BackendConstruction {
            backend: BACKEND,
            message: format!("token exchange failed: {e}"),
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(ScoutError::BackendConstruction {
            backend: BACKEND,
            message: format!("token exchange failed: {status} {body}"),
        });
    }

    let token: TokenResponse = response.json().map_err(|e| ScoutError::BackendConstruction {
        backend: BACKEND,
        message: format!("token exchange returned an invalid body: {e}"),
    })?;
    Ok(token.access_token)
}

impl RepositoryService for GitlabService {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn list_root_files(&self) -> Result<Vec<String>> {
        let nodes: Vec<TreeNode> = self.get_json(
            &format!("/api/v4/projects/{}/repository/tree", self.encoded_project),
            &[("ref", self.ref_name.as_str())],
        )?;
        Ok(nodes.into_iter().map(|n| n.name).collect())
    }

    fn list_languages(&self) -> Result<Vec<Language>> {
        let stats: BTreeMap<String, f64> = self.get_json(
            &format!("/api/v4/projects/{}/languages", self.encoded_project),
            &[],
        )?;
        Ok(stats
            .into_iter()
            .map(|(name, percent)| Language::weighted(name, percent))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_source(url: &str) -> RepoSource {
        RepoSource::new(url, Credential::username_password("anonymous", ""))
    }

    #[test]
    fn matches_gitlab_host_with_username_password() {
        let matcher = GitlabMatcher::new();
        let service = matcher
            .try_create(&basic_source("https://gitlab.com/some-org/some-repo"))
            .unwrap();
        assert!(service.is_some());
    }

    #[test]
    fn matches_scp_url_on_gitlab_host_with_api_credential() {
        let matcher = GitlabMatcher::new();
        let service = matcher
            .try_create(&basic_source("git@gitlab.com:some-org/some-repo"))
            .unwrap();
        assert!(service.is_some());
    }

    #[test]
    fn declines_ssh_credential_regardless_of_host() {
        let matcher = GitlabMatcher::new();
        let source = RepoSource::new(
            "git@gitlab.com:some-org/some-repo",
            Credential::ssh_key(b"key".to_vec(), None),
        );
        assert!(matcher.try_create(&source).unwrap().is_none());
    }

    #[test]
    fn declines_schemeless_host_path() {
        let matcher = GitlabMatcher::new();
        let service = matcher
            .try_create(&basic_source("gitlab.com/some-org/some-repo"))
            .unwrap();
        assert!(service.is_none());
    }

    #[test]
    fn flavor_hint_forces_match_on_foreign_host() {
        let matcher = GitlabMatcher::new();
        let source =
            basic_source("https://gitprivatelab.com/some-org/some-repo").with_flavor("gitlab");
        assert!(matcher.try_create(&source).unwrap().is_some());
    }

    #[test]
    fn project_path_is_url_encoded() {
        let service = GitlabService::new(
            "https://gitlab.com",
            "some-org/some-repo",
            "master",
            Credential::username_password("anonymous", ""),
        )
        .unwrap();
        assert_eq!(service.encoded_project, "some-org%2Fsome-repo");
    }
}
