//! GitHub REST API backend.
//!
//! Lists root files through the contents API and languages through the
//! language-statistics API (byte counts per language). Matches when the URL
//! host is `github.com` or the flavor hint names GitHub, and the credential
//! is one the REST API can use.

use std::time::Duration;

use serde::Deserialize;
use std::collections::BTreeMap;

use super::{BackendMatcher, Language, RepositoryService};
use crate::error::{Result, ScoutError};
use crate::source::{Credential, RepoSource, RepoUrl};

const BACKEND: &str = "github";
const DOMAIN: &str = "github.com";
const PUBLIC_API_BASE: &str = "https://api.github.com";

/// Matcher for the GitHub backend.
pub struct GithubMatcher {
    api_base: Option<String>,
}

impl GithubMatcher {
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

impl Default for GithubMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendMatcher for GithubMatcher {
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
            None => default_api_base(&url),
        };
        let service = GithubService::new(
            api_base,
            url.project,
            &source.ref_name,
            source.credential.clone(),
        )?;
        Ok(Some(Box::new(service)))
    }
}

/// API base for a matched URL: the public API for github.com, the
/// Enterprise layout for hint-forced hosts.
fn default_api_base(url: &RepoUrl) -> String {
    match url.host.as_deref() {
        Some(host) if !host.eq_ignore_ascii_case(DOMAIN) => format!("https://{host}/api/v3"),
        _ => PUBLIC_API_BASE.to_string(),
    }
}

/// GitHub repository service bound to one project and ref.
pub struct GithubService {
    client: reqwest::blocking::Client,
    api_base: String,
    project: String,
    ref_name: String,
    credential: Credential,
}

/// One entry from the contents API.
#[derive(Debug, Deserialize)]
struct ContentsEntry {
    name: String,
}

impl GithubService {
    /// Create a service for `project` (an `owner/repo` pair) at `ref_name`.
    pub fn new(
        api_base: impl Into<String>,
        project: impl Into<String>,
        ref_name: impl Into<String>,
        credential: Credential,
    ) -> Result<Self> {
        if !credential.is_api_compatible() {
            return Err(ScoutError::BackendConstruction {
                backend: BACKEND,
                message: "SSH keys are not usable with the REST API".into(),
            });
        }
        Ok(Self {
            client: reqwest::blocking::Client::builder()
                .user_agent("reposcout")
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            api_base: api_base.into(),
            project: project.into(),
            ref_name: ref_name.into(),
            credential,
        })
    }

    fn authorize(&self, request: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.credential {
            Credential::OauthToken(token) => {
                request.header(reqwest::header::AUTHORIZATION, format!("token {token}"))
            }
            Credential::UsernamePassword { username, password } => {
                request.basic_auth(username, Some(password))
            }
            // Rejected in new(); kept to make the match exhaustive.
            Credential::SshKey { .. } => request,
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

impl RepositoryService for GithubService {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn list_root_files(&self) -> Result<Vec<String>> {
        let entries: Vec<ContentsEntry> = self.get_json(
            &format!("/repos/{}/contents/", self.project),
            &[("ref", self.ref_name.as_str())],
        )?;
        Ok(entries.into_iter().map(|e| e.name).collect())
    }

    fn list_languages(&self) -> Result<Vec<Language>> {
        let stats: BTreeMap<String, f64> =
            self.get_json(&format!("/repos/{}/languages", self.project), &[])?;
        Ok(stats
            .into_iter()
            .map(|(name, bytes)| Language::weighted(name, bytes))
            .collect())
    }
}
