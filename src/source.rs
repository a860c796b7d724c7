//! Source descriptors and credentials.
//!
//! A [`RepoSource`] is the immutable request handed to the backend selector:
//! which repository to inspect, at which ref, with which [`Credential`], and
//! an optional flavor hint naming a hosting platform explicitly.

use std::fmt;

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::error::{Result, ScoutError};

/// Ref used when the caller does not specify one.
pub const DEFAULT_REF: &str = "master";

/// Schemes the generic git transport can fetch from.
const GIT_SCHEMES: &[&str] = &["http", "https", "git", "ssh", "file"];

/// scp-style git URL, e.g. `git@gitlab.com:some-org/some-repo.git`.
static SCP_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[\w.-]+@)?([\w.-]+):([\w./~-]+)$").unwrap());

/// Authentication material usable to reach a repository.
///
/// Exactly one variant is active per instance; variants are immutable once
/// constructed. Platform REST APIs accept tokens and username/password but
/// never raw SSH keys, which is what [`Credential::is_api_compatible`]
/// encodes.
#[derive(Clone)]
pub enum Credential {
    /// Private-key material (OpenSSH PEM bytes) with an optional passphrase.
    SshKey {
        private_key: Vec<u8>,
        passphrase: Option<String>,
    },
    /// Plain username/password pair, sent as basic auth.
    UsernamePassword { username: String, password: String },
    /// Opaque bearer-style token.
    OauthToken(String),
}

impl Credential {
    /// SSH key credential. An empty passphrase means "no passphrase".
    pub fn ssh_key(private_key: impl Into<Vec<u8>>, passphrase: Option<&str>) -> Self {
        Self::SshKey {
            private_key: private_key.into(),
            passphrase: passphrase.filter(|p| !p.is_empty()).map(String::from),
        }
    }

    /// Username/password credential.
    pub fn username_password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::UsernamePassword {
            username: username.into(),
            password: password.into(),
        }
    }

    /// OAuth-style token credential.
    pub fn oauth_token(token: impl Into<String>) -> Self {
        Self::OauthToken(token.into())
    }

    /// Whether a hosted-platform REST API can authenticate with this
    /// credential. SSH keys are protocol-level only.
    pub fn is_api_compatible(&self) -> bool {
        !matches!(self, Self::SshKey { .. })
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SshKey { passphrase, .. } => f
                .debug_struct("SshKey")
                .field("private_key", &"<redacted>")
                .field("passphrase", &passphrase.as_ref().map(|_| "<redacted>"))
                .finish(),
            Self::UsernamePassword { username, .. } => f
                .debug_struct("UsernamePassword")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::OauthToken(_) => f.debug_tuple("OauthToken").field(&"<redacted>").finish(),
        }
    }
}

/// Immutable description of one repository to inspect.
#[derive(Debug, Clone)]
pub struct RepoSource {
    /// Repository URL. May be https, scp-style ssh, or a local path.
    pub url: String,
    /// Ref to inspect. Defaults to [`DEFAULT_REF`].
    pub ref_name: String,
    /// Optional platform hint. When set, forces matching of the named
    /// platform regardless of the URL host (credential permitting).
    pub flavor: Option<String>,
    /// Credential used to reach the repository.
    pub credential: Credential,
}

impl RepoSource {
    /// Create a source for `url` with the default ref and no flavor hint.
    pub fn new(url: impl Into<String>, credential: Credential) -> Self {
        Self {
            url: url.into(),
            ref_name: DEFAULT_REF.to_string(),
            flavor: None,
            credential,
        }
    }

    /// Set the ref to inspect. An empty ref falls back to the default.
    pub fn with_ref(mut self, ref_name: impl Into<String>) -> Self {
        let ref_name = ref_name.into();
        self.ref_name = if ref_name.is_empty() {
            DEFAULT_REF.to_string()
        } else {
            ref_name
        };
        self
    }

    /// Set the platform flavor hint.
    pub fn with_flavor(mut self, flavor: impl Into<String>) -> Self {
        self.flavor = Some(flavor.into());
        self
    }

    /// Whether the flavor hint names the given platform.
    pub fn flavor_is(&self, platform: &str) -> bool {
        self.flavor
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case(platform))
    }
}

/// A repository URL broken into the parts the matchers care about.
///
/// Three forms parse successfully:
/// - scheme URLs (`https://gitlab.com/org/repo.git`, `ssh://git@host/org/repo`)
/// - scp-style git URLs (`git@gitlab.com:org/repo.git`)
/// - bare local paths (`/tmp/fixture-repo`), which carry no host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoUrl {
    /// URL scheme, if the input carried one. scp-style and local forms
    /// have none.
    pub scheme: Option<String>,
    /// Host component, if any.
    pub host: Option<String>,
    /// Project identifier: the path with leading `/` and trailing `.git`
    /// stripped, e.g. `some-org/some-repo`.
    pub project: String,
}

impl RepoUrl {
    /// Parse a repository URL.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(ScoutError::InvalidUrl {
                url: raw.to_string(),
                message: "empty URL".to_string(),
            });
        }

        if let Ok(parsed) = Url::parse(raw) {
            // file:// URLs carry no host; scp-style forms fail Url parsing
            // outright (the `@` is not a valid scheme character).
            if parsed.host_str().is_some() || parsed.scheme() == "file" {
                return Ok(Self {
                    scheme: Some(parsed.scheme().to_string()),
                    host: parsed.host_str().map(String::from),
                    project: trim_project(parsed.path()),
                });
            }
        }

        if let Some(caps) = SCP_URL.captures(raw) {
            return Ok(Self {
                scheme: None,
                host: Some(caps[1].to_string()),
                project: trim_project(&caps[2]),
            });
        }

        // Anything else is treated as a local path for the generic transport.
        Ok(Self {
            scheme: None,
            host: None,
            project: trim_project(raw),
        })
    }

    /// Whether the host equals `domain` (case-insensitive).
    pub fn host_is(&self, domain: &str) -> bool {
        self.host
            .as_deref()
            .is_some_and(|h| h.eq_ignore_ascii_case(domain))
    }

    /// Whether the generic git transport can fetch this URL: a known git
    /// scheme, an scp-style remote, or a local path.
    pub fn is_git_transport(&self) -> bool {
        match &self.scheme {
            Some(scheme) => GIT_SCHEMES.contains(&scheme.as_str()),
            None => true,
        }
    }
}

fn trim_project(path: &str) -> String {
    path.trim_start_matches('/')
        .trim_end_matches('/')
        .trim_end_matches(".git")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_https_url() {
        let url = RepoUrl::parse("https://gitlab.com/some-org/some-repo").unwrap();
        assert_eq!(url.scheme.as_deref(), Some("https"));
        assert!(url.host_is("gitlab.com"));
        assert_eq!(url.project, "some-org/some-repo");
    }

    #[test]
    fn strips_dot_git_suffix() {
        let url = RepoUrl::parse("https://github.com/wildfly/wildfly.git").unwrap();
        assert_eq!(url.project, "wildfly/wildfly");
    }

    #[test]
    fn parses_scp_style_url() {
        let url = RepoUrl::parse("git@gitlab.com:some-org/some-repo.git").unwrap();
        assert_eq!(url.scheme, None);
        assert!(url.host_is("gitlab.com"));
        assert_eq!(url.project, "some-org/some-repo");
    }

    #[test]
    fn parses_ssh_scheme_url() {
        let url = RepoUrl::parse("ssh://git@github.com/org/repo.git").unwrap();
        assert_eq!(url.scheme.as_deref(), Some("ssh"));
        assert!(url.host_is("github.com"));
        assert_eq!(url.project, "org/repo");
    }

    #[test]
    fn schemeless_host_path_is_a_local_path() {
        // Without a scheme or scp colon there is no recognized host, so
        // platform matchers must not claim this.
        let url = RepoUrl::parse("gitlab.com/some-org/some-repo").unwrap();
        assert_eq!(url.host, None);
    }

    #[test]
    fn local_path_has_no_host_and_is_git_transport() {
        let url = RepoUrl::parse("/tmp/fixture-repo").unwrap();
        assert_eq!(url.host, None);
        assert!(url.is_git_transport());
    }

    #[test]
    fn unknown_scheme_is_not_git_transport() {
        let url = RepoUrl::parse("ftp://example.com/some/repo").unwrap();
        assert!(!url.is_git_transport());
    }

    #[test]
    fn empty_url_is_rejected() {
        let err = RepoUrl::parse("   ").unwrap_err();
        assert!(matches!(err, ScoutError::InvalidUrl { .. }));
    }

    #[test]
    fn source_defaults_to_master_ref() {
        let source = RepoSource::new("https://gitlab.com/a/b", Credential::oauth_token("t"));
        assert_eq!(source.ref_name, DEFAULT_REF);
    }

    #[test]
    fn empty_ref_falls_back_to_default() {
        let source =
            RepoSource::new("https://gitlab.com/a/b", Credential::oauth_token("t")).with_ref("");
        assert_eq!(source.ref_name, DEFAULT_REF);
    }

    #[test]
    fn flavor_hint_matches_case_insensitively() {
        let source = RepoSource::new("https://example.com/a/b", Credential::oauth_token("t"))
            .with_flavor("GitLab");
        assert!(source.flavor_is("gitlab"));
        assert!(!source.flavor_is("github"));
    }

    #[test]
    fn ssh_key_is_not_api_compatible() {
        assert!(!Credential::ssh_key(b"key".to_vec(), None).is_api_compatible());
        assert!(Credential::username_password("anonymous", "").is_api_compatible());
        assert!(Credential::oauth_token("some-token").is_api_compatible());
    }

    #[test]
    fn empty_passphrase_is_treated_as_absent() {
        let cred = Credential::ssh_key(b"key".to_vec(), Some(""));
        match cred {
            Credential::SshKey { passphrase, .. } => assert_eq!(passphrase, None),
            _ => panic!("expected SshKey"),
        }
    }

    #[test]
    fn debug_never_prints_secret_material() {
        let creds = [
            Credential::ssh_key(b"very-secret-key".to_vec(), Some("hunter2")),
            Credential::username_password("user", "hunter2"),
            Credential::oauth_token("hunter2"),
        ];
        for cred in creds {
            let printed = format!("{cred:?}");
            assert!(!printed.contains("hunter2"), "leaked secret: {printed}");
            assert!(!printed.contains("very-secret-key"));
        }
    }
}
