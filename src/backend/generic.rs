//! Generic git backend.
//!
//! The fallback used whenever no platform API is usable: private hosts,
//! SSH-only access, or an unrecognized flavor hint. Construction validates
//! the credential, then clones the requested ref into a private temporary
//! checkout; both listing operations read the resolved commit's tree, so a
//! marker file below the root never counts as a root file.
//!
//! There are no provider-side language statistics on this path. Languages
//! are inferred from file extensions found anywhere in the tree and carry
//! no weights, which the detection engine resolves to an alphabetical
//! ordering.

use std::collections::BTreeSet;

use git2::{build::RepoBuilder, Cred, FetchOptions, ObjectType, RemoteCallbacks, TreeWalkMode, TreeWalkResult};
use sha2::{Digest, Sha256};
use tempfile::TempDir;
use tracing::debug;

use super::{BackendMatcher, Language, RepositoryService};
use crate::detect::languages::language_for_path;
use crate::error::{Result, ScoutError};
use crate::source::{Credential, RepoSource, RepoUrl};

const BACKEND: &str = "generic git";

/// Matcher for the generic git backend. Maximally permissive: claims any
/// git-transportable URL with any credential, so it must always be
/// registered last.
pub struct GenericGitMatcher;

impl BackendMatcher for GenericGitMatcher {
    fn try_create(&self, source: &RepoSource) -> Result<Option<Box<dyn RepositoryService>>> {
        let url = RepoUrl::parse(&source.url)?;
        if !url.is_git_transport() {
            return Ok(None);
        }
        Ok(Some(Box::new(GenericGitService::new(source)?)))
    }
}

/// Credential in the form the git transport consumes.
#[derive(Clone, Debug)]
enum TransportAuth {
    SshKey {
        key: String,
        passphrase: Option<String>,
    },
    UserPass {
        username: String,
        password: String,
    },
    Token(String),
}

/// Repository service backed by a private clone of the requested ref.
pub struct GenericGitService {
    repo: git2::Repository,
    /// Owns the checkout directory for the lifetime of this service.
    _checkout: TempDir,
}

impl GenericGitService {
    /// Validate the credential and clone the source's ref.
    ///
    /// A credential that cannot be decoded (encrypted key without its
    /// passphrase, passphrase for an unencrypted key) fails here with a
    /// [`ScoutError::CredentialDecode`], before any network activity.
    pub fn new(source: &RepoSource) -> Result<Self> {
        let auth = validate_credential(&source.credential)?;

        let checkout = tempfile::Builder::new()
            .prefix(&format!("reposcout-{}-", url_digest(&source.url)))
            .tempdir()?;
        let repo = clone_ref(&source.url, &source.ref_name, auth, checkout.path())?;

        Ok(Self {
            repo,
            _checkout: checkout,
        })
    }

    fn head_tree(&self) -> Result<git2::Tree<'_>> {
        Ok(self.repo.head()?.peel_to_tree()?)
    }
}

impl RepositoryService for GenericGitService {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn list_root_files(&self) -> Result<Vec<String>> {
        let tree = self.head_tree()?;
        Ok(tree
            .iter()
            .filter_map(|entry| entry.name().map(String::from))
            .collect())
    }

    fn list_languages(&self) -> Result<Vec<Language>> {
        let tree = self.head_tree()?;
        let mut found: BTreeSet<&'static str> = BTreeSet::new();
        tree.walk(TreeWalkMode::PreOrder, |_, entry| {
            if entry.kind() == Some(ObjectType::Blob) {
                if let Some(language) = entry.name().and_then(language_for_path) {
                    found.insert(language);
                }
            }
            TreeWalkResult::Ok
        })?;
        Ok(found.into_iter().map(Language::unweighted).collect())
    }
}

/// Decode-check the credential and convert it to its transport form.
fn validate_credential(credential: &Credential) -> Result<TransportAuth> {
    match credential {
        Credential::SshKey {
            private_key,
            passphrase,
        } => {
            let key_text =
                std::str::from_utf8(private_key).map_err(|_| ScoutError::CredentialDecode {
                    message: "private key is not valid UTF-8".into(),
                })?;
            let parsed = ssh_key::PrivateKey::from_openssh(private_key).map_err(|e| {
                ScoutError::CredentialDecode {
                    message: format!("cannot decode private key: {e}"),
                }
            })?;
            match (parsed.is_encrypted(), passphrase) {
                (true, None) => {
                    return Err(ScoutError::CredentialDecode {
                        message: "cannot decode encrypted private keys without a passphrase"
                            .into(),
                    });
                }
                (true, Some(phrase)) => {
                    parsed
                        .decrypt(phrase)
                        .map_err(|_| ScoutError::CredentialDecode {
                            message:
                                "cannot decode encrypted private keys: passphrase does not match"
                                    .into(),
                        })?;
                }
                (false, Some(_)) => {
                    return Err(ScoutError::CredentialDecode {
                        message: "passphrase supplied but the private key is not encrypted".into(),
                    });
                }
                (false, None) => {}
            }
            Ok(TransportAuth::SshKey {
                key: key_text.to_string(),
                passphrase: passphrase.clone(),
            })
        }
        Credential::UsernamePassword { username, password } => Ok(TransportAuth::UserPass {
            username: username.clone(),
            password: password.clone(),
        }),
        Credential::OauthToken(token) => Ok(TransportAuth::Token(token.clone())),
    }
}

fn clone_ref(
    url: &str,
    ref_name: &str,
    auth: TransportAuth,
    destination: &std::path::Path,
) -> Result<git2::Repository> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, username_from_url, _allowed| match &auth {
        TransportAuth::SshKey { key, passphrase } => Cred::ssh_key_from_memory(
            username_from_url.unwrap_or("git"),
            None,
            key,
            passphrase.as_deref(),
        ),
        TransportAuth::UserPass { username, password } => {
            Cred::userpass_plaintext(username, password)
        }
        TransportAuth::Token(token) => Cred::userpass_plaintext("oauth2", token),
    });

    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);
    fetch_options.download_tags(git2::AutotagOption::None);

    debug!(url, ref_name, "cloning repository");
    let mut builder = RepoBuilder::new();
    builder.branch(ref_name);
    builder.fetch_options(fetch_options);
    let repo = builder.clone(url, destination)?;
    debug!(url, "clone completed");
    Ok(repo)
}

/// Deterministic per-URL prefix for checkout directories.
fn url_digest(url: &str) -> String {
    let hash = Sha256::digest(url.as_bytes());
    hex::encode(&hash[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN_KEY: &str = include_str!("../../tests/keys/plain_ed25519");
    const ENCRYPTED_KEY: &str = include_str!("../../tests/keys/enc_ed25519");

    #[test]
    fn plain_key_without_passphrase_validates() {
        let cred = Credential::ssh_key(PLAIN_KEY.as_bytes().to_vec(), None);
        assert!(validate_credential(&cred).is_ok());
    }

    #[test]
    fn encrypted_key_with_matching_passphrase_validates() {
        let cred = Credential::ssh_key(ENCRYPTED_KEY.as_bytes().to_vec(), Some("secret"));
        assert!(validate_credential(&cred).is_ok());
    }

    #[test]
    fn encrypted_key_without_passphrase_is_a_decode_error() {
        let cred = Credential::ssh_key(ENCRYPTED_KEY.as_bytes().to_vec(), None);
        let err = validate_credential(&cred).unwrap_err();
        assert!(err
            .to_string()
            .contains("cannot decode encrypted private keys"));
    }

    #[test]
    fn encrypted_key_with_wrong_passphrase_is_a_decode_error() {
        let cred = Credential::ssh_key(ENCRYPTED_KEY.as_bytes().to_vec(), Some("wrong"));
        let err = validate_credential(&cred).unwrap_err();
        assert!(err.to_string().contains("passphrase does not match"));
    }

    #[test]
    fn plain_key_with_passphrase_is_a_decode_error() {
        let cred = Credential::ssh_key(PLAIN_KEY.as_bytes().to_vec(), Some("unneeded"));
        let err = validate_credential(&cred).unwrap_err();
        assert!(matches!(err, ScoutError::CredentialDecode { .. }));
    }

    #[test]
    fn garbage_key_is_a_decode_error() {
        let cred = Credential::ssh_key(b"not a key at all".to_vec(), None);
        let err = validate_credential(&cred).unwrap_err();
        assert!(matches!(err, ScoutError::CredentialDecode { .. }));
    }

    #[test]
    fn username_password_needs_no_decoding() {
        let cred = Credential::username_password("anonymous", "");
        assert!(validate_credential(&cred).is_ok());
    }

    #[test]
    fn url_digest_is_deterministic_and_hex() {
        let a = url_digest("https://example.com/org/repo.git");
        let b = url_digest("https://example.com/org/repo.git");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, url_digest("https://example.com/org/other.git"));
    }

    #[test]
    fn matcher_declines_non_git_scheme() {
        let source = RepoSource::new(
            "ftp://example.com/some/repo",
            Credential::username_password("anonymous", ""),
        );
        assert!(GenericGitMatcher.try_create(&source).unwrap().is_none());
    }
}
