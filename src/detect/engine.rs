//! Detection engine.
//!
//! Consumes a resolved repository service and derives the build-environment
//! report: build tools from root-level marker files, languages ranked by
//! usage. The pipeline is strictly sequential — resolve, list files, list
//! languages, assemble — and any failure aborts it with no partial report.

use tracing::debug;

use super::languages::rank_languages;
use super::signatures::{default_signatures, BuildToolSignature};
use crate::backend::{RepositoryService, Selector};
use crate::error::{Result, ScoutError};
use crate::source::RepoSource;

/// One detected build tool and the root-level file that betrayed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedBuildTool {
    /// Build tool name, e.g. "Maven".
    pub name: String,
    /// Marker filename found at the repository root, e.g. "pom.xml".
    pub evidence: String,
}

/// Terminal artifact of a successful detection run.
///
/// Either fully built or the whole operation failed; never partially
/// populated. Owns no references back to the repository service.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildEnvReport {
    /// Detected build tools, in signature-table order.
    pub detected_build_tools: Vec<DetectedBuildTool>,
    /// Language names ordered by descending usage weight, ties and
    /// unweighted entries broken alphabetically.
    pub sorted_languages: Vec<String>,
}

/// Drives one detection run: backend selection, listing, report assembly.
pub struct DetectionEngine {
    selector: Selector,
    signatures: Vec<BuildToolSignature>,
}

impl DetectionEngine {
    /// Engine with an explicit matcher chain and signature table.
    pub fn new(selector: Selector, signatures: Vec<BuildToolSignature>) -> Self {
        Self {
            selector,
            signatures,
        }
    }

    /// Engine with the standard chain and signature table.
    pub fn standard() -> Self {
        Self::new(Selector::default_chain(), default_signatures())
    }

    /// Detect the build environment of `source`.
    pub fn detect(&self, source: &RepoSource) -> Result<BuildEnvReport> {
        let service = self
            .selector
            .resolve(source)?
            .ok_or_else(|| ScoutError::NoCompatibleBackend {
                url: source.url.clone(),
            })?;
        self.detect_using_service(service.as_ref())
    }

    /// Detect using an already-resolved service. Both listing calls must
    /// succeed; a language-listing failure is not masked by a successful
    /// file listing, and vice versa.
    pub fn detect_using_service(&self, service: &dyn RepositoryService) -> Result<BuildEnvReport> {
        let root_files = service.list_root_files()?;
        let languages = service.list_languages()?;
        debug!(
            backend = service.backend_name(),
            files = root_files.len(),
            languages = languages.len(),
            "listings fetched"
        );

        // Signature-table order, not root-listing order: the backend may
        // return files in any order.
        let detected_build_tools = self
            .signatures
            .iter()
            .filter(|signature| root_files.iter().any(|file| *file == signature.marker))
            .map(|signature| DetectedBuildTool {
                name: signature.name.clone(),
                evidence: signature.marker.clone(),
            })
            .collect();

        Ok(BuildEnvReport {
            detected_build_tools,
            sorted_languages: rank_languages(languages),
        })
    }
}
