//! Build-tool signature table.
//!
//! A signature pairs a root-level marker filename with the build tool it
//! implies. The table is an explicit immutable value passed into the
//! detection engine, so tests can substitute their own; its order is the
//! order build tools appear in a report.

/// One marker filename and the build tool its presence implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildToolSignature {
    /// Build tool name, e.g. "Maven".
    pub name: String,
    /// Root-level marker filename, e.g. "pom.xml". A given marker implies
    /// exactly one tool.
    pub marker: String,
}

impl BuildToolSignature {
    pub fn new(name: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            marker: marker.into(),
        }
    }
}

/// The standard signature table. Order here is report order.
pub fn default_signatures() -> Vec<BuildToolSignature> {
    vec![
        BuildToolSignature::new("Maven", "pom.xml"),
        BuildToolSignature::new("Gradle", "build.gradle"),
        BuildToolSignature::new("Golang", "go.mod"),
        BuildToolSignature::new("NodeJS", "package.json"),
        BuildToolSignature::new("Ruby", "Gemfile"),
        BuildToolSignature::new("PHP", "composer.json"),
        BuildToolSignature::new("Python", "requirements.txt"),
        BuildToolSignature::new("Rust", "Cargo.toml"),
    ]
}
