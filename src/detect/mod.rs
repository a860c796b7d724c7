//! Build-environment detection.
//!
//! Turns a resolved backend's two listings — root files and languages —
//! into a deterministic [`BuildEnvReport`]. Build tools are matched against
//! the marker-file signature table; languages are ranked by usage weight
//! with an alphabetical fallback.

pub mod engine;
pub mod languages;
pub mod signatures;

pub use engine::{BuildEnvReport, DetectedBuildTool, DetectionEngine};
pub use languages::{language_for_path, rank_languages};
pub use signatures::{default_signatures, BuildToolSignature};
