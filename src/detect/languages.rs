//! Language tables and ranking.
//!
//! Two concerns live here: mapping file extensions to language names for
//! backends without provider-side statistics, and producing the single
//! deterministic language ordering used by every backend. The ranking is one
//! shared routine — (descending weight, ascending name) — so the weighted
//! case and the uniform/unknown case cannot drift apart.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

use crate::backend::Language;

/// Recognized file extensions, lower-case, and the language each implies.
const EXTENSION_LANGUAGES: &[(&str, &str)] = &[
    ("c", "C"),
    ("cc", "C++"),
    ("cpp", "C++"),
    ("cs", "C#"),
    ("css", "CSS"),
    ("go", "Go"),
    ("h", "C"),
    ("html", "HTML"),
    ("java", "Java"),
    ("js", "JavaScript"),
    ("json", "JSON"),
    ("kt", "Kotlin"),
    ("md", "Markdown"),
    ("php", "PHP"),
    ("pl", "Perl"),
    ("py", "Python"),
    ("rb", "Ruby"),
    ("rs", "Rust"),
    ("sh", "Shell"),
    ("swift", "Swift"),
    ("toml", "TOML"),
    ("ts", "TypeScript"),
    ("xml", "XML"),
    ("yaml", "YAML"),
    ("yml", "YAML"),
];

/// Language implied by a file's extension, if the extension is recognized.
pub fn language_for_path(path: &str) -> Option<&'static str> {
    let extension = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
    EXTENSION_LANGUAGES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, lang)| *lang)
}

/// Produce the total language ordering for a report.
///
/// Order is descending usage weight, ties and unweighted entries broken by
/// ascending name. Duplicate names collapse to the entry with the highest
/// weight. The result is deterministic regardless of input order.
pub fn rank_languages(languages: Vec<Language>) -> Vec<String> {
    let mut best: BTreeMap<String, Option<f64>> = BTreeMap::new();
    for language in languages {
        let entry = best.entry(language.name).or_insert(None);
        *entry = match (*entry, language.weight) {
            (Some(current), Some(new)) => Some(current.max(new)),
            (current, None) => current,
            (None, new) => new,
        };
    }

    let mut ranked: Vec<(String, f64)> = best
        .into_iter()
        .map(|(name, weight)| (name, weight.unwrap_or(0.0)))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.into_iter().map(|(name, _)| name).collect()
}
