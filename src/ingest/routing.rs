//! Source path -> target collection routing.

use std::path::{Component, Path};

use crate::constants::{EXAMPLES_COLLECTION, MISC_COLLECTION, RUBRICS_COLLECTION};

/// Substring rules, checked in order against each directory segment.
const ROUTES: &[(&str, &str)] = &[
    ("rubric", RUBRICS_COLLECTION),
    ("example", EXAMPLES_COLLECTION),
    ("exemplar", EXAMPLES_COLLECTION),
    ("sample", EXAMPLES_COLLECTION),
    ("achievement", "achievement_standards"),
    ("standard", "achievement_standards"),
    ("genre", "genres"),
    ("feedback", "feedback"),
    ("prompt", "prompts"),
    ("vocab", "vocabulary"),
    ("glossary", "vocabulary"),
    ("guide", "guidelines"),
    ("curriculum", "curriculum"),
];

/// Every collection the uploader can write to (ten, `misc` last).
pub const COLLECTIONS: [&str; 10] = [
    RUBRICS_COLLECTION,
    EXAMPLES_COLLECTION,
    "achievement_standards",
    "genres",
    "feedback",
    "prompts",
    "vocabulary",
    "guidelines",
    "curriculum",
    MISC_COLLECTION,
];

/// Picks the collection for a file path relative to the upload root.
///
/// Directory segments are examined outermost first and the first segment matching any rule
/// decides. The file name itself is not considered.
pub fn route_collection(relative_path: &Path) -> &'static str {
    let dirs = relative_path.parent().into_iter().flat_map(Path::components);

    for component in dirs {
        let Component::Normal(segment) = component else {
            continue;
        };
        let segment = segment.to_string_lossy().to_lowercase();
        if let Some((_, collection)) = ROUTES.iter().find(|(needle, _)| segment.contains(needle)) {
            return *collection;
        }
    }

    MISC_COLLECTION
}
