//! Analysis type names and cluster labels.
//!
//! An analysis type combines a grade grouping with a search radius, e.g.
//! `"ABC_10mi"`. Cluster labels in the source data look like
//! `"ABC_10mi_C4"`; the trailing `C<digits>` is the cluster id.

use std::sync::LazyLock;

use regex::Regex;
use zip_cluster_geography_models::AnalysisType;

/// The conventional analysis types.
pub const DEFAULT_ANALYSIS_TYPES: &[&str] = &[
    "A_5mi", "A_10mi", "AB_5mi", "AB_10mi", "ABC_5mi", "ABC_10mi", "BC_5mi", "BC_10mi",
];

static CLUSTER_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"C([0-9]+)$").expect("valid regex"));

#[must_use]
pub fn default_analysis_types() -> Vec<AnalysisType> {
    DEFAULT_ANALYSIS_TYPES
        .iter()
        .map(|name| AnalysisType::new(*name))
        .collect()
}

/// Reduces a cluster label to its id.
///
/// `"A_5mi_C1"` becomes `"1"`. Labels without a `C<digits>` suffix are
/// returned trimmed but otherwise verbatim. Empty labels are `None`.
#[must_use]
pub fn parse_cluster_label(label: &str) -> Option<String> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    Some(
        CLUSTER_SUFFIX_RE
            .captures(label)
            .map_or_else(|| label.to_string(), |caps| caps[1].to_string()),
    )
}

/// Whether `column` names `analysis` as a whole token.
///
/// The name must not be glued to other letters or digits, so `"BC_5mi"`
/// does not match an `"ABC_5mi"` column.
#[must_use]
pub fn column_matches(column: &str, analysis: &AnalysisType) -> bool {
    let name = analysis.as_str();
    if name.is_empty() {
        return false;
    }
    column.match_indices(name).any(|(start, _)| {
        let before = column[..start].chars().next_back();
        let after = column[start + name.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
