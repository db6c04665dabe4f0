//! Template root-cause summary for a set of similar past logs.
//!
//! Used when no language model is wired in by the host; the text only
//! depends on the matches, so it is stable across runs.

use std::collections::BTreeSet;

use crate::types::RankedMatch;

const NO_MATCHES: &str =
    "No similar past logs found. Consider expanding the search or ingesting more log data.";

const CLOSING: &str = "Review the matches below for patterns. Common causes: connection timeouts, resource exhaustion, or deployment-related issues.";

/// Summarize search matches as a short paragraph.
pub fn summarize_matches(matches: &[RankedMatch]) -> String {
    if matches.is_empty() {
        return NO_MATCHES.to_string();
    }

    let services: BTreeSet<&str> = matches
        .iter()
        .map(|m| m.record.service.as_str())
        .filter(|s| !s.is_empty())
        .collect();
    let levels: BTreeSet<&str> = matches
        .iter()
        .map(|m| m.record.level.as_str())
        .filter(|l| !l.is_empty())
        .collect();

    let mut summary = format!("Found {} similar past incidents. ", matches.len());
    if !services.is_empty() {
        summary.push_str(&format!(
            "Affected services: {}. ",
            services.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }
    if !levels.is_empty() {
        summary.push_str(&format!(
            "Log levels: {}. ",
            levels.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }
    summary.push_str(CLOSING);
    summary
}
