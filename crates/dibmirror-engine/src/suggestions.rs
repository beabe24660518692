//! Fuzzy matching for template ids and variable names
//!
//! Uses Levenshtein distance to turn "not found" errors into
//! "did you mean" hints.

/// Maximum Levenshtein distance to consider for variable suggestions
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// A suggested correction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// The suggested correction
    pub text: String,
    /// Levenshtein distance (lower = better match)
    pub distance: usize,
}

pub fn levenshtein(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Closest candidates within `max_distance`, best first
pub fn find_closest_matches(
    input: &str,
    candidates: &[&str],
    max_distance: usize,
    max_results: usize,
) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = levenshtein(input, candidate);
            if distance <= max_distance && distance > 0 {
                Some(Suggestion {
                    text: candidate.to_string(),
                    distance,
                })
            } else {
                None
            }
        })
        .collect();

    // Stable sort keeps candidate order for ties
    suggestions.sort_by_key(|s| s.distance);
    suggestions.truncate(max_results);
    suggestions
}

/// Suggest template ids for one that could not be found.
///
/// Ids are long paths, so the allowed distance grows with the input.
pub fn suggest_template_ids(id: &str, known: &[String]) -> Vec<String> {
    let candidates: Vec<&str> = known.iter().map(String::as_str).collect();
    let max_distance = (id.len() / 4).max(MAX_SUGGESTION_DISTANCE);

    find_closest_matches(id, &candidates, max_distance, 3)
        .into_iter()
        .map(|s| s.text)
        .collect()
}

/// Suggestion for an undefined variable
pub fn suggest_undefined_variable(name: &str, available: &[&str]) -> Option<String> {
    let matches = find_closest_matches(name, available, MAX_SUGGESTION_DISTANCE, 3);

    if let Some(best) = matches.first() {
        return Some(format!(
            "Did you mean `{}`? Available variables: {}",
            best.text,
            available.join(", ")
        ));
    }

    if available.is_empty() {
        None
    } else {
        Some(format!(
            "Variable `{}` is not defined. Available variables: {}. Pass extra variables with --set {}=VALUE",
            name,
            available.join(", "),
            name
        ))
    }
}
