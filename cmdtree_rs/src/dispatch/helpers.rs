//! Subcommand suggestions via Levenshtein distance.

use strsim::levenshtein;

/// Largest edit distance still considered a typo.
const MAX_SUGGESTION_DISTANCE: usize = 2;

/// Suggest the candidate closest to `input`.
/// Returns Some(suggestion) if a close match is found (distance <= 2).
pub(super) fn suggest_similar<'a, I>(input: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let input_lower = input.to_lowercase();
    let mut best_match: Option<(&str, usize)> = None;

    for candidate in candidates {
        let distance = levenshtein(&input_lower, &candidate.to_lowercase());
        if distance > MAX_SUGGESTION_DISTANCE {
            continue;
        }
        match best_match {
            Some((_, best_dist)) if distance >= best_dist => {}
            _ => best_match = Some((candidate, distance)),
        }
    }

    best_match.map(|(candidate, _)| candidate)
}
