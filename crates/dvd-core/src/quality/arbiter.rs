//! Replace-only-on-improvement rule.

use crate::session::Candidate;

use super::priority;

/// Decides whether `incoming` should replace the stored candidate of the same kind.
///
/// With nothing stored the incoming candidate is always kept. Otherwise it
/// must rank strictly higher; an equal rank keeps the stored one so equal
/// variants seen in alternation never flip the stored URL.
pub fn should_replace(existing: Option<&Candidate>, incoming: &Candidate) -> bool {
    let Some(existing) = existing else {
        return true;
    };
    let new_rank = priority(incoming.kind, &incoming.quality_label);
    let old_rank = priority(existing.kind, &existing.quality_label);
    new_rank > old_rank
}
