//! Occurrence resolution: finds the cardinality a child keyword has under a grammar entry.
//!
//! The search is depth-first over the entry's rules. Choice alternatives are tried in order
//! and the first match wins; interleave groups are searched like a plain sequence.

use crate::ast::is_prefixed;
use crate::grammar::{GrammarEntry, Occurrence, Rule};

/// Where a keyword sits in a rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub occurrence: Occurrence,
    /// Ordering key used by canonical validation. The first element is the index of the
    /// top-level rule; a choice adds the position inside the matched alternative. Members of
    /// an interleave group share their group's key.
    pub path: Vec<usize>,
}

/// Resolves the occurrence of `child` under `entry`.
///
/// Extension keywords (`prefix:name`) are always `*` and never consult the table. `None` is
/// the explicit "unknown here" marker that the grammar validator reports.
pub fn resolve_occurrence(entry: &GrammarEntry, child: &str) -> Option<Occurrence> {
    if is_prefixed(child) {
        return Some(Occurrence::ZeroOrMore);
    }
    resolve_in(entry.rules(), child)
}

pub(crate) fn resolve_in(rules: &[Rule], child: &str) -> Option<Occurrence> {
    locate(rules, child).map(|found| found.occurrence)
}

/// Finds `child` in `rules`, returning its occurrence and canonical ordering key.
pub fn locate(rules: &[Rule], child: &str) -> Option<Located> {
    for (index, rule) in rules.iter().enumerate() {
        match rule {
            Rule::Keyword(keyword, occurrence) if keyword == child => {
                return Some(Located {
                    occurrence: *occurrence,
                    path: vec![index],
                });
            }
            Rule::Keyword(..) => {}
            Rule::Choice(alternatives) => {
                for alternative in alternatives {
                    if let Some(mut found) = locate(alternative, child) {
                        found.path.insert(0, index);
                        return Some(found);
                    }
                }
            }
            Rule::Interleave(inner) => {
                if let Some(found) = locate(inner, child) {
                    return Some(Located {
                        occurrence: found.occurrence,
                        path: vec![index],
                    });
                }
            }
        }
    }
    None
}
