//! Grammar validation of statement trees.
//!
//! For every statement:
//! 1. its argument is present exactly when the keyword takes one;
//! 2. each substatement keyword is allowed under it (or is an extension);
//! 3. per-keyword counts fit their occurrence, and choice groups match one alternative;
//! 4. in canonical mode, substatements follow the declared rule order.
//!
//! Violations are reported and the walk continues, so one pass finds all of them.

use std::collections::HashMap;

use crate::ast::{is_prefixed, Statement, StatementTree, StmtId};
use crate::errors::{DiagnosticSink, ErrorRecord, ErrorTag};
use crate::grammar::{accepts_empty, locate, resolve_occurrence, rule_keywords, GrammarEntry, GrammarTable, Rule};

/// Substatements of one statement grouped by keyword, in document order.
type Occurrences = HashMap<String, Vec<StmtId>>;

pub struct GrammarValidator<'g> {
    grammar: &'g GrammarTable,
    canonical: bool,
}

impl<'g> GrammarValidator<'g> {
    pub fn new(grammar: &'g GrammarTable, canonical: bool) -> Self {
        Self { grammar, canonical }
    }

    /// Checks the whole tree.
    pub fn validate(&self, tree: &StatementTree, sink: &mut dyn DiagnosticSink) {
        let root = &tree[tree.root()];
        if !self.grammar.allows_top_level(&root.keyword) {
            report(sink, root, ErrorTag::BadTopLevel, [root.keyword.clone()]);
        }

        for id in tree.preorder(tree.root()) {
            let stmt = &tree[id];
            if stmt.is_extension() {
                continue;
            }
            let Some(entry) = self.grammar.entry(&stmt.keyword) else {
                continue;
            };
            self.check_argument(entry, stmt, sink);
            let occurrences = self.collect_children(tree, entry, stmt, sink);
            check_rules(tree, entry.rules(), &occurrences, stmt, sink);
            if self.canonical {
                check_order(tree, entry, stmt, sink);
            }
        }
    }

    fn check_argument(&self, entry: &GrammarEntry, stmt: &Statement, sink: &mut dyn DiagnosticSink) {
        match (entry.argument_name(), &stmt.argument) {
            (Some(_), None) => report(sink, stmt, ErrorTag::ExpectedArgument, [stmt.keyword.clone()]),
            (None, Some(argument)) => {
                report(sink, stmt, ErrorTag::UnexpectedArgument, [argument.clone()])
            }
            _ => {}
        }
    }

    /// Groups allowed substatements by keyword and reports the ones not allowed here.
    fn collect_children(
        &self,
        tree: &StatementTree,
        entry: &GrammarEntry,
        stmt: &Statement,
        sink: &mut dyn DiagnosticSink,
    ) -> Occurrences {
        let mut occurrences = Occurrences::new();
        for &child_id in stmt.substatements() {
            let child = &tree[child_id];
            if is_prefixed(&child.keyword) {
                continue;
            }
            if resolve_occurrence(entry, &child.keyword).is_none() {
                let tag = if self.grammar.contains(&child.keyword) {
                    ErrorTag::UnexpectedKeyword
                } else {
                    ErrorTag::UnknownKeyword
                };
                report(sink, child, tag, [child.keyword.clone()]);
                continue;
            }
            occurrences
                .entry(child.keyword.clone())
                .or_default()
                .push(child_id);
        }
        occurrences
    }
}

fn count(occurrences: &Occurrences, keyword: &str) -> usize {
    occurrences.get(keyword).map_or(0, Vec::len)
}

fn check_rules(
    tree: &StatementTree,
    rules: &[Rule],
    occurrences: &Occurrences,
    stmt: &Statement,
    sink: &mut dyn DiagnosticSink,
) {
    for rule in rules {
        match rule {
            Rule::Keyword(keyword, occurrence) => {
                let seen = occurrences.get(keyword.as_str()).map_or(&[][..], Vec::as_slice);
                if occurrence.is_required() && seen.is_empty() {
                    report(
                        sink,
                        stmt,
                        ErrorTag::ExpectedKeyword,
                        [keyword.clone(), stmt.keyword.clone()],
                    );
                }
                if occurrence.is_single() && seen.len() > 1 {
                    report(
                        sink,
                        &tree[seen[1]],
                        ErrorTag::UnexpectedKeywordOne,
                        [keyword.clone(), stmt.keyword.clone()],
                    );
                }
            }
            Rule::Interleave(inner) => check_rules(tree, inner, occurrences, stmt, sink),
            Rule::Choice(alternatives) => {
                check_choice(tree, alternatives, occurrences, stmt, sink)
            }
        }
    }
}

fn check_choice(
    tree: &StatementTree,
    alternatives: &[Vec<Rule>],
    occurrences: &Occurrences,
    stmt: &Statement,
    sink: &mut dyn DiagnosticSink,
) {
    // first keyword actually used from each alternative
    let present: Vec<(usize, &str)> = alternatives
        .iter()
        .enumerate()
        .filter_map(|(index, alternative)| {
            let mut keywords = Vec::new();
            rule_keywords(alternative, &mut keywords);
            keywords
                .into_iter()
                .find(|kw| count(occurrences, kw) > 0)
                .map(|kw| (index, kw))
        })
        .collect();

    match present.as_slice() {
        [] => {
            if !alternatives.iter().any(|alt| accepts_empty(alt)) {
                let mut keywords = Vec::new();
                for alternative in alternatives {
                    rule_keywords(alternative, &mut keywords);
                }
                let expected = keywords
                    .iter()
                    .map(|kw| format!("\"{kw}\""))
                    .collect::<Vec<_>>()
                    .join(", ");
                report(sink, stmt, ErrorTag::ExpectedChoice, [expected, stmt.keyword.clone()]);
            }
        }
        [(index, _)] => check_rules(tree, &alternatives[*index], occurrences, stmt, sink),
        [(first, first_kw), rest @ ..] => {
            for (_, other_kw) in rest {
                let offender = occurrences[*other_kw][0];
                report(
                    sink,
                    &tree[offender],
                    ErrorTag::ChoiceConflict,
                    [other_kw.to_string(), first_kw.to_string()],
                );
            }
            check_rules(tree, &alternatives[*first], occurrences, stmt, sink);
        }
    }
}

/// Canonical order: the ordering keys of successive substatements never decrease.
fn check_order(tree: &StatementTree, entry: &GrammarEntry, stmt: &Statement, sink: &mut dyn DiagnosticSink) {
    let mut last: Option<Vec<usize>> = None;
    for &child_id in stmt.substatements() {
        let child = &tree[child_id];
        if is_prefixed(&child.keyword) {
            continue;
        }
        let Some(found) = locate(entry.rules(), &child.keyword) else {
            continue;
        };
        let in_order = last.as_ref().map_or(true, |previous| found.path >= *previous);
        if in_order {
            last = Some(found.path);
        } else {
            report(sink, child, ErrorTag::UnexpectedKeywordCanonical, [child.keyword.clone()]);
        }
    }
}

fn report<I, S>(sink: &mut dyn DiagnosticSink, stmt: &Statement, tag: ErrorTag, args: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    sink.report(ErrorRecord::new(stmt.position.clone(), tag, args));
}
