//! YANG compact-syntax parser.
//!
//! Converts document text into a [`StatementTree`]. Purely syntactic: keywords are not checked
//! against the grammar here.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::ast::{Position, StatementTree, StmtId};
use crate::errors::DiagnosticSink;
use crate::syntax::{syntax_error, StatementParser, MAX_DEPTH};

#[derive(Parser)]
#[grammar = "syntax/yang.pest"]
struct YangGrammar;

#[derive(Debug, Clone, Copy, Default)]
pub struct YangParser;

impl StatementParser for YangParser {
    fn parse(
        &self,
        sink: &mut dyn DiagnosticSink,
        reference: &str,
        text: &str,
    ) -> Option<StatementTree> {
        if let Some(line) = nesting_overflow(text) {
            syntax_error(sink, reference, line, format!("statements nested deeper than {MAX_DEPTH}"));
            return None;
        }

        let mut pairs = match YangGrammar::parse(Rule::document, text) {
            Ok(pairs) => pairs,
            Err(error) => {
                let line = match error.line_col {
                    pest::error::LineColLocation::Pos((line, _)) => line,
                    pest::error::LineColLocation::Span((line, _), _) => line,
                };
                syntax_error(sink, reference, line, error.variant.message().into_owned());
                return None;
            }
        };

        let statement = pairs
            .next()
            .and_then(|document| document.into_inner().find(|p| p.as_rule() == Rule::statement))?;
        Some(build_tree(statement, reference))
    }
}

/// Parses YANG text, collecting diagnostics into `sink`.
pub fn parse_str(sink: &mut dyn DiagnosticSink, reference: &str, text: &str) -> Option<StatementTree> {
    YangParser.parse(sink, reference, text)
}

// ============================================================================
// TREE BUILDING
// ============================================================================

struct Parts<'i> {
    keyword: String,
    argument: Option<String>,
    line: usize,
    children: Vec<Pair<'i, Rule>>,
}

fn split_statement(pair: Pair<'_, Rule>) -> Parts<'_> {
    let line = pair.as_span().start_pos().line_col().0;
    let mut parts = Parts {
        keyword: String::new(),
        argument: None,
        line,
        children: Vec::new(),
    };
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::keyword => parts.keyword = inner.as_str().to_string(),
            Rule::argument => parts.argument = Some(build_argument(inner)),
            Rule::block => parts.children = inner.into_inner().collect(),
            _ => {}
        }
    }
    parts
}

fn build_tree(root: Pair<'_, Rule>, reference: &str) -> StatementTree {
    let reference: std::sync::Arc<str> = reference.into();
    let parts = split_statement(root);
    let mut tree = StatementTree::new(
        parts.keyword,
        parts.argument,
        Position::new(reference.clone(), parts.line),
    );

    let mut stack: Vec<(Pair<'_, Rule>, StmtId)> = parts
        .children
        .into_iter()
        .rev()
        .map(|child| (child, tree.root()))
        .collect();

    while let Some((pair, parent)) = stack.pop() {
        let parts = split_statement(pair);
        let id = tree.push(
            parent,
            parts.keyword,
            parts.argument,
            Position::new(reference.clone(), parts.line),
        );
        stack.extend(parts.children.into_iter().rev().map(|child| (child, id)));
    }
    tree
}

fn build_argument(pair: Pair<'_, Rule>) -> String {
    let mut value = String::new();
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::dq_string => {
                if let Some(inner) = part.into_inner().next() {
                    value.push_str(&unescape(inner.as_str()));
                }
            }
            Rule::sq_string => {
                if let Some(inner) = part.into_inner().next() {
                    value.push_str(inner.as_str());
                }
            }
            Rule::unquoted => value.push_str(part.as_str()),
            _ => {}
        }
    }
    value
}

fn unescape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

/// Line where brace nesting first exceeds [`MAX_DEPTH`]. Braces inside strings are counted
/// too, which only ever over-estimates depth.
fn nesting_overflow(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut line = 1;
    for ch in text.chars() {
        match ch {
            '\n' => line += 1,
            '{' => {
                depth += 1;
                if depth > MAX_DEPTH {
                    return Some(line);
                }
            }
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorRecord, ErrorTag};

    fn parse(text: &str) -> (Option<StatementTree>, Vec<ErrorRecord>) {
        let mut errors = Vec::new();
        let tree = parse_str(&mut errors, "test.yang", text);
        (tree, errors)
    }

    #[test]
    fn test_simple_module() {
        let (tree, errors) = parse(
            "module m {\n  namespace \"urn:m\";\n  prefix m;\n  leaf x { type string; }\n}\n",
        );
        assert!(errors.is_empty());
        let tree = tree.unwrap();
        let root = &tree[tree.root()];
        assert_eq!(root.keyword, "module");
        assert_eq!(root.arg(), "m");
        let keywords: Vec<_> = tree.children(tree.root()).map(|s| s.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["namespace", "prefix", "leaf"]);
        let leaf = tree.find_child(tree.root(), "leaf").unwrap();
        assert_eq!(tree[leaf].position.line, 4);
        assert_eq!(tree.children(leaf).next().unwrap().arg(), "string");
    }

    #[test]
    fn test_string_concatenation_and_escapes() {
        let (tree, _) = parse("module m { description \"a\\\"b\" + 'c\\n'; }");
        let tree = tree.unwrap();
        let description = tree.find_child(tree.root(), "description").unwrap();
        assert_eq!(tree[description].arg(), "a\"bc\\n");
    }

    #[test]
    fn test_comments_are_ignored() {
        let (tree, errors) = parse("// header\nmodule m { /* block */ prefix p; // tail\n}");
        assert!(errors.is_empty());
        assert_eq!(tree.unwrap().len(), 2);
    }

    #[test]
    fn test_extension_keyword() {
        let (tree, _) = parse("module m { ex:note \"hi\" { ex:deeper; } }");
        let tree = tree.unwrap();
        let note = tree.find_child(tree.root(), "ex:note").unwrap();
        assert!(tree[note].is_extension());
        assert_eq!(tree[note].substatements().len(), 1);
    }

    #[test]
    fn test_statement_without_argument() {
        let (tree, _) = parse("module m { rpc r { input { leaf a { type int8; } } } }");
        let tree = tree.unwrap();
        let rpc = tree.find_child(tree.root(), "rpc").unwrap();
        let input = tree.find_child(rpc, "input").unwrap();
        assert_eq!(tree[input].argument, None);
    }

    #[test]
    fn test_unclosed_block_records_syntax_error() {
        let (tree, errors) = parse("module m {\n  prefix p;\n");
        assert!(tree.is_none());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].tag, ErrorTag::SyntaxError);
    }

    #[test]
    fn test_excessive_nesting_is_rejected() {
        let text = format!("module m {}{}", "{ container c ".repeat(MAX_DEPTH + 1), "}".repeat(MAX_DEPTH + 2));
        let (tree, errors) = parse(&text);
        assert!(tree.is_none());
        assert_eq!(errors[0].tag, ErrorTag::SyntaxError);
    }
}
