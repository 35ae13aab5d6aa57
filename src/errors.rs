//! yangcheck diagnostics
//!
//! Every problem found while loading and validating modules is recorded as an
//! [`ErrorRecord`]: a position, an [`ErrorTag`] and positional arguments. Records accumulate in
//! the [`crate::context::Context`] in load order and are never mutated or deduplicated.
//!
//! Each tag has a fixed severity level (lower is more severe) and a message template with `{}`
//! placeholders. Filtering by level is a reporting concern; everything is always recorded.

use std::fmt;

use miette::{Diagnostic, Severity};
use serde::Serialize;

use crate::ast::Position;

// ============================================================================
// ERROR TAGS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorTag {
    // Loading
    SyntaxError,
    ReadError,
    ModuleNotFound,
    BadModuleFilename,

    // Grammar
    BadTopLevel,
    UnknownKeyword,
    UnexpectedKeyword,
    #[serde(rename = "UNEXPECTED_KEYWORD_1")]
    UnexpectedKeywordOne,
    ExpectedKeyword,
    UnexpectedKeywordCanonical,
    ChoiceConflict,
    ExpectedChoice,
    ExpectedArgument,
    UnexpectedArgument,

    // Projection and cross-module checks
    DuplicateStatement,
    DuplicateNamespace,
    DuplicatePrefix,
    BadImport,
    BadInclude,
    BadBelongsTo,
}

impl ErrorTag {
    pub const ALL: &'static [ErrorTag] = &[
        Self::SyntaxError,
        Self::ReadError,
        Self::ModuleNotFound,
        Self::BadModuleFilename,
        Self::BadTopLevel,
        Self::UnknownKeyword,
        Self::UnexpectedKeyword,
        Self::UnexpectedKeywordOne,
        Self::ExpectedKeyword,
        Self::UnexpectedKeywordCanonical,
        Self::ChoiceConflict,
        Self::ExpectedChoice,
        Self::ExpectedArgument,
        Self::UnexpectedArgument,
        Self::DuplicateStatement,
        Self::DuplicateNamespace,
        Self::DuplicatePrefix,
        Self::BadImport,
        Self::BadInclude,
        Self::BadBelongsTo,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            Self::SyntaxError => "SYNTAX_ERROR",
            Self::ReadError => "READ_ERROR",
            Self::ModuleNotFound => "MODULE_NOT_FOUND",
            Self::BadModuleFilename => "BAD_MODULE_FILENAME",
            Self::BadTopLevel => "BAD_TOP_LEVEL",
            Self::UnknownKeyword => "UNKNOWN_KEYWORD",
            Self::UnexpectedKeyword => "UNEXPECTED_KEYWORD",
            Self::UnexpectedKeywordOne => "UNEXPECTED_KEYWORD_1",
            Self::ExpectedKeyword => "EXPECTED_KEYWORD",
            Self::UnexpectedKeywordCanonical => "UNEXPECTED_KEYWORD_CANONICAL",
            Self::ChoiceConflict => "CHOICE_CONFLICT",
            Self::ExpectedChoice => "EXPECTED_CHOICE",
            Self::ExpectedArgument => "EXPECTED_ARGUMENT",
            Self::UnexpectedArgument => "UNEXPECTED_ARGUMENT",
            Self::DuplicateStatement => "DUPLICATE_STATEMENT",
            Self::DuplicateNamespace => "DUPLICATE_NAMESPACE",
            Self::DuplicatePrefix => "DUPLICATE_PREFIX",
            Self::BadImport => "BAD_IMPORT",
            Self::BadInclude => "BAD_INCLUDE",
            Self::BadBelongsTo => "BAD_BELONGS_TO",
        }
    }

    /// Severity level; 1 is the most severe.
    pub const fn level(self) -> u8 {
        match self {
            Self::BadModuleFilename => 2,
            Self::UnexpectedKeywordCanonical => 3,
            Self::DuplicatePrefix => 2,
            _ => 1,
        }
    }

    pub const fn template(self) -> &'static str {
        match self {
            Self::SyntaxError => "syntax error: {}",
            Self::ReadError => "read error: {}",
            Self::ModuleNotFound => "module \"{}\" not found in search path",
            Self::BadModuleFilename => "unexpected modulename \"{}\" in {}, should be {}",
            Self::BadTopLevel => "unexpected top-level keyword \"{}\", expected \"module\" or \"submodule\"",
            Self::UnknownKeyword => "unknown keyword \"{}\"",
            Self::UnexpectedKeyword => "unexpected keyword \"{}\"",
            Self::UnexpectedKeywordOne => "keyword \"{}\" may occur at most once in \"{}\"",
            Self::ExpectedKeyword => "expected keyword \"{}\" as substatement to \"{}\"",
            Self::UnexpectedKeywordCanonical => "keyword \"{}\" not in canonical order",
            Self::ChoiceConflict => "keyword \"{}\" cannot be combined with \"{}\"",
            Self::ExpectedChoice => "expected one of {} as substatement to \"{}\"",
            Self::ExpectedArgument => "expected an argument for keyword \"{}\"",
            Self::UnexpectedArgument => "did not expect an argument, got \"{}\"",
            Self::DuplicateStatement => "duplicate statement \"{}\"",
            Self::DuplicateNamespace => "duplicate namespace uri {} found in module {}",
            Self::DuplicatePrefix => "prefix \"{}\" is already in use",
            Self::BadImport => "\"{}\" is a submodule and cannot be imported",
            Self::BadInclude => "\"{}\" is not a submodule and cannot be included",
            Self::BadBelongsTo => "submodule \"{}\" belongs to \"{}\", not \"{}\"",
        }
    }
}

impl fmt::Display for ErrorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Fills `{}` placeholders in order. Missing arguments render as empty strings; surplus ones
/// are ignored.
pub fn render(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut pieces = template.split("{}").peekable();
    while let Some(piece) = pieces.next() {
        out.push_str(piece);
        if pieces.peek().is_some() {
            if let Some(arg) = args.next() {
                out.push_str(arg);
            }
        }
    }
    out
}

// ============================================================================
// ERROR RECORDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub position: Position,
    pub tag: ErrorTag,
    pub args: Vec<String>,
}

impl ErrorRecord {
    pub fn new<I, S>(position: Position, tag: ErrorTag, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            position,
            tag,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn level(&self) -> u8 {
        self.tag.level()
    }

    pub fn message(&self) -> String {
        render(self.tag.template(), &self.args)
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.message())
    }
}

impl std::error::Error for ErrorRecord {}

impl Diagnostic for ErrorRecord {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.tag.code()))
    }

    fn severity(&self) -> Option<Severity> {
        Some(match self.level() {
            1 | 2 => Severity::Error,
            3 => Severity::Warning,
            _ => Severity::Advice,
        })
    }
}

/// Anything that accumulates error records.
pub trait DiagnosticSink {
    fn report(&mut self, record: ErrorRecord);

    fn report_at<I, S>(&mut self, position: &Position, tag: ErrorTag, args: I)
    where
        Self: Sized,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.report(ErrorRecord::new(position.clone(), tag, args));
    }
}

impl DiagnosticSink for Vec<ErrorRecord> {
    fn report(&mut self, record: ErrorRecord) {
        self.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fills_placeholders_in_order() {
        let text = render(
            ErrorTag::BadModuleFilename.template(),
            &["bar".into(), "foo.yang".into(), "foo".into()],
        );
        assert_eq!(text, "unexpected modulename \"bar\" in foo.yang, should be foo");
    }

    #[test]
    fn test_render_tolerates_missing_args() {
        assert_eq!(render("a {} b {}", &["x".into()]), "a x b ");
    }

    #[test]
    fn test_record_display() {
        let record = ErrorRecord::new(
            Position::new("a.yang", 3),
            ErrorTag::ModuleNotFound,
            ["b"],
        );
        assert_eq!(
            record.to_string(),
            "a.yang:3: module \"b\" not found in search path"
        );
        assert_eq!(record.level(), 1);
    }

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<_> = ErrorTag::ALL.iter().map(|tag| tag.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), ErrorTag::ALL.len());
    }

    #[test]
    fn test_serialized_tag_matches_code() {
        for tag in ErrorTag::ALL {
            let json = serde_json::to_string(tag).unwrap();
            assert_eq!(json, format!("\"{}\"", tag.code()));
        }
    }
}
