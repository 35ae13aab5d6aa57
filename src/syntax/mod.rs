//! Surface-syntax parsers.
//!
//! Both parsers turn document text into the same [`StatementTree`] shape. On failure they
//! record `SYNTAX_ERROR` diagnostics in the sink they are given and return `None`; they never
//! project attributes or check grammar, which is the context's job.

use crate::ast::{Position, StatementTree};
use crate::errors::{DiagnosticSink, ErrorRecord, ErrorTag};
use crate::repository::Format;

pub mod yang;
pub mod yin;

pub use yang::YangParser;
pub use yin::YinParser;

/// Deepest statement nesting a parser accepts. Tree walks downstream are iterative, but the
/// parsers themselves are not, so nesting is capped well below native stack limits.
pub const MAX_DEPTH: usize = 256;

pub trait StatementParser {
    fn parse(&self, sink: &mut dyn DiagnosticSink, reference: &str, text: &str)
        -> Option<StatementTree>;
}

/// The parser for a surface format.
pub fn parser_for(format: Format) -> &'static dyn StatementParser {
    match format {
        Format::Yang => &YangParser,
        Format::Yin => &YinParser,
    }
}

fn syntax_error(sink: &mut dyn DiagnosticSink, reference: &str, line: usize, message: impl Into<String>) {
    sink.report(ErrorRecord::new(
        Position::new(reference, line),
        ErrorTag::SyntaxError,
        [message.into()],
    ));
}
