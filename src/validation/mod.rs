//! Validation passes over statement trees.
//!
//! - [`projection`]: fills typed attribute slots and flags duplicate arguments.
//! - [`grammar`]: checks substatement keywords, cardinality and (optionally) canonical order.
//! - [`semantic`]: per-module checks that may pull in dependencies through the context.
//!
//! All passes report into a [`DiagnosticSink`] and keep going after a violation.

pub mod grammar;
pub mod projection;
pub mod semantic;

pub use crate::errors::DiagnosticSink;
pub use grammar::GrammarValidator;
pub use projection::{AttributeProjector, Linkage};
pub use semantic::{LinkageValidator, ModuleValidator};
