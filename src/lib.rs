pub use crate::context::{Context, LoadError, ModuleEntry};
pub use crate::errors::{DiagnosticSink, ErrorRecord, ErrorTag};

pub mod ast;
pub mod cli;
pub mod config;
pub mod context;
pub mod discovery;
pub mod errors;
pub mod grammar;
pub mod module;
pub mod repository;
pub mod syntax;
pub mod validation;

pub mod prelude {
    pub use crate::ast::{Position, Statement, StatementTree, StmtId};
    pub use crate::config::CheckerConfig;
    pub use crate::context::{Context, LoadError};
    pub use crate::errors::{DiagnosticSink, ErrorRecord, ErrorTag};
    pub use crate::grammar::{GrammarTable, Occurrence, Rule};
    pub use crate::module::Module;
    pub use crate::repository::{FileRepository, Format, MemoryRepository, Repository};
}
