//! # Context
//!
//! A parse session: owns every loaded module, the repository used to find dependencies and
//! the error accumulator.
//!
//! ## Loading pipeline
//! 1. parse by format (YANG or YIN); failure stops here and nothing is registered
//! 2. project attributes onto every statement
//! 3. grammar-check, lenient or canonical
//! 4. register under the declared name unless a module of that name is already loaded
//!
//! `validate()` then checks namespace uniqueness across the loaded set and runs the registered
//! [`ModuleValidator`]s over each module in load order, pulling in dependencies on demand.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, warn};

use crate::ast::Position;
use crate::errors::{DiagnosticSink, ErrorRecord, ErrorTag};
use crate::grammar::GrammarTable;
use crate::module::Module;
use crate::repository::{Format, Repository, RepositoryError};
use crate::syntax::parser_for;
use crate::validation::{AttributeProjector, GrammarValidator, LinkageValidator, ModuleValidator};

/// Default reporting ceiling: everything up to canonical-order warnings.
pub const DEFAULT_MAX_LEVEL: u8 = 3;

// ============================================================================
// LOAD ERRORS
// ============================================================================

/// Why a module could not be loaded. The matching diagnostic is already in the context.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("{reference}: could not be parsed")]
    #[diagnostic(code(yangcheck::load::parse))]
    Parse { reference: String },

    #[error("{reference}: top-level statement `{keyword}` is not a module")]
    #[diagnostic(code(yangcheck::load::not_a_module))]
    NotAModule { reference: String, keyword: String },

    #[error("module `{name}` not found")]
    #[diagnostic(code(yangcheck::load::not_found))]
    NotFound { name: String },

    #[error("{message}")]
    #[diagnostic(code(yangcheck::load::read))]
    Read { message: String },

    #[error("{reference} declares module `{declared}`, expected `{requested}`")]
    #[diagnostic(code(yangcheck::load::bad_filename))]
    BadFilename {
        reference: String,
        declared: String,
        requested: String,
    },

    #[error("module `{name}` failed to load earlier")]
    #[diagnostic(code(yangcheck::load::unavailable))]
    Unavailable { name: String },
}

// ============================================================================
// CONTEXT
// ============================================================================

/// An entry in the name map.
#[derive(Debug, Clone)]
pub enum ModuleEntry {
    /// The name was looked up and failed to load; later lookups fail quietly.
    Placeholder,
    Loaded(Rc<Module>),
}

pub struct Context {
    grammar: Arc<GrammarTable>,
    repository: Box<dyn Repository>,
    modules: HashMap<String, ModuleEntry>,
    module_list: Vec<Rc<Module>>,
    errors: Vec<ErrorRecord>,
    validators: Vec<Box<dyn ModuleValidator>>,
    canonical: bool,
    max_level: u8,
}

impl Context {
    /// A context using the built-in YANG grammar.
    pub fn new(repository: impl Repository + 'static) -> Self {
        Self::with_grammar(repository, Arc::new(GrammarTable::yang()))
    }

    /// A context using `grammar`, with the default linkage validator installed.
    pub fn with_grammar(repository: impl Repository + 'static, grammar: Arc<GrammarTable>) -> Self {
        Self {
            grammar,
            repository: Box::new(repository),
            modules: HashMap::new(),
            module_list: Vec::new(),
            errors: Vec::new(),
            validators: vec![Box::new(LinkageValidator)],
            canonical: false,
            max_level: DEFAULT_MAX_LEVEL,
        }
    }

    pub fn grammar(&self) -> &GrammarTable {
        &self.grammar
    }

    pub fn canonical(&self) -> bool {
        self.canonical
    }

    /// Applies to modules loaded after the call.
    pub fn set_canonical(&mut self, canonical: bool) -> &mut Self {
        self.canonical = canonical;
        self
    }

    pub fn max_level(&self) -> u8 {
        self.max_level
    }

    pub fn set_max_level(&mut self, level: u8) -> &mut Self {
        self.max_level = level;
        self
    }

    pub fn add_validator(&mut self, validator: Box<dyn ModuleValidator>) -> &mut Self {
        self.validators.push(validator);
        self
    }

    /// Removes every registered validator, including the default one.
    pub fn clear_validators(&mut self) -> &mut Self {
        self.validators.clear();
        self
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    /// Parses, projects and grammar-checks `text`, then registers the module.
    ///
    /// If a module with the same name is already loaded, the new one is returned but not
    /// registered.
    pub fn add_module(&mut self, reference: &str, format: Format, text: &str) -> Result<Rc<Module>, LoadError> {
        debug!(reference, ?format, "loading module");
        let Some(mut tree) = parser_for(format).parse(&mut self.errors, reference, text) else {
            return Err(LoadError::Parse {
                reference: reference.to_string(),
            });
        };

        let grammar = Arc::clone(&self.grammar);
        let linkage = AttributeProjector::new(&grammar).project(&mut tree, &mut self.errors);
        GrammarValidator::new(&grammar, self.canonical).validate(&tree, &mut self.errors);

        let keyword = &tree[tree.root()].keyword;
        if !grammar.allows_top_level(keyword) {
            return Err(LoadError::NotAModule {
                reference: reference.to_string(),
                keyword: keyword.clone(),
            });
        }

        let module = Rc::new(Module::new(tree, linkage, reference.to_string(), format));
        let name = module.name().to_string();
        match self.modules.get(&name) {
            Some(ModuleEntry::Loaded(_)) => {
                debug!(module = %name, reference, "already loaded, keeping the first");
            }
            _ => {
                self.modules
                    .insert(name, ModuleEntry::Loaded(Rc::clone(&module)));
                self.module_list.push(Rc::clone(&module));
            }
        }
        Ok(module)
    }

    /// Removes `module` from the name map and the load order. Unregistered modules are ignored.
    pub fn del_module(&mut self, module: &Rc<Module>) {
        if let Some(ModuleEntry::Loaded(registered)) = self.modules.get(module.name()) {
            if Rc::ptr_eq(registered, module) {
                self.modules.remove(module.name());
            }
        }
        self.module_list.retain(|m| !Rc::ptr_eq(m, module));
    }

    /// Returns the module called `name`, loading it from the repository if needed.
    ///
    /// Lookup failures are recorded at `position`.
    pub fn search_module(&mut self, position: &Position, name: &str) -> Result<Rc<Module>, LoadError> {
        match self.modules.get(name) {
            Some(ModuleEntry::Loaded(module)) => return Ok(Rc::clone(module)),
            Some(ModuleEntry::Placeholder) => {
                return Err(LoadError::Unavailable {
                    name: name.to_string(),
                })
            }
            None => {}
        }

        let source = match self.repository.get_module(name) {
            Ok(source) => source,
            Err(RepositoryError::NotFound { .. }) => {
                self.report_at(position, ErrorTag::ModuleNotFound, [name]);
                return Err(LoadError::NotFound {
                    name: name.to_string(),
                });
            }
            Err(error @ RepositoryError::Read { .. }) => {
                let message = error.to_string();
                warn!(module = name, %message, "read failure");
                self.report_at(position, ErrorTag::ReadError, [message.clone()]);
                return Err(LoadError::Read { message });
            }
        };

        let module = self.add_module(&source.reference, source.format, &source.text)?;
        if module.name() != name {
            let declared = module.name().to_string();
            let position = module.position().clone();
            self.report_at(
                &position,
                ErrorTag::BadModuleFilename,
                [declared.clone(), source.reference.clone(), name.to_string()],
            );
            self.del_module(&module);
            return Err(LoadError::BadFilename {
                reference: source.reference,
                declared,
                requested: name.to_string(),
            });
        }
        Ok(module)
    }

    /// Records that `name` failed to load so later lookups fail without a new diagnostic.
    pub fn mark_unavailable(&mut self, name: &str) {
        self.modules
            .entry(name.to_string())
            .or_insert(ModuleEntry::Placeholder);
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Cross-module namespace check, then per-module validators in load order.
    pub fn validate(&mut self) {
        let mut owners: HashMap<&str, &str> = HashMap::new();
        let mut duplicates = Vec::new();
        for module in &self.module_list {
            let Some(namespace) = module.namespace() else {
                continue;
            };
            match owners.get(namespace.arg()) {
                Some(owner) => duplicates.push(ErrorRecord::new(
                    namespace.position.clone(),
                    ErrorTag::DuplicateNamespace,
                    [namespace.arg(), *owner],
                )),
                None => {
                    owners.insert(namespace.arg(), module.name());
                }
            }
        }
        self.errors.extend(duplicates);

        let validators = std::mem::take(&mut self.validators);
        // dependencies appended while iterating are validated too
        let mut index = 0;
        while index < self.module_list.len() {
            let module = Rc::clone(&self.module_list[index]);
            debug!(module = module.name(), "validating");
            for validator in &validators {
                validator.validate(self, &module);
            }
            index += 1;
        }
        self.validators = validators;
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn get_module(&self, name: &str) -> Option<Rc<Module>> {
        match self.modules.get(name)? {
            ModuleEntry::Loaded(module) => Some(Rc::clone(module)),
            ModuleEntry::Placeholder => None,
        }
    }

    pub fn entry(&self, name: &str) -> Option<&ModuleEntry> {
        self.modules.get(name)
    }

    /// Loaded modules in load order.
    pub fn module_list(&self) -> &[Rc<Module>] {
        &self.module_list
    }

    /// Every record, in the order it was added.
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// Records at or below the reporting ceiling.
    pub fn reported(&self) -> impl Iterator<Item = &ErrorRecord> + '_ {
        self.errors
            .iter()
            .filter(move |record| record.level() <= self.max_level)
    }

    pub fn has_reportable(&self) -> bool {
        self.reported().next().is_some()
    }
}

impl DiagnosticSink for Context {
    fn report(&mut self, record: ErrorRecord) {
        self.errors.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;

    const A: &str = "module a { namespace urn:a; prefix a; }";

    #[test]
    fn test_add_module_registers_once() {
        let mut ctx = Context::new(MemoryRepository::new());
        let first = ctx.add_module("a.yang", Format::Yang, A).unwrap();
        let second = ctx.add_module("a-copy.yang", Format::Yang, A).unwrap();
        assert_eq!(ctx.module_list().len(), 1);
        assert!(Rc::ptr_eq(&ctx.get_module("a").unwrap(), &first));
        assert!(!Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_parse_failure_is_not_registered() {
        let mut ctx = Context::new(MemoryRepository::new());
        let result = ctx.add_module("bad.yang", Format::Yang, "module a {");
        assert!(matches!(result, Err(LoadError::Parse { .. })));
        assert!(ctx.module_list().is_empty());
        assert_eq!(ctx.errors()[0].tag, ErrorTag::SyntaxError);
    }

    #[test]
    fn test_non_module_root_is_rejected() {
        let mut ctx = Context::new(MemoryRepository::new());
        let result = ctx.add_module("c.yang", Format::Yang, "container c;");
        assert!(matches!(result, Err(LoadError::NotAModule { .. })));
        assert!(ctx.module_list().is_empty());
        assert_eq!(ctx.errors()[0].tag, ErrorTag::BadTopLevel);
    }

    #[test]
    fn test_placeholder_is_replaced_by_a_real_load() {
        let mut ctx = Context::new(MemoryRepository::new());
        ctx.mark_unavailable("a");
        assert!(matches!(ctx.entry("a"), Some(ModuleEntry::Placeholder)));
        ctx.add_module("a.yang", Format::Yang, A).unwrap();
        assert!(ctx.get_module("a").is_some());
    }

    #[test]
    fn test_placeholder_lookup_is_quiet() {
        let mut ctx = Context::new(MemoryRepository::new());
        ctx.mark_unavailable("x");
        let result = ctx.search_module(&Position::new("m.yang", 1), "x");
        assert!(matches!(result, Err(LoadError::Unavailable { .. })));
        assert!(ctx.errors().is_empty());
    }

    #[test]
    fn test_del_module() {
        let mut ctx = Context::new(MemoryRepository::new());
        let module = ctx.add_module("a.yang", Format::Yang, A).unwrap();
        ctx.del_module(&module);
        assert!(ctx.module_list().is_empty());
        assert!(ctx.entry("a").is_none());
    }

    #[test]
    fn test_reporting_ceiling() {
        let mut ctx = Context::new(MemoryRepository::new());
        ctx.set_canonical(true);
        ctx.add_module(
            "a.yang",
            Format::Yang,
            "module a { leaf x { type string; } namespace urn:a; prefix a; }",
        )
        .unwrap();
        assert!(ctx.errors().iter().all(|e| e.tag == ErrorTag::UnexpectedKeywordCanonical));
        assert!(ctx.has_reportable());
        ctx.set_max_level(2);
        assert!(!ctx.has_reportable());
    }
}
