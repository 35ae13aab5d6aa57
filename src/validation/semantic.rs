//! Per-module semantic validation.
//!
//! Validators run after every module is loaded. They may pull further modules in through
//! [`Context::search_module`]; the context validates those as well.

use std::collections::HashSet;
use std::rc::Rc;

use tracing::debug;

use crate::ast::Statement;
use crate::context::{Context, LoadError};
use crate::errors::{DiagnosticSink, ErrorTag};
use crate::module::Module;

pub trait ModuleValidator {
    fn validate(&self, ctx: &mut Context, module: &Rc<Module>);
}

/// Resolves `import` and `include` statements and checks prefixes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkageValidator;

impl ModuleValidator for LinkageValidator {
    fn validate(&self, ctx: &mut Context, module: &Rc<Module>) {
        check_prefixes(ctx, module);

        for import in module.imports() {
            let Some(target) = resolve(ctx, import) else {
                continue;
            };
            if target.is_submodule() {
                ctx.report_at(&import.position, ErrorTag::BadImport, [import.arg()]);
            }
        }

        let owner = owning_module(module);
        for include in module.includes() {
            let Some(target) = resolve(ctx, include) else {
                continue;
            };
            if !target.is_submodule() {
                ctx.report_at(&include.position, ErrorTag::BadInclude, [include.arg()]);
                continue;
            }
            if let Some(belongs_to) = target.belongs_to() {
                if belongs_to.arg() != owner {
                    ctx.report_at(
                        &include.position,
                        ErrorTag::BadBelongsTo,
                        [target.name(), belongs_to.arg(), owner],
                    );
                }
            }
        }
    }
}

/// Looks up the module a linkage statement names; failed loads become placeholders.
fn resolve(ctx: &mut Context, stmt: &Statement) -> Option<Rc<Module>> {
    match ctx.search_module(&stmt.position, stmt.arg()) {
        Ok(module) => Some(module),
        Err(LoadError::Unavailable { .. }) => None,
        Err(error) => {
            debug!(module = stmt.arg(), %error, "dependency unavailable");
            ctx.mark_unavailable(stmt.arg());
            None
        }
    }
}

/// Name of the module a (sub)module's definitions belong to.
fn owning_module(module: &Module) -> &str {
    if module.is_submodule() {
        module.belongs_to().map_or("", Statement::arg)
    } else {
        module.name()
    }
}

fn check_prefixes(ctx: &mut Context, module: &Module) {
    let mut seen: HashSet<&str> = module.own_prefix().into_iter().collect();
    for import in module.imports() {
        let Some(prefix) = import.single("prefix").map(|id| module.statement(id)) else {
            continue;
        };
        if !seen.insert(prefix.arg()) {
            ctx.report_at(&prefix.position, ErrorTag::DuplicatePrefix, [prefix.arg()]);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::context::Context;
    use crate::errors::ErrorTag;
    use crate::repository::{Format, MemoryRepository};

    fn run(repo: MemoryRepository, text: &str) -> Vec<ErrorTag> {
        let mut ctx = Context::new(repo);
        ctx.add_module("m.yang", Format::Yang, text).unwrap();
        ctx.validate();
        ctx.errors().iter().map(|e| e.tag).collect()
    }

    #[test]
    fn test_import_is_loaded() {
        let repo = MemoryRepository::new().with("b", "module b { namespace urn:b; prefix b; }");
        let mut ctx = Context::new(repo);
        ctx.add_module(
            "a.yang",
            Format::Yang,
            "module a { namespace urn:a; prefix a; import b { prefix b; } }",
        )
        .unwrap();
        ctx.validate();
        assert!(ctx.errors().is_empty(), "{:?}", ctx.errors());
        let names: Vec<_> = ctx.module_list().iter().map(|m| m.name().to_string()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_import_is_reported_once() {
        let tags = run(
            MemoryRepository::new(),
            "module m { namespace urn:m; prefix m; import x { prefix x; } import x { prefix y; } }",
        );
        assert_eq!(
            tags,
            vec![ErrorTag::DuplicateStatement, ErrorTag::ModuleNotFound]
        );
    }

    #[test]
    fn test_importing_a_submodule() {
        let repo = MemoryRepository::new()
            .with("s", "submodule s { belongs-to m { prefix m; } }");
        let tags = run(
            repo,
            "module m { namespace urn:m; prefix m; import s { prefix s; } }",
        );
        assert_eq!(tags, vec![ErrorTag::BadImport]);
    }

    #[test]
    fn test_include_checks() {
        let repo = MemoryRepository::new()
            .with("s", "submodule s { belongs-to other { prefix o; } }")
            .with("n", "module n { namespace urn:n; prefix n; }");
        let tags = run(
            repo,
            "module m { namespace urn:m; prefix m; include s; include n; }",
        );
        assert_eq!(tags, vec![ErrorTag::BadBelongsTo, ErrorTag::BadInclude]);
    }

    #[test]
    fn test_duplicate_prefixes() {
        let repo = MemoryRepository::new()
            .with("a", "module a { namespace urn:a; prefix a; }")
            .with("b", "module b { namespace urn:b; prefix b; }");
        let tags = run(
            repo,
            "module m { namespace urn:m; prefix m; import a { prefix m; } import b { prefix m; } }",
        );
        assert_eq!(tags, vec![ErrorTag::DuplicatePrefix, ErrorTag::DuplicatePrefix]);
    }
}
