use std::rc::Rc;

use yangcheck::prelude::*;
use yangcheck::repository::RepositoryError;

const A: &str = "module a { namespace urn:a; prefix a; }";

fn tags(ctx: &Context) -> Vec<ErrorTag> {
    ctx.errors().iter().map(|e| e.tag).collect()
}

/// Fails every lookup with a read error.
struct UnreadableRepository;

impl Repository for UnreadableRepository {
    fn get_module(&self, name: &str) -> Result<yangcheck::repository::ModuleSource, RepositoryError> {
        Err(RepositoryError::Read {
            path: format!("{name}.yang"),
            message: "permission denied".to_string(),
        })
    }
}

#[test]
fn re_adding_a_module_keeps_the_first() {
    let mut ctx = Context::new(MemoryRepository::new());
    let first = ctx.add_module("a.yang", Format::Yang, A).unwrap();
    ctx.add_module("a.yang", Format::Yang, A).unwrap();

    assert_eq!(ctx.module_list().len(), 1);
    assert!(Rc::ptr_eq(&ctx.module_list()[0], &first));
    assert!(ctx.errors().is_empty());
}

#[test]
fn duplicate_namespace_is_attributed_to_first_owner() {
    let mut ctx = Context::new(MemoryRepository::new());
    ctx.add_module("a.yang", Format::Yang, "module a { namespace urn:x; prefix a; }")
        .unwrap();
    ctx.add_module("b.yang", Format::Yang, "module b {\n  namespace urn:x;\n  prefix b;\n}")
        .unwrap();
    ctx.validate();

    assert_eq!(tags(&ctx), vec![ErrorTag::DuplicateNamespace]);
    let record = &ctx.errors()[0];
    assert_eq!(record.args, vec!["urn:x", "a"]);
    assert_eq!(record.position, Position::new("b.yang", 2));
}

#[test]
fn imports_are_loaded_from_the_repository() {
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
    let b = ctx.get_module("b").expect("b was loaded");
    assert_eq!(b.reference(), "b.yang");
    let found = ctx.search_module(&Position::new("a.yang", 1), "b").unwrap();
    assert!(Rc::ptr_eq(&found, &b));
}

#[test]
fn misnamed_file_is_rejected() {
    let repo = MemoryRepository::new().with("b", "module c { namespace urn:c; prefix c; }");
    let mut ctx = Context::new(repo);
    let result = ctx.search_module(&Position::new("x.yang", 3), "b");

    assert!(matches!(result, Err(LoadError::BadFilename { .. })));
    assert_eq!(tags(&ctx), vec![ErrorTag::BadModuleFilename]);
    assert_eq!(ctx.errors()[0].args, vec!["c", "b.yang", "b"]);
    assert!(ctx.get_module("b").is_none());
    assert!(ctx.get_module("c").is_none());
    assert!(ctx.module_list().is_empty());
}

#[test]
fn misnamed_file_does_not_evict_an_existing_module() {
    let repo = MemoryRepository::new().with("b", "module c { namespace urn:c; prefix c; }");
    let mut ctx = Context::new(repo);
    let c = ctx
        .add_module("c.yang", Format::Yang, "module c { namespace urn:c; prefix c; }")
        .unwrap();
    assert!(ctx.search_module(&Position::new("x.yang", 1), "b").is_err());

    assert!(Rc::ptr_eq(&ctx.get_module("c").unwrap(), &c));
    assert_eq!(ctx.module_list().len(), 1);
}

#[test]
fn missing_module_is_reported_at_the_lookup_position() {
    let mut ctx = Context::new(MemoryRepository::new());
    let result = ctx.search_module(&Position::new("a.yang", 7), "nowhere");

    assert!(matches!(result, Err(LoadError::NotFound { .. })));
    assert_eq!(tags(&ctx), vec![ErrorTag::ModuleNotFound]);
    assert_eq!(ctx.errors()[0].position, Position::new("a.yang", 7));
}

#[test]
fn read_failure_is_distinct_from_not_found() {
    let mut ctx = Context::new(UnreadableRepository);
    let result = ctx.search_module(&Position::new("a.yang", 1), "b");

    assert!(matches!(result, Err(LoadError::Read { .. })));
    assert_eq!(tags(&ctx), vec![ErrorTag::ReadError]);
    assert!(ctx.errors()[0].args[0].contains("permission denied"));
}

#[test]
fn failed_dependency_is_reported_once() {
    let mut ctx = Context::new(MemoryRepository::new());
    ctx.add_module(
        "a.yang",
        Format::Yang,
        "module a { namespace urn:a; prefix a; import gone { prefix g; } }",
    )
    .unwrap();
    ctx.add_module(
        "b.yang",
        Format::Yang,
        "module b { namespace urn:b; prefix b; import gone { prefix g; } }",
    )
    .unwrap();
    ctx.validate();

    assert_eq!(tags(&ctx), vec![ErrorTag::ModuleNotFound]);
    assert!(matches!(ctx.entry("gone"), Some(yangcheck::ModuleEntry::Placeholder)));
}

#[test]
fn yin_modules_load_like_yang_modules() {
    let mut ctx = Context::new(MemoryRepository::new());
    let module = ctx
        .add_module(
            "y.yin",
            Format::Yin,
            r#"<module name="y" xmlns="urn:ietf:params:xml:ns:yang:yin:1">
  <namespace uri="urn:y"/>
  <prefix value="y"/>
  <leaf name="x"><type name="string"/></leaf>
</module>"#,
        )
        .unwrap();

    assert!(ctx.errors().is_empty(), "{:?}", ctx.errors());
    assert_eq!(module.name(), "y");
    assert_eq!(module.namespace().map(|ns| ns.arg()), Some("urn:y"));
    assert_eq!(module.children().count(), 1);
}
