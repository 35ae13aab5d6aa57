use std::fs;

use yangcheck::repository::{FileRepository, Format, Repository, RepositoryError};

#[test]
fn probes_yang_then_yin_then_bare_name() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.yang"), "module a { }").unwrap();
    fs::write(dir.path().join("a.yin"), "<module name=\"a\"/>").unwrap();
    fs::write(dir.path().join("b.yin"), "<module name=\"b\"/>").unwrap();
    fs::write(dir.path().join("c"), "  <module name=\"c\"/>").unwrap();

    let repo = FileRepository::from_dirs([dir.path()]);

    let a = repo.get_module("a").unwrap();
    assert_eq!(a.format, Format::Yang);
    assert!(a.reference.ends_with("a.yang"));

    assert_eq!(repo.get_module("b").unwrap().format, Format::Yin);

    let c = repo.get_module("c").unwrap();
    assert_eq!(c.format, Format::Yin);
    assert!(c.reference.ends_with('c'));
}

#[test]
fn each_extension_is_tried_across_all_directories_first() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    fs::write(first.path().join("m.yin"), "<module name=\"m\"/>").unwrap();
    fs::write(second.path().join("m.yang"), "module m { }").unwrap();

    let repo = FileRepository::from_dirs([first.path(), second.path()]);
    let source = repo.get_module("m").unwrap();
    assert_eq!(source.format, Format::Yang);
    assert!(source.reference.starts_with(&second.path().display().to_string()));
}

#[test]
fn earlier_directory_wins() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    fs::write(first.path().join("m.yang"), "module m { description first; }").unwrap();
    fs::write(second.path().join("m.yang"), "module m { description second; }").unwrap();

    let repo = FileRepository::from_dirs([first.path(), second.path()]);
    assert!(repo.get_module("m").unwrap().text.contains("first"));
}

#[test]
fn missing_module_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("d.yang")).unwrap();

    let repo = FileRepository::from_dirs([dir.path()]);
    assert!(matches!(
        repo.get_module("d"),
        Err(RepositoryError::NotFound { .. })
    ));
}

#[test]
fn unreadable_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.yang"), [0xff, 0xfe, 0x00]).unwrap();

    let repo = FileRepository::from_dirs([dir.path()]);
    match repo.get_module("bad") {
        Err(RepositoryError::Read { path, .. }) => assert!(path.ends_with("bad.yang")),
        other => panic!("expected a read error, got {other:?}"),
    }
}
