use std::fs;

use minijinja::context;
use pretty_assertions::assert_eq;

use crate::utils::{move_file, render_strict, TransientFile};

#[test]
fn transient_file_lifecycle() {
    let dir = tempfile::tempdir().unwrap();

    let path = {
        let file = TransientFile::create(dir.path(), "kind-config", "kind: Cluster\n").unwrap();
        let name = file.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("kind-config"));
        assert!(name.ends_with(".yaml"));
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "kind: Cluster\n");
        file.path().to_path_buf()
    };

    assert!(!path.exists());
}

#[test]
/// Someone else deleting the file first is not a problem
fn transient_file_already_removed() {
    let dir = tempfile::tempdir().unwrap();
    let file = TransientFile::create(dir.path(), "gone", "").unwrap();

    fs::remove_file(file.path()).unwrap();
    drop(file);
}

#[test]
fn strict_rendering() {
    let rendered = render_strict("host: {{ host }}", context! { host => "a.local" }).unwrap();
    assert_eq!(rendered, "host: a.local");

    assert!(render_strict("host: {{ host }}", context! {}).is_err());
}

#[test]
fn move_into_place() {
    let dir = tempfile::tempdir().unwrap();
    let from = dir.path().join("download");
    let to = dir.path().join("installed");
    fs::write(&from, "bin").unwrap();

    move_file(&from, &to).unwrap();

    assert!(!from.exists());
    assert_eq!(fs::read_to_string(&to).unwrap(), "bin");
}
