use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

use mdpad_core::{draft_key, DraftStore, FsDraftStore};

fn seeded_root() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("docs/img")).unwrap();
    fs::write(dir.path().join("README.md"), "# readme\n").unwrap();
    fs::write(
        dir.path().join("docs/guide.md"),
        "# guide\n\n![logo](./img/logo.png)\n\nSee [the readme](../README.md) or [missing](./nope.md).\n",
    )
    .unwrap();
    fs::write(dir.path().join("docs/img/logo.png"), [0x89, b'P', b'N', b'G']).unwrap();
    dir
}

#[test]
fn show_prints_disk_content() {
    let root = seeded_root();
    Command::cargo_bin("mdpad-cli")
        .unwrap()
        .args(["--root", root.path().to_str().unwrap(), "show", "README.md"])
        .assert()
        .success()
        .stdout("# readme\n");
}

#[test]
fn show_prefers_a_pending_draft_and_says_so() {
    let root = seeded_root();
    let drafts_dir = root.path().join(".mdpad/drafts");
    let mut drafts = FsDraftStore::new(&drafts_dir);
    drafts
        .set(&draft_key("README.md"), "# readme (unsaved)\n")
        .unwrap();

    Command::cargo_bin("mdpad-cli")
        .unwrap()
        .args(["--root", root.path().to_str().unwrap(), "show", "README.md"])
        .assert()
        .success()
        .stdout("# readme (unsaved)\n")
        .stderr(predicate::str::contains("unsaved draft content"));
}

#[test]
fn show_resolves_relative_images_into_data_uris() {
    let root = seeded_root();
    Command::cargo_bin("mdpad-cli")
        .unwrap()
        .args([
            "--root",
            root.path().to_str().unwrap(),
            "show",
            "docs/guide.md",
            "--resolve-assets",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("![logo](data:image/png;base64,"));
}

#[test]
fn links_classify_documents_and_dead_ends() {
    let root = seeded_root();
    Command::cargo_bin("mdpad-cli")
        .unwrap()
        .args([
            "--root",
            root.path().to_str().unwrap(),
            "links",
            "docs/guide.md",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("../README.md -> document README.md"))
        .stdout(predicate::str::contains("./nope.md -> unresolved"));
}

#[test]
fn drafts_list_and_clear_round_trip() {
    let root = seeded_root();
    let drafts_dir = root.path().join(".mdpad/drafts");
    let mut drafts = FsDraftStore::new(&drafts_dir);
    drafts.set(&draft_key("README.md"), "body").unwrap();
    drafts.set(&draft_key("docs/guide.md"), "body").unwrap();

    Command::cargo_bin("mdpad-cli")
        .unwrap()
        .args([
            "--root",
            root.path().to_str().unwrap(),
            "drafts",
            "list",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("draft:README.md"))
        .stdout(predicate::str::contains("draft:docs/guide.md"));

    Command::cargo_bin("mdpad-cli")
        .unwrap()
        .args([
            "--root",
            root.path().to_str().unwrap(),
            "drafts",
            "clear",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed 2 draft(s)"));

    assert!(FsDraftStore::new(&drafts_dir).keys().is_empty());
}
