//! Hygiene — enforces coding standards at test time
//!
//! Scans the session crate's production sources for antipatterns. Each has a
//! budget of zero: session code runs inside the browser tab, where a panic
//! takes the whole portal down with it.

use std::fs;
use std::path::Path;

struct SourceFile {
    path: String,
    content: String,
}

/// Production `.rs` files under `src/`, excluding `*_test.rs` and the
/// test-double module.
fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            let path_str = path.to_string_lossy().to_string();
            if path_str.ends_with("_test.rs") || path_str.ends_with("testing.rs") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(&path) {
                out.push(SourceFile { path: path_str, content });
            }
        }
    }
}

fn hits(pattern: &str) -> Vec<(String, usize)> {
    source_files()
        .into_iter()
        .filter_map(|file| {
            let count = file.content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then_some((file.path, count))
        })
        .collect()
}

fn assert_absent(pattern: &str) {
    let found = hits(pattern);
    let count: usize = found.iter().map(|(_, c)| c).sum();
    let listing = found.iter().map(|(p, c)| format!("  {p}: {c}")).collect::<Vec<_>>().join("\n");
    assert!(count == 0, "`{pattern}` found {count} time(s) in production code:\n{listing}");
}

#[test]
fn sources_are_scanned() {
    assert!(source_files().iter().any(|f| f.path.ends_with("manager.rs")));
}

#[test]
fn no_unwrap() {
    assert_absent(".unwrap()");
}

#[test]
fn no_expect() {
    assert_absent(".expect(");
}

#[test]
fn no_panic() {
    assert_absent("panic!(");
}

#[test]
fn no_unreachable() {
    assert_absent("unreachable!(");
}

#[test]
fn no_todo() {
    assert_absent("todo!(");
}

#[test]
fn no_unimplemented() {
    assert_absent("unimplemented!(");
}

#[test]
fn no_silent_discard() {
    assert_absent("let _ =");
}

#[test]
fn no_dot_ok() {
    assert_absent(".ok()");
}

#[test]
fn no_allow_dead_code() {
    assert_absent("#[allow(dead_code)]");
}
