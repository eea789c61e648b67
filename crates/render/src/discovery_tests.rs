// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

#[test]
fn discovers_files_matching_patterns() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "intro.md", "intro");
    write(dir.path(), "guide.md", "guide");
    write(dir.path(), "notes.txt", "notes");

    let files =
        discover_category_files(dir.path(), &["*.md".to_string()]).unwrap();
    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["guide.md", "intro.md"]);
}

#[test]
fn template_variant_is_hidden_behind_plain_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "intro.md", "plain");
    write(dir.path(), "intro.md.hbs", "template");

    let files = discover_category_files(dir.path(), &["intro".to_string()]).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "intro.md");
    assert!(files[0].path.to_string_lossy().ends_with("intro.md"));
}

#[test]
fn template_only_file_is_discovered_with_clean_name() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "status.md.hbs", "{{state}}");

    let files = discover_category_files(dir.path(), &["status".to_string()]).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "status.md");
    assert!(is_template_path(&files[0].path));
}

#[test]
fn nested_patterns_discover_subdirectories() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "guides/a.md", "a");
    write(dir.path(), "guides/b.md", "b");

    let files =
        discover_category_files(dir.path(), &["guides/*.md".to_string()]).unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].name, "guides/a.md");
}

#[test]
fn rejects_template_extension_in_pattern() {
    let dir = TempDir::new().unwrap();
    let result = discover_category_files(dir.path(), &["*.hbs".to_string()]);
    assert!(matches!(
        result,
        Err(DiscoveryError::TemplateExtensionInPattern { .. })
    ));
}

#[test]
fn missing_directory_errors() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent");
    assert!(matches!(
        discover_category_files(&missing, &["*.md".to_string()]),
        Err(DiscoveryError::NotFound(_))
    ));
}

#[test]
fn relative_directory_errors() {
    assert!(matches!(
        discover_category_files(Path::new("relative/dir"), &[]),
        Err(DiscoveryError::NotAbsolute(_))
    ));
}

#[test]
fn resolve_tries_extension_variants_in_order() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "exact", "x");
    write(dir.path(), "doc.md", "x");
    write(dir.path(), "tpl.hbs", "x");
    write(dir.path(), "combo.md.hbs", "x");

    assert_eq!(
        resolve_file_with_extensions(&dir.path().join("exact")),
        Some(dir.path().join("exact"))
    );
    assert_eq!(
        resolve_file_with_extensions(&dir.path().join("doc")),
        Some(dir.path().join("doc.md"))
    );
    assert_eq!(
        resolve_file_with_extensions(&dir.path().join("tpl")),
        Some(dir.path().join("tpl.hbs"))
    );
    assert_eq!(
        resolve_file_with_extensions(&dir.path().join("combo")),
        Some(dir.path().join("combo.md.hbs"))
    );
    assert_eq!(resolve_file_with_extensions(&dir.path().join("absent")), None);
}

#[test]
fn display_name_strips_template_extensions() {
    assert_eq!(display_name(Path::new("a/b.md.hbs")), "a/b.md");
    assert_eq!(display_name(Path::new("plain.md")), "plain.md");
    assert_eq!(display_name(Path::new("raw.mustache")), "raw");
}
