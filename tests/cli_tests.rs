//! Integration tests for CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cli() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("codebase-flattener"));
    cmd.env_remove("GITHUB_TOKEN").env_remove("RUST_LOG");
    cmd
}

/// A small project plus a separate working directory for outputs and cache.
fn fixture() -> (TempDir, TempDir) {
    let project = TempDir::new().expect("project");
    let root = project.path();
    fs::create_dir_all(root.join("src/util")).expect("mkdir");
    fs::create_dir_all(root.join("node_modules/pkg")).expect("mkdir");
    fs::write(root.join("README.md"), "# Demo\n").expect("write");
    fs::write(root.join("src/main.rs"), "fn main() {}\n").expect("write");
    fs::write(root.join("src/util/strings.rs"), "pub fn trim() {}\n").expect("write");
    fs::write(root.join("logo.png"), [0x89u8, 0x50, 0x4e, 0x47]).expect("write");
    fs::write(root.join("node_modules/pkg/index.js"), "module.exports = 1;\n").expect("write");
    let work = TempDir::new().expect("work");
    (project, work)
}

fn repo_args(project: &Path, work: &Path) -> Vec<String> {
    vec![
        "--path".to_string(),
        project.display().to_string(),
        "--cache-file".to_string(),
        work.join("cache.json").display().to_string(),
    ]
}

#[test]
fn test_cli_version() {
    cli().arg("--version").assert().success().stdout(predicate::str::contains("codebase-flattener"));
}

#[test]
fn test_cli_help_lists_subcommands() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("tree"))
        .stdout(predicate::str::contains("overview"))
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("prompt"))
        .stdout(predicate::str::contains("cache"));
}

#[test]
fn test_tree_requires_a_repository() {
    let work = TempDir::new().expect("work");
    cli()
        .current_dir(work.path())
        .args(["tree", "--no-cache"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a repository URL"));
}

#[test]
fn test_rejects_both_path_and_repo() {
    let work = TempDir::new().expect("work");
    cli()
        .current_dir(work.path())
        .args(["tree", "--path", ".", "--repo", "https://github.com/test/test", "--no-cache"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot specify both --path and --repo"));
}

#[test]
fn test_tree_shows_markers_and_hides_ignored_folders() {
    let (project, work) = fixture();
    cli()
        .current_dir(work.path())
        .arg("tree")
        .args(repo_args(project.path(), work.path()))
        .args(["--exclude-ext", "png", "--deselect", "src/util"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[x] README.md"))
        .stdout(predicate::str::contains("[~] src/"))
        .stdout(predicate::str::contains("[ ] util/"))
        .stdout(predicate::str::contains("Selected: 2 of 3 files"))
        .stdout(predicate::str::contains("logo.png").not())
        .stdout(predicate::str::contains("index.js").not());
}

#[test]
fn test_overview_keeps_excluded_extensions() {
    let (project, work) = fixture();
    cli()
        .current_dir(work.path())
        .arg("overview")
        .args(repo_args(project.path(), work.path()))
        .args(["--exclude-ext", "png"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Repository Overview:"))
        .stdout(predicate::str::contains("Ignored folders found: node_modules/"))
        .stdout(predicate::str::contains("- logo.png"))
        .stdout(predicate::str::contains("  - strings.rs"));
}

#[test]
fn test_fetch_then_tree_marks_cached_files() {
    let (project, work) = fixture();
    cli()
        .current_dir(work.path())
        .arg("fetch")
        .args(repo_args(project.path(), work.path()))
        .args(["--only", "src"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fetched 2 files"));

    assert!(work.path().join("cache.json").exists());

    cli()
        .current_dir(work.path())
        .arg("tree")
        .args(repo_args(project.path(), work.path()))
        .assert()
        .success()
        .stdout(predicate::str::contains("main.rs (13 B) cached"));

    cli()
        .current_dir(work.path())
        .args(["cache", "list", "--cache-file"])
        .arg(work.path().join("cache.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("2 files"));
}

#[test]
fn test_prompt_requires_query() {
    let (project, work) = fixture();
    cli()
        .current_dir(work.path())
        .arg("prompt")
        .args(repo_args(project.path(), work.path()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a query/request"));
}

#[test]
fn test_prompt_to_stdout() {
    let (project, work) = fixture();
    cli()
        .current_dir(work.path())
        .arg("prompt")
        .args(repo_args(project.path(), work.path()))
        .args(["--only", "README.md", "--query", "Explain the readme", "--stdout"])
        .args(["--instructions", "Answer briefly"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("User Query:\nExplain the readme\n"))
        .stdout(predicate::str::contains("File: README.md\n```\n# Demo\n"))
        .stdout(predicate::str::contains("File: src/main.rs").not())
        .stdout(predicate::str::contains("Custom Instructions:\nAnswer briefly"))
        .stdout(predicate::str::contains("Repeating User Query:\nExplain the readme"));
}

#[test]
fn test_prompt_writes_named_file() {
    let (project, work) = fixture();
    let out_dir = work.path().join("out");
    cli()
        .current_dir(work.path())
        .arg("prompt")
        .args(repo_args(project.path(), work.path()))
        .args(["--query", "Add more tests", "--output-dir"])
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Files included:   4"));

    let names: Vec<String> = fs::read_dir(&out_dir)
        .expect("out dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].contains("-add-more-tests-"), "unexpected name {}", names[0]);
    assert!(names[0].ends_with(".txt"));
}

#[test]
fn test_unknown_selection_path_fails() {
    let (project, work) = fixture();
    cli()
        .current_dir(work.path())
        .arg("tree")
        .args(repo_args(project.path(), work.path()))
        .args(["--select", "docs/missing.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path not found in repository tree: docs/missing.md"));
}

#[test]
fn test_cache_clear() {
    let (project, work) = fixture();
    cli()
        .current_dir(work.path())
        .arg("fetch")
        .args(repo_args(project.path(), work.path()))
        .assert()
        .success();

    cli()
        .current_dir(work.path())
        .args(["cache", "clear", "--cache-file"])
        .arg(work.path().join("cache.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 4 entries"));
}
