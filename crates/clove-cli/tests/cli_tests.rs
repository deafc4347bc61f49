//! CLI integration tests
//!
//! Everything here runs without a JVM: projects use copy mode, and test
//! runs only cover the "no test namespaces" path.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn clove_cmd() -> Command {
    let mut cmd = Command::cargo_bin("clove").unwrap();
    for var in ["CLOVE_LOG", "CLOVE_AOT", "CLOVE_REFLECTION_WARNINGS", "CLOVE_JAVA"] {
        cmd.env_remove(var);
    }
    cmd
}

fn write(root: &Path, path: &str, content: &str) {
    let path = root.join(path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn sample_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "clove.toml", "[project]\nname = \"sample-app\"\n");
    write(
        temp.path(),
        "src/main/clojure/sample_app/core.clj",
        "(ns sample-app.core)\n",
    );
    write(
        temp.path(),
        "src/main/clojure/sample_app/valid_QMARK_.clj",
        "(ns sample-app.valid?)\n",
    );
    temp
}

mod help_messages {
    use super::*;

    #[test]
    fn test_main_help_shows_all_commands() {
        clove_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("compile"))
            .stdout(predicate::str::contains("test"))
            .stdout(predicate::str::contains("check"))
            .stdout(predicate::str::contains("namespaces"))
            .stdout(predicate::str::contains("munge"));
    }

    #[test]
    fn test_main_help_shows_environment_variables() {
        clove_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("ENVIRONMENT VARIABLES"))
            .stdout(predicate::str::contains("CLOVE_LOG"));
    }
}

mod names {
    use super::*;

    #[test]
    fn test_munge() {
        clove_cmd()
            .args(["munge", "sample-app.valid?"])
            .assert()
            .success()
            .stdout("sample_app.valid_QMARK_\n");
    }

    #[test]
    fn test_demunge() {
        clove_cmd()
            .args(["demunge", "__GT_arrow"])
            .assert()
            .success()
            .stdout("->arrow\n");
    }
}

mod namespaces {
    use super::*;

    #[test]
    fn test_lists_namespaces_in_order() {
        let project = sample_project();

        clove_cmd()
            .arg("-C")
            .arg(project.path())
            .arg("namespaces")
            .assert()
            .success()
            .stdout("sample-app.core\nsample-app.valid?\n");
    }

    #[test]
    fn test_json_output() {
        let project = sample_project();

        let output = clove_cmd()
            .arg("-C")
            .arg(project.path())
            .args(["namespaces", "--json"])
            .output()
            .unwrap();

        assert!(output.status.success());
        let names: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(names, vec!["sample-app.core", "sample-app.valid?"]);
    }

    #[test]
    fn test_unknown_source_set_fails() {
        let project = sample_project();

        clove_cmd()
            .arg("-C")
            .arg(project.path())
            .args(["namespaces", "-s", "bench"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("bench"));
    }
}

mod compile {
    use super::*;

    #[test]
    fn test_copy_mode_copies_sources() {
        let project = sample_project();

        clove_cmd()
            .arg("-C")
            .arg(project.path())
            .args(["compile", "-s", "main"])
            .assert()
            .success()
            .stdout(predicate::str::contains("main: copied 2 source files"));

        assert!(project
            .path()
            .join("build/classes/main/sample_app/core.clj")
            .exists());
    }

    #[test]
    fn test_second_run_is_up_to_date() {
        let project = sample_project();

        clove_cmd()
            .arg("-C")
            .arg(project.path())
            .args(["compile", "-s", "main"])
            .assert()
            .success();

        clove_cmd()
            .arg("-C")
            .arg(project.path())
            .args(["compile", "-s", "main"])
            .assert()
            .success()
            .stdout("main: up to date\n");
    }

    #[test]
    fn test_json_outcome() {
        let project = sample_project();

        let output = clove_cmd()
            .arg("-C")
            .arg(project.path())
            .args(["compile", "--json"])
            .output()
            .unwrap();

        assert!(output.status.success());
        let outcomes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(outcomes[0]["source_set"], "main");
        assert_eq!(outcomes[0]["namespaces"][0], "sample-app.core");
        assert_eq!(outcomes[1]["source_set"], "test");
    }

    #[test]
    fn test_unknown_source_set_fails() {
        let project = sample_project();

        clove_cmd()
            .arg("-C")
            .arg(project.path())
            .args(["compile", "-s", "bench"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown source set 'bench'"));
    }

    #[test]
    fn test_invalid_config_fails() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "clove.toml", "[compile]\nunknown-key = 1\n");

        clove_cmd()
            .arg("-C")
            .arg(temp.path())
            .arg("compile")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to load configuration"));
    }
}

mod test_and_check {
    use super::*;

    #[test]
    fn test_without_test_namespaces_is_skipped() {
        let project = sample_project();

        clove_cmd()
            .arg("-C")
            .arg(project.path())
            .arg("test")
            .assert()
            .success()
            .stdout("test: no test namespaces\n");
    }

    #[test]
    fn test_check_compiles_then_tests() {
        let project = sample_project();

        clove_cmd()
            .arg("-C")
            .arg(project.path())
            .arg("check")
            .assert()
            .success()
            .stdout(predicate::str::contains("main: copied 2 source files"))
            .stdout(predicate::str::contains("test: no test namespaces"))
            .stdout(predicate::str::contains("Check succeeded"));
    }
}
