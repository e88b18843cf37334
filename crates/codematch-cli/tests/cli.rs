use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const OFFLINE_CONFIG: &str = r#"version: 1
database: .codematch/test.db
embedder:
  provider: fake
  model: test
  dims: 128
generator:
  provider: fake
  fake_reply: |
    ```python
    def add(a, b):
        return a + b
    ```
search:
  top_n: 2
  timeout_seconds: 30
"#;

fn codematch(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("codematch").unwrap();
    cmd.current_dir(dir)
        .env_remove("CODEMATCH_CONFIG")
        .env_remove("CODEMATCH_DB")
        .env_remove("CODEMATCH_TOP_N")
        .env_remove("CODEMATCH_LOG");
    cmd
}

fn seeded_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("codematch.yaml"), OFFLINE_CONFIG).unwrap();
    codematch(dir.path()).arg("init").assert().success();
    codematch(dir.path())
        .arg("seed")
        .assert()
        .success()
        .stderr(contains("ingested 8 seeds: 8 new"));
    dir
}

#[test]
fn init_writes_starter_files_once() {
    let dir = TempDir::new().unwrap();

    codematch(dir.path())
        .args(["init", "--gitignore"])
        .assert()
        .success()
        .stderr(contains("created codematch.yaml"))
        .stderr(contains("created samples.yaml"));

    assert!(dir.path().join("question.txt").exists());
    assert!(dir.path().join(".gitignore").exists());
    assert!(dir.path().join(".codematch/code_comparison.db").exists());

    codematch(dir.path())
        .arg("init")
        .assert()
        .success()
        .stderr(contains("note: samples.yaml already exists"));
}

#[test]
fn seeding_twice_adds_nothing() {
    let dir = seeded_workspace();

    codematch(dir.path())
        .arg("seed")
        .assert()
        .success()
        .stderr(contains("0 new, 8 already stored"))
        .stderr(contains("0 test cases added"));

    codematch(dir.path())
        .arg("verify")
        .assert()
        .success()
        .stderr(contains("Stored snippets:   8"))
        .stderr(contains("with embedding:  8"));
}

#[test]
fn search_with_code_file_runs_best_match_tests() {
    let dir = seeded_workspace();
    fs::write(
        dir.path().join("candidate.py"),
        "def add(a, b):\n    return a + b\n",
    )
    .unwrap();
    let report = dir.path().join("out/search.json");

    codematch(dir.path())
        .args(["search", "--code-file", "candidate.py", "--json"])
        .arg(&report)
        .assert()
        .success()
        .stderr(contains("Best match: snippet #1"))
        .stderr(contains("3/3 test cases passed"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["tool"], "codematch");
    assert_eq!(json["best"]["snippet"]["id"], 1);
    assert_eq!(json["matches"][0]["id"], 1);
}

#[test]
fn search_generates_candidate_from_question_file() {
    let dir = seeded_workspace();

    codematch(dir.path())
        .arg("search")
        .assert()
        .success()
        .stderr(contains("Best match: snippet #1"))
        .stderr(contains("Top 2 similar snippets"));
}

#[test]
fn search_without_prompt_file_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("codematch.yaml"), OFFLINE_CONFIG).unwrap();

    codematch(dir.path())
        .args(["search", "--prompt-file", "missing.txt"])
        .assert()
        .code(2)
        .stderr(contains("prompt file missing.txt not found"));
}

#[test]
fn missing_generator_key_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    codematch(dir.path()).arg("init").assert().success();

    codematch(dir.path())
        .env_remove("GEMINI_API_KEY")
        .args(["search", "--prompt", "add two numbers"])
        .assert()
        .code(2)
        .stderr(contains("GEMINI_API_KEY environment variable is not set"));
}

#[test]
fn check_reports_failing_variant() {
    let dir = seeded_workspace();
    fs::write(
        dir.path().join("wrong.py"),
        "def add(a, b):\n    return a + b if a > 0 else 1\n",
    )
    .unwrap();
    let junit = dir.path().join("junit.xml");

    codematch(dir.path())
        .args(["check", "--snippet", "1"])
        .assert()
        .success()
        .stderr(contains("3/3 test cases passed"));

    codematch(dir.path())
        .args(["check", "--snippet", "1", "--code-file", "wrong.py", "--junit"])
        .arg(&junit)
        .assert()
        .code(1)
        .stderr(contains("2/3 test cases passed"));

    let xml = fs::read_to_string(&junit).unwrap();
    assert!(xml.contains(r#"tests="3""#));
    assert!(xml.contains("<failure"));
}

#[test]
fn check_unknown_snippet_fails() {
    let dir = seeded_workspace();

    codematch(dir.path())
        .args(["check", "--snippet", "99"])
        .assert()
        .code(2)
        .stderr(contains("no snippet with id 99"));
}

#[test]
fn db_flag_overrides_config() {
    let dir = seeded_workspace();

    codematch(dir.path())
        .args(["--db", "other.db", "verify"])
        .assert()
        .success()
        .stderr(contains("Stored snippets:   0"));
    assert!(dir.path().join("other.db").exists());
}

#[test]
fn version_prints_package_version() {
    let dir = TempDir::new().unwrap();
    codematch(dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}
