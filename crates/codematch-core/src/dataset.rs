use crate::literal::Literal;
use crate::model::{SnippetSeed, TestCaseSeed, DEFAULT_LANGUAGE};
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

/// Reads a list of seeds from YAML, or JSON when the file ends in `.json`.
pub fn load_seeds(path: &Path) -> anyhow::Result<Vec<SnippetSeed>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read seeds {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let seeds: Vec<SnippetSeed> = if is_json {
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse JSON seeds {}", path.display()))?
    } else {
        serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse YAML seeds {}", path.display()))?
    };
    Ok(seeds)
}

#[derive(Debug, Deserialize)]
struct InputOutput {
    #[serde(default)]
    inputs: Vec<serde_json::Value>,
    #[serde(default)]
    outputs: Vec<serde_json::Value>,
}

/// Loads a competitive-programming problem directory holding
/// `solutions.json` (array of source strings), `input_output.json`
/// (`{"inputs": [...], "outputs": [...]}`) and optionally `question.txt`.
///
/// Every solution becomes a seed carrying all of the problem's test cases.
pub fn load_apps_problem(dir: &Path) -> anyhow::Result<Vec<SnippetSeed>> {
    let solutions_path = dir.join("solutions.json");
    let io_path = dir.join("input_output.json");

    let solutions: Vec<String> = serde_json::from_str(
        &std::fs::read_to_string(&solutions_path)
            .with_context(|| format!("failed to read {}", solutions_path.display()))?,
    )
    .with_context(|| format!("failed to parse {}", solutions_path.display()))?;

    let io: InputOutput = serde_json::from_str(
        &std::fs::read_to_string(&io_path)
            .with_context(|| format!("failed to read {}", io_path.display()))?,
    )
    .with_context(|| format!("failed to parse {}", io_path.display()))?;

    if io.inputs.len() != io.outputs.len() {
        tracing::warn!(
            event = "dataset_io_mismatch",
            inputs = io.inputs.len(),
            outputs = io.outputs.len(),
            dir = %dir.display(),
            "using the shorter list"
        );
    }

    let test_cases: Vec<TestCaseSeed> = io
        .inputs
        .iter()
        .zip(&io.outputs)
        .map(|(input, output)| TestCaseSeed {
            input: render_args(input),
            expected_output: Literal::from_json(output).repr(),
            description: None,
        })
        .collect();

    let title = std::fs::read_to_string(dir.join("question.txt"))
        .ok()
        .and_then(|q| q.lines().map(str::trim).find(|l| !l.is_empty()).map(str::to_string));
    let problem = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "problem".to_string());

    let total = solutions.len();
    Ok(solutions
        .into_iter()
        .enumerate()
        .map(|(i, code)| SnippetSeed {
            code,
            language: DEFAULT_LANGUAGE.to_string(),
            description: Some(match &title {
                Some(t) => format!("{} (solution {}/{} of {})", t, i + 1, total, problem),
                None => format!("solution {}/{} of {}", i + 1, total, problem),
            }),
            test_cases: test_cases.clone(),
        })
        .collect())
}

/// A JSON array is an argument list; anything else is a single argument.
fn render_args(input: &serde_json::Value) -> String {
    match input {
        serde_json::Value::Array(args) => args
            .iter()
            .map(|a| Literal::from_json(a).repr())
            .collect::<Vec<_>>()
            .join(", "),
        other => Literal::from_json(other).repr(),
    }
}
