use super::{exit_codes, load_app_config, open_store};
use crate::cli::args::{GlobalArgs, SearchArgs};
use codematch_core::engine::pipeline::{Pipeline, PipelineSettings};
use codematch_core::providers::{build_embedder, build_generator};
use std::path::{Path, PathBuf};
use tokio::io::AsyncBufReadExt;

const DEFAULT_PROMPT_FILE: &str = "question.txt";

enum Source {
    Prompt(String),
    Code(String),
}

pub async fn cmd_search(global: &GlobalArgs, args: SearchArgs) -> anyhow::Result<i32> {
    let mut cfg = load_app_config(global)?;
    if let Some(n) = args.top_n {
        if n == 0 {
            eprintln!("config error: --top-n must be at least 1");
            return Ok(exit_codes::CONFIG_ERROR);
        }
        cfg.search.top_n = n;
    }

    let source = match resolve_source(&args).await {
        Ok(s) => s,
        Err(diag) => {
            eprintln!("{}", diag);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let embedder = build_embedder(&cfg.embedder)?;
    let mut pipeline = Pipeline::new(
        open_store(&cfg)?,
        embedder,
        PipelineSettings::from(&cfg.search),
    );

    let candidate = match source {
        Source::Code(code) => code,
        Source::Prompt(prompt) => {
            pipeline = pipeline.with_generator(build_generator(&cfg.generator)?);
            eprintln!("Generating code with {}...", cfg.generator.model);
            pipeline.generate_candidate(&prompt).await?
        }
    };

    let outcome = pipeline.search(&candidate).await?;
    codematch_core::report::console::print_search(&outcome);

    if let Some(path) = &args.json {
        codematch_core::report::json::write_json(&outcome, path)?;
    }
    if let (Some(path), Some(best)) = (&args.junit, &outcome.best) {
        let suite = format!("snippet_{}", best.snippet.id);
        codematch_core::report::junit::write_junit(&suite, &best.report, path)?;
    }

    match &outcome.best {
        Some(best) if best.report.failed() > 0 => Ok(exit_codes::TEST_FAILED),
        _ => Ok(exit_codes::OK),
    }
}

/// Picks the candidate source; `Err` carries a user-facing diagnostic.
async fn resolve_source(args: &SearchArgs) -> Result<Source, String> {
    if let Some(path) = &args.code_file {
        let code = read_text(path, "code file")?;
        if code.trim().is_empty() {
            return Err(format!("config error: code file {} is empty", path.display()));
        }
        return Ok(Source::Code(code));
    }

    let prompt = if let Some(p) = &args.prompt {
        p.clone()
    } else if args.interactive {
        read_stdin_prompt()
            .await
            .map_err(|e| format!("config error: failed to read prompt from stdin: {}", e))?
    } else {
        let path = args
            .prompt_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROMPT_FILE));
        read_text(&path, "prompt file")?
    };

    if prompt.trim().is_empty() {
        return Err("config error: the problem statement is empty".to_string());
    }
    Ok(Source::Prompt(prompt.trim().to_string()))
}

fn read_text(path: &Path, what: &str) -> Result<String, String> {
    if !path.exists() {
        return Err(format!(
            "config error: {} {} not found (run `codematch init` to create a template)",
            what,
            path.display()
        ));
    }
    std::fs::read_to_string(path)
        .map_err(|e| format!("config error: failed to read {} {}: {}", what, path.display(), e))
}

async fn read_stdin_prompt() -> std::io::Result<String> {
    eprintln!("Enter the problem statement, then Ctrl-D:");
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut buf = Vec::new();
    while let Some(line) = lines.next_line().await? {
        buf.push(line);
    }
    Ok(buf.join("\n"))
}
