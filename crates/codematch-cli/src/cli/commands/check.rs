use super::{exit_codes, load_app_config, open_store};
use crate::cli::args::{CheckArgs, GlobalArgs};
use anyhow::Context;
use codematch_core::engine::pipeline::check_snippet;
use std::time::Duration;

pub async fn cmd_check(global: &GlobalArgs, args: CheckArgs) -> anyhow::Result<i32> {
    let cfg = load_app_config(global)?;
    let store = open_store(&cfg)?;

    let code = match &args.code_file {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read code file {}", path.display()))?,
        ),
        None => None,
    };

    let limit = Duration::from_secs(cfg.search.timeout_seconds.max(1));
    let (snippet, report) = check_snippet(&store, args.snippet, code.as_deref(), limit).await?;

    match &args.code_file {
        Some(path) => eprintln!(
            "Checking {} against snippet #{}'s test cases",
            path.display(),
            snippet.id
        ),
        None => eprintln!("Checking snippet #{}", snippet.id),
    }
    codematch_core::report::console::print_suite(&report);

    if let Some(path) = &args.junit {
        let suite = format!("snippet_{}", snippet.id);
        codematch_core::report::junit::write_junit(&suite, &report, path)?;
    }

    if report.failed() > 0 {
        Ok(exit_codes::TEST_FAILED)
    } else {
        Ok(exit_codes::OK)
    }
}
