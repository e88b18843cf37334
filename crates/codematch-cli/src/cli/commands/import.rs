use super::{exit_codes, load_app_config, open_store};
use crate::cli::args::{GlobalArgs, ImportArgs};
use codematch_core::engine::pipeline::{Pipeline, PipelineSettings};
use codematch_core::providers::build_embedder;

pub async fn cmd_import(global: &GlobalArgs, args: ImportArgs) -> anyhow::Result<i32> {
    let cfg = load_app_config(global)?;
    let embedder = build_embedder(&cfg.embedder)?;

    eprintln!("Importing problem from: {}", args.dir.display());
    let seeds = codematch_core::dataset::load_apps_problem(&args.dir)?;
    let cases = seeds.first().map(|s| s.test_cases.len()).unwrap_or(0);
    eprintln!("Found {} solutions with {} test cases each.", seeds.len(), cases);

    let store = open_store(&cfg)?;
    let pipeline = Pipeline::new(store, embedder, PipelineSettings::from(&cfg.search));
    let summary = pipeline.ingest_all(&seeds).await;
    codematch_core::report::console::print_ingest(&summary);

    Ok(exit_codes::OK)
}
