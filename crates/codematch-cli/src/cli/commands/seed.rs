use super::{exit_codes, load_app_config, open_store};
use crate::cli::args::{GlobalArgs, SeedArgs};
use codematch_core::engine::pipeline::{Pipeline, PipelineSettings};
use codematch_core::providers::build_embedder;

pub async fn cmd_seed(global: &GlobalArgs, args: SeedArgs) -> anyhow::Result<i32> {
    let cfg = load_app_config(global)?;
    let embedder = build_embedder(&cfg.embedder)?;
    let seeds = codematch_core::dataset::load_seeds(&args.samples)?;
    let store = open_store(&cfg)?;

    tracing::info!(
        event = "seed_start",
        seeds = seeds.len(),
        file = %args.samples.display(),
        model = %embedder.model_id()
    );

    let pipeline = Pipeline::new(store, embedder, PipelineSettings::from(&cfg.search));
    let summary = pipeline.ingest_all(&seeds).await;
    codematch_core::report::console::print_ingest(&summary);

    Ok(exit_codes::OK)
}
