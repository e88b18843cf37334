use super::{exit_codes, load_app_config, open_store};
use crate::cli::args::GlobalArgs;

pub fn cmd_verify(global: &GlobalArgs) -> anyhow::Result<i32> {
    let cfg = load_app_config(global)?;
    let store = open_store(&cfg)?;
    eprintln!("Database: {}", cfg.database.display());
    codematch_core::report::console::print_stats(&store.stats()?, &store.sample()?);
    Ok(exit_codes::OK)
}
