use super::args::*;
use codematch_core::config::{load_or_default, AppConfig};
use codematch_core::storage::Store;
use std::path::Path;

pub mod check;
pub mod import;
pub mod init;
pub mod search;
pub mod seed;
pub mod verify;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const TEST_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let global = cli.global;
    match cli.cmd {
        Command::Init(args) => init::cmd_init(&global, args),
        Command::Seed(args) => seed::cmd_seed(&global, args).await,
        Command::Import(args) => import::cmd_import(&global, args).await,
        Command::Search(args) => search::cmd_search(&global, args).await,
        Command::Check(args) => check::cmd_check(&global, args).await,
        Command::Verify => verify::cmd_verify(&global),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

/// Config file (or defaults), then `CODEMATCH_*` overrides, then `--db`.
pub(crate) fn load_app_config(global: &GlobalArgs) -> anyhow::Result<AppConfig> {
    let mut cfg = load_or_default(&global.config)?;
    cfg.apply_env(|k| std::env::var(k).ok());
    if let Some(db) = &global.db {
        cfg.database = db.clone();
    }
    Ok(cfg)
}

pub(crate) fn open_store(cfg: &AppConfig) -> anyhow::Result<Store> {
    let store = if cfg.database.as_os_str() == ":memory:" {
        Store::memory()?
    } else {
        ensure_parent_dir(&cfg.database)?;
        Store::open(&cfg.database)?
    };
    store.init_schema()?;
    Ok(store)
}

pub(crate) fn write_file_if_missing(path: &Path, content: &str) -> anyhow::Result<()> {
    ensure_parent_dir(path)?;
    if !path.exists() {
        std::fs::write(path, content)?;
        eprintln!("created {}", path.display());
    } else {
        eprintln!("note: {} already exists (skipped)", path.display());
    }
    Ok(())
}

pub(crate) fn write_sample_config_if_missing(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        ensure_parent_dir(path)?;
        codematch_core::config::write_sample_config(path)?;
        eprintln!("created {}", path.display());
    } else {
        eprintln!("note: {} already exists", path.display());
    }
    Ok(())
}

pub(crate) fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
