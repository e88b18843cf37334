use super::{exit_codes, load_app_config, open_store, write_file_if_missing, write_sample_config_if_missing};
use crate::cli::args::{GlobalArgs, InitArgs};
use std::path::Path;

pub fn cmd_init(global: &GlobalArgs, args: InitArgs) -> anyhow::Result<i32> {
    write_sample_config_if_missing(&global.config)?;
    write_file_if_missing(Path::new("samples.yaml"), crate::templates::SAMPLES_YAML)?;
    write_file_if_missing(Path::new("question.txt"), crate::templates::QUESTION_TXT)?;

    if args.gitignore {
        write_file_if_missing(Path::new(".gitignore"), crate::templates::GITIGNORE)?;
    }

    let cfg = load_app_config(global)?;
    open_store(&cfg)?;
    eprintln!("database ready at {}", cfg.database.display());

    Ok(exit_codes::OK)
}
