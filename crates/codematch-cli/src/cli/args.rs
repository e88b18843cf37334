use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "codematch",
    version,
    about = "Find stored code snippets similar to generated code and run their tests against it"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Args, Clone)]
pub struct GlobalArgs {
    #[arg(long, global = true, default_value = "codematch.yaml", env = "CODEMATCH_CONFIG")]
    pub config: PathBuf,

    /// Database path (overrides the config file)
    #[arg(long, global = true, env = "CODEMATCH_DB")]
    pub db: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write starter files and create the database schema
    Init(InitArgs),
    /// Register snippets and their test cases from a seed file
    Seed(SeedArgs),
    /// Import a problem directory (solutions.json + input_output.json)
    Import(ImportArgs),
    /// Generate (or read) candidate code, rank stored snippets, run the best match's tests
    Search(SearchArgs),
    /// Run a stored snippet's test cases
    Check(CheckArgs),
    /// Print store counts and a sample row
    Verify,
    Version,
}

#[derive(Parser, Clone)]
pub struct InitArgs {
    /// generate .gitignore for the database directory
    #[arg(long)]
    pub gitignore: bool,
}

#[derive(Parser, Clone)]
pub struct SeedArgs {
    #[arg(long, default_value = "samples.yaml")]
    pub samples: PathBuf,
}

#[derive(Parser, Clone)]
pub struct ImportArgs {
    /// Directory holding solutions.json, input_output.json and optionally question.txt
    pub dir: PathBuf,
}

#[derive(Parser, Clone)]
pub struct SearchArgs {
    /// Problem statement sent to the generator
    #[arg(long, conflicts_with_all = ["prompt_file", "code_file", "interactive"])]
    pub prompt: Option<String>,

    /// Read the problem statement from a file
    #[arg(long, conflicts_with_all = ["code_file", "interactive"])]
    pub prompt_file: Option<PathBuf>,

    /// Skip generation and search with this code
    #[arg(long, conflicts_with = "interactive")]
    pub code_file: Option<PathBuf>,

    /// Read the problem statement from stdin
    #[arg(long)]
    pub interactive: bool,

    #[arg(long)]
    pub top_n: Option<usize>,

    /// Write the search outcome as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Write the best match's test results as JUnit XML
    #[arg(long)]
    pub junit: Option<PathBuf>,
}

#[derive(Parser, Clone)]
pub struct CheckArgs {
    #[arg(long)]
    pub snippet: i64,

    /// Code to test instead of the snippet's own
    #[arg(long)]
    pub code_file: Option<PathBuf>,

    #[arg(long)]
    pub junit: Option<PathBuf>,
}
