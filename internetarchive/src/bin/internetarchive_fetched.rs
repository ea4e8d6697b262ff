use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use internetarchive_fetched::{exit_code, run, ArchiveSearch, RunOutcome};
use quantifying_shared::{
    logging, GitRepo, Paths, RepoSync, SkipSync, EXIT_INTERRUPTED, FETCH_PHASE,
};

/// Internet Archive Data Fetching Script
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of licenses to query
    #[arg(long, default_value_t = 10)]
    licenses: usize,

    /// Repository root holding legal-tool-paths.txt and data/
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Branch to merge from and push to
    #[arg(long, default_value = "main")]
    branch: String,

    /// Don't fetch, commit or push (local runs)
    #[arg(long)]
    skip_git: bool,
}

fn fetch(cli: &Cli) -> Result<RunOutcome> {
    let repo = cli
        .repo
        .canonicalize()
        .with_context(|| format!("Repository not found: {}", cli.repo.display()))?;
    let paths = Paths::for_today(&repo, FETCH_PHASE);
    let sync: Box<dyn RepoSync> = if cli.skip_git {
        Box::new(SkipSync)
    } else {
        Box::new(GitRepo::new(&repo, &cli.branch))
    };
    let search = ArchiveSearch::new()?;

    run(&paths, sync.as_ref(), &search, cli.licenses)
}

fn install_interrupt_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        log::info!("({}) Halted via interrupt.", EXIT_INTERRUPTED);
        process::exit(EXIT_INTERRUPTED);
    })
    .context("Failed to install Ctrl-C handler")
}

fn main() {
    logging::init();
    log::info!("Script execution started.");

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version also arrive here with exit code 0
            if e.exit_code() == 0 {
                log::info!("System exit with code: 0");
            } else {
                log::error!("System exit with code: {}", e.exit_code());
            }
            e.exit();
        }
    };
    log::info!("Parsing command-line arguments: {:?}", cli);

    let result = install_interrupt_handler().and_then(|_| fetch(&cli));

    process::exit(exit_code(&result));
}
