use std::path::{Path, PathBuf};

mod flags;
mod process;
mod terminal;
mod tree;

use clap::ArgAction;
use flags::Flags;
use fonds::{pipeline::Document, storage, Config};
use process::Process;
use tree::Tree;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a configuration file (defaults are used when absent)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = load_config(self.config.as_deref())?;
        self.command.run(&config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Enrich record files and export the results
    Process(Process),

    /// Print the reconstructed hierarchy of one record file
    Tree(Tree),

    /// List records carrying data-quality flags
    Flags(Flags),
}

impl Command {
    fn run(self, config: &Config) -> anyhow::Result<()> {
        match self {
            Self::Process(command) => command.run(config)?,
            Self::Tree(command) => command.run(config)?,
            Self::Flags(command) => command.run(config)?,
        }
        Ok(())
    }
}

/// Loads the configuration from an explicit path, or falls back to defaults.
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    path.map_or_else(
        || Ok(Config::default()),
        |path| Config::load(path).map_err(|e| anyhow::anyhow!("{e}")),
    )
}

/// Loads one record file, or every record file in a directory.
fn load_documents(input: &Path) -> anyhow::Result<Vec<Document>> {
    let documents = if input.is_dir() {
        storage::load_dir(input)?
    } else {
        vec![storage::load_file(input)?]
    };

    if documents.is_empty() {
        anyhow::bail!("no record files found in {}", input.display());
    }
    Ok(documents)
}
