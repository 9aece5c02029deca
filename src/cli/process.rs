use std::path::PathBuf;

use clap::Parser;
use fonds::{pipeline, storage, Config};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Enrich record files and export the results")]
pub struct Process {
    /// A record file, or a directory of record files
    input: PathBuf,

    /// Directory the enriched files are written to
    #[arg(short, long, default_value = ".")]
    out: PathBuf,
}

impl Process {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let documents = super::load_documents(&self.input)?;

        std::fs::create_dir_all(&self.out)?;

        let processed = pipeline::process_documents(&documents, config);
        for document in &processed {
            storage::export_document(document, &self.out)?;
        }

        let records: usize = processed.iter().map(|d| d.records.len()).sum();
        let flagged: usize = processed.iter().map(pipeline::ProcessedDocument::flagged).sum();

        println!(
            "{} {records} record(s) across {} document(s)",
            "Processed".success(),
            processed.len()
        );
        if flagged > 0 {
            println!(
                "{}",
                format!("{flagged} record(s) flagged for review").warning()
            );
        }
        println!("Written to {}", self.out.display().to_string().info());

        Ok(())
    }
}
