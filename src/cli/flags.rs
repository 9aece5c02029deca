use std::{path::PathBuf, process};

use clap::Parser;
use fonds::{pipeline, Config};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "List records carrying data-quality flags")]
pub struct Flags {
    /// A record file, or a directory of record files
    input: PathBuf,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Flags {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let documents = super::load_documents(&self.input)?;
        let processed = pipeline::process_documents(&documents, config);

        let flagged: usize = processed
            .iter()
            .map(pipeline::ProcessedDocument::flagged)
            .sum();

        match self.output {
            OutputFormat::Json => Self::output_json(&processed)?,
            OutputFormat::Table => {
                if self.quiet {
                    println!("{flagged}");
                } else {
                    Self::output_table(&processed, flagged);
                }
            }
        }

        // A non-zero exit code lets review scripts gate on clean output.
        if flagged > 0 {
            process::exit(2);
        }
        Ok(())
    }

    fn output_json(processed: &[pipeline::ProcessedDocument]) -> anyhow::Result<()> {
        use serde_json::json;

        let rows: Vec<_> = processed
            .iter()
            .flat_map(|document| {
                document
                    .records
                    .iter()
                    .filter(|record| !record.flags.is_empty())
                    .map(|record| {
                        json!({
                            "document": document.name,
                            "order_index": record.record.order_index,
                            "reference": record.record.reference_raw,
                            "path": record.path,
                            "flags": record.flags,
                        })
                    })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&rows)?);
        Ok(())
    }

    fn output_table(processed: &[pipeline::ProcessedDocument], flagged: usize) {
        if flagged == 0 {
            println!("{}", "No flagged records".success());
            return;
        }

        for document in processed {
            let rows: Vec<_> = document
                .records
                .iter()
                .filter(|record| !record.flags.is_empty())
                .collect();
            if rows.is_empty() {
                continue;
            }

            println!("{}", document.name.info());
            for record in rows {
                let flags = record
                    .flags
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                println!(
                    "  #{:<5} {:<12} {:<12} {}",
                    record.record.order_index,
                    record.record.reference_raw.dim(),
                    record.path,
                    flags.warning()
                );
            }
        }
        println!();
        println!("{}", format!("{flagged} flagged record(s)").warning());
    }
}
