use std::path::PathBuf;

use clap::Parser;
use fonds::{
    pipeline::{self, ProcessedDocument},
    storage, Config,
};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Print the reconstructed hierarchy of a record file")]
pub struct Tree {
    /// The record file to inspect
    input: PathBuf,
}

impl Tree {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let document = storage::load_file(&self.input)?;
        let processed = pipeline::process_document(&document, config);

        println!("{}", processed.name.info());
        for root in processed.tree.roots() {
            print_subtree(&processed, root, 0);
        }

        Ok(())
    }
}

fn print_subtree(document: &ProcessedDocument, index: usize, depth: usize) {
    let Some(node) = document.tree.node(index) else {
        return;
    };
    let record = &document.records[index];

    let mut line = format!("{}{}", "  ".repeat(depth), record.path);

    if let Some(series) = record.attributes.series.value.as_deref() {
        line.push_str(&format!("  {series}").dim());
    }
    if let (Some(start), Some(end)) = (&record.date_start, &record.date_end) {
        if start == end {
            line.push_str(&format!("  ({start})").dim());
        } else {
            line.push_str(&format!("  ({start} – {end})").dim());
        }
    }
    for flag in &record.flags {
        line.push(' ');
        line.push_str(&format!("[{flag}]").warning());
    }

    println!("{line}");

    for &child in node.children() {
        print_subtree(document, child, depth + 1);
    }
}
