mod calendar;
mod error;
mod export;
mod infer;
mod logging;
mod merge;
mod normalize;
mod numeral;
mod report;
mod source;
mod types;
mod weather;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use diary_types::{Corpus, DiaryEntry};
use log::{error, info, warn};

use crate::error::Result;
use crate::report::RunReport;

const OUTPUT_DIR: &str = "output";

#[derive(Parser)]
#[command(
    name = "diary_chrono",
    about = "Date, normalize and merge scraped historical diaries"
)]
struct Cli {
    /// Directory for per-document corpora and individual entries
    #[arg(long, global = true, default_value = OUTPUT_DIR)]
    out: PathBuf,
    /// trace, debug, info, warn or error (RUST_LOG overrides)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Date every source document under a directory → output/<id>.json
    Ingest {
        /// Directory searched recursively for *.json source manifests
        docs: PathBuf,
        /// Also merge all new entries into this corpus file
        #[arg(long)]
        merge_into: Option<PathBuf>,
        /// Skip the one-file-per-date export
        #[arg(long)]
        no_individual: bool,
    },
    /// Merge corpus files into a target corpus, reporting same-date collisions
    Merge {
        target: PathBuf,
        inputs: Vec<PathBuf>,
    },
    /// Add entries from corpus files, skipping dates already in the target
    Import {
        target: PathBuf,
        inputs: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _logger = match logging::init_logging(&cli.log_level) {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let result = match &cli.command {
        Command::Ingest {
            docs,
            merge_into,
            no_individual,
        } => run_ingest(docs, &cli.out, merge_into.as_deref(), !no_individual),
        Command::Merge { target, inputs } => run_merge(target, inputs),
        Command::Import { target, inputs } => run_import(target, inputs),
    };

    match result {
        Ok(report) => {
            report.print();
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  INGEST: source manifests → dated corpora
// ═══════════════════════════════════════════════════════════════════════

fn run_ingest(
    docs: &Path,
    out: &Path,
    merge_into: Option<&Path>,
    individual: bool,
) -> Result<RunReport> {
    let paths = source::scan_documents(docs);
    info!("found {} source documents under {}", paths.len(), docs.display());

    let mut report = RunReport::default();
    let mut all_entries: Vec<DiaryEntry> = Vec::new();

    for path in &paths {
        let doc = match source::load_document(path) {
            Ok(doc) => doc,
            Err(err) => {
                warn!("{err}");
                report.add_failure(&path.display().to_string(), &err.to_string());
                continue;
            }
        };

        let inference = infer::infer_document(&doc);
        report.add_inference(&doc.id, &inference);

        let entries = normalize::normalize_all(&doc, &inference.dates);
        let duplicates = merge::find_collisions(&entries);
        for c in &duplicates {
            warn!("[{}] duplicate date {}: `{}`", doc.id, c.iso_date, c.second_preview);
        }
        report.add_document_duplicates(&doc.id, &duplicates);

        let corpus = Corpus::with_items(doc.author.clone(), doc.title.clone(), entries);
        export::write_corpus(&out.join(format!("{}.json", doc.id)), &corpus)?;
        if individual {
            let dir = out.join(&doc.id).join("individual_entries");
            let written = export::write_individual(&dir, &doc.id, &corpus)?;
            report.overwritten += written.overwritten.len();
        }
        info!("{}: {} entries dated", doc.title, corpus.count);

        all_entries.extend(corpus.items);
    }

    if let Some(target) = merge_into {
        let outcome = merge::merge(merge::load_corpus(target), all_entries);
        report.add_merge(&outcome);
        export::write_corpus(target, &outcome.corpus)?;
    }

    Ok(report)
}

// ═══════════════════════════════════════════════════════════════════════
//  MERGE / IMPORT: combine existing corpus files
// ═══════════════════════════════════════════════════════════════════════

/// Entries of every readable input; unreadable inputs are reported and skipped.
fn collect_inputs(inputs: &[PathBuf], report: &mut RunReport) -> Vec<DiaryEntry> {
    let mut entries = Vec::new();
    for path in inputs {
        match merge::read_corpus(path) {
            Ok(corpus) if corpus.items.is_empty() => {
                warn!("no items found in {}", path.display());
            }
            Ok(corpus) => {
                info!("{}: {} items", path.display(), corpus.items.len());
                entries.extend(corpus.items);
            }
            Err(err) => {
                warn!("{err}");
                report.add_failure(&path.display().to_string(), &err.to_string());
            }
        }
    }
    entries
}

fn run_merge(target: &Path, inputs: &[PathBuf]) -> Result<RunReport> {
    let mut report = RunReport::default();
    let entries = collect_inputs(inputs, &mut report);

    let outcome = merge::merge(merge::load_corpus(target), entries);
    info!("added {} entries to {}", outcome.added, target.display());
    report.add_merge(&outcome);
    export::write_corpus(target, &outcome.corpus)?;
    Ok(report)
}

fn run_import(target: &Path, inputs: &[PathBuf]) -> Result<RunReport> {
    let mut report = RunReport::default();
    let entries = collect_inputs(inputs, &mut report);

    let outcome = merge::import_skipping_existing(merge::load_corpus(target), entries);
    info!(
        "imported {} entries, skipped {}",
        outcome.imported,
        outcome.skipped.len()
    );
    report.add_import(&outcome);
    export::write_corpus(target, &outcome.corpus)?;
    Ok(report)
}
