//! JSON output: the combined corpus file and the one-file-per-date view.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use diary_types::Corpus;
use log::{info, warn};
use serde::Serialize;

use crate::error::{DiaryError, Result};

/// Pretty-print `data` to `path`, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DiaryError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(data).map_err(|e| DiaryError::json(path, e))?;
    std::fs::write(path, &json).map_err(|e| DiaryError::io(path, e))?;
    Ok(json.len())
}

pub fn write_corpus(path: &Path, corpus: &Corpus) -> Result<()> {
    let bytes = write_json(path, corpus)?;
    info!("{} ({} entries, {bytes} bytes)", path.display(), corpus.count);
    Ok(())
}

/// Files written by [`write_individual`].
#[derive(Debug, Default)]
pub struct IndividualExport {
    pub written: Vec<PathBuf>,
    /// Dates whose file was written more than once; the last entry wins
    pub overwritten: Vec<String>,
}

/// Write every entry to `{dir}/{prefix}_{iso_date}.json`.
///
/// Undated entries go to `{prefix}_entry_{n}.json`, numbered from 1 by
/// position. A second entry for the same date overwrites the first file
/// and is logged; the combined corpus still holds both.
pub fn write_individual(dir: &Path, prefix: &str, corpus: &Corpus) -> Result<IndividualExport> {
    std::fs::create_dir_all(dir).map_err(|e| DiaryError::io(dir, e))?;

    let mut export = IndividualExport::default();
    let mut seen = HashSet::new();
    for (i, entry) in corpus.items.iter().enumerate() {
        let path = match entry.date() {
            Some(date) => {
                if !seen.insert(date.to_string()) {
                    warn!("overwriting individual entry for duplicate date {date}");
                    export.overwritten.push(date.to_string());
                }
                dir.join(format!("{prefix}_{date}.json"))
            }
            None => dir.join(format!("{prefix}_entry_{}.json", i + 1)),
        };
        write_json(&path, entry)?;
        if !export.written.contains(&path) {
            export.written.push(path);
        }
    }

    info!(
        "saved {} individual entries to {}",
        export.written.len(),
        dir.display()
    );
    Ok(export)
}
