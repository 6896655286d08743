//! Corpus merge and the two same-date policies.
//!
//! [`merge`] is additive: everything is kept, sorted by date, and every
//! pair of entries sharing a date is reported as a [`Collision`] for a
//! human to resolve. [`import_skipping_existing`] treats a date that is
//! already present as migrated and skips the newcomer. The two are kept
//! apart on purpose; swapping one for the other changes what ends up on
//! disk.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use diary_types::{Corpus, DiaryEntry};
use log::{debug, info, warn};

use crate::error::{DiaryError, Result};

const PREVIEW_CHARS: usize = 50;

/// Two entries resolved to the same date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub iso_date: String,
    pub first_preview: String,
    pub second_preview: String,
}

/// Result of [`merge`].
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub corpus: Corpus,
    pub collisions: Vec<Collision>,
    /// New entries added
    pub added: usize,
    /// New entries excluded for lacking a date
    pub undated: usize,
    /// Undated entries of the existing corpus, kept as they were
    pub kept_undated: usize,
}

/// Result of [`import_skipping_existing`].
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub corpus: Corpus,
    pub imported: usize,
    /// Dates whose new entry was skipped as already present
    pub skipped: Vec<String>,
    pub undated: usize,
    pub kept_undated: usize,
}

/// Drop new entries whose date could not be resolved.
fn split_undated(items: Vec<DiaryEntry>, undated: &mut usize) -> Vec<DiaryEntry> {
    items
        .into_iter()
        .filter(|e| {
            let dated = e.date().is_some();
            if !dated {
                warn!("excluding undated entry `{}`", e.preview(PREVIEW_CHARS));
                *undated += 1;
            }
            dated
        })
        .collect()
}

/// Undated entries already persisted are never dropped, only counted.
fn count_kept_undated(items: &[DiaryEntry]) -> usize {
    let kept = items.iter().filter(|e| e.date().is_none()).count();
    if kept > 0 {
        info!("keeping {kept} undated entries of the existing corpus");
    }
    kept
}

fn sort_by_date(items: &mut [DiaryEntry]) {
    // stable: same-date entries keep their input order, undated ones lead
    items.sort_by(|a, b| a.date().cmp(&b.date()));
}

/// Every pair (first entry of a date, each later entry of that date).
///
/// Expects `items` sorted by date.
pub fn find_collisions(items: &[DiaryEntry]) -> Vec<Collision> {
    let mut first_of: HashMap<&str, &DiaryEntry> = HashMap::new();
    let mut collisions = Vec::new();
    for entry in items {
        let Some(date) = entry.date() else {
            continue;
        };
        match first_of.get(date) {
            Some(first) => collisions.push(Collision {
                iso_date: date.to_string(),
                first_preview: first.preview(PREVIEW_CHARS),
                second_preview: entry.preview(PREVIEW_CHARS),
            }),
            None => {
                first_of.insert(date, entry);
            }
        }
    }
    collisions
}

/// Append `new_entries` to `existing` (or to an empty default corpus),
/// drop undated new entries, stable-sort by date, recount, and report
/// same-date collisions. No existing entry is removed, and none is
/// removed for colliding.
///
/// With nothing to add the existing items are returned untouched.
pub fn merge(existing: Option<Corpus>, new_entries: Vec<DiaryEntry>) -> MergeOutcome {
    let mut corpus = existing.unwrap_or_default();
    let mut undated = 0;

    let mut items = std::mem::take(&mut corpus.items);
    let kept_undated = count_kept_undated(&items);
    let new_entries = split_undated(new_entries, &mut undated);
    let added = new_entries.len();
    if added > 0 {
        items.extend(new_entries);
        sort_by_date(&mut items);
    }

    let collisions = find_collisions(&items);
    for c in &collisions {
        warn!(
            "duplicate date {}: `{}` / `{}`",
            c.iso_date, c.first_preview, c.second_preview
        );
    }

    corpus.items = items;
    corpus.recount();
    info!(
        "merged {added} entries into {} ({} total, {} collisions)",
        corpus.title,
        corpus.count,
        collisions.len()
    );

    MergeOutcome {
        corpus,
        collisions,
        added,
        undated,
        kept_undated,
    }
}

/// Add only entries whose date is not yet in `existing`.
///
/// A later new entry with the same date as an earlier new entry is also
/// skipped: the first one wins.
pub fn import_skipping_existing(
    existing: Option<Corpus>,
    new_entries: Vec<DiaryEntry>,
) -> ImportOutcome {
    let mut corpus = existing.unwrap_or_default();
    let mut undated = 0;

    let mut items = std::mem::take(&mut corpus.items);
    let kept_undated = count_kept_undated(&items);
    let mut seen: HashSet<String> = items
        .iter()
        .filter_map(|e| e.date().map(str::to_string))
        .collect();

    let mut imported = 0;
    let mut skipped = Vec::new();
    for entry in split_undated(new_entries, &mut undated) {
        let date = entry.date().map(str::to_string).unwrap_or_default();
        if seen.insert(date.clone()) {
            items.push(entry);
            imported += 1;
        } else {
            info!("skipping already present entry: {date}");
            skipped.push(date);
        }
    }

    if imported > 0 {
        sort_by_date(&mut items);
    }
    corpus.items = items;
    corpus.recount();

    ImportOutcome {
        corpus,
        imported,
        skipped,
        undated,
        kept_undated,
    }
}

/// Read a corpus file, failing on I/O or parse errors.
pub fn read_corpus(path: &Path) -> Result<Corpus> {
    let json = std::fs::read_to_string(path).map_err(|e| DiaryError::io(path, e))?;
    serde_json::from_str(&json).map_err(|e| DiaryError::json(path, e))
}

/// Load a persisted corpus.
///
/// A missing file yields `None`. An unreadable or unparseable file is
/// logged and also yields `None`, so the caller starts from an empty
/// corpus instead of aborting the run.
pub fn load_corpus(path: &Path) -> Option<Corpus> {
    if !path.exists() {
        debug!("no corpus at {}, starting empty", path.display());
        return None;
    }
    match read_corpus(path) {
        Ok(corpus) => Some(corpus),
        Err(err) => {
            warn!("{err}; using empty corpus");
            None
        }
    }
}
