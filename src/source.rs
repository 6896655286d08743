use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::{DiaryError, Result};
use crate::infer::InferenceStrategy;
use crate::types::{RawBlock, SourceDocument};

// Day markers inside a flat scraped paragraph. Every entry starts on a
// new line indented with two full-width spaces:
//   　　一日　晴。上午往部。　　二日　雨。
static RE_ENTRY_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"　　([一二三四五六七八九十]+日)").unwrap());

/// On-disk form of a source document, as written by the page scraper.
///
/// Blocks may be given ready-split (`blocks`) or as whole paragraphs
/// (`paragraphs`) that still contain several day entries each.
#[derive(Debug, Deserialize)]
pub struct SourceManifest {
    pub id: String,
    #[serde(default = "default_author")]
    pub author: String,
    pub title: String,
    pub year: i32,
    #[serde(default)]
    pub era_label: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub strategy: InferenceStrategy,
    #[serde(default)]
    pub blocks: Vec<RawBlock>,
    #[serde(default)]
    pub paragraphs: Vec<RawBlock>,
}

fn default_author() -> String {
    diary_types::DEFAULT_AUTHOR.to_string()
}

impl SourceManifest {
    /// Validate and flatten into a [`SourceDocument`].
    pub fn into_document(self) -> Result<SourceDocument> {
        if self.id.trim().is_empty() {
            return Err(DiaryError::invalid(&self.id, "empty id"));
        }
        if !(1..=9999).contains(&self.year) {
            return Err(DiaryError::invalid(
                &self.id,
                format!("year {} out of range", self.year),
            ));
        }
        validate_strategy(&self.id, &self.strategy)?;

        let mut blocks = self.blocks;
        for paragraph in &self.paragraphs {
            blocks.extend(split_paragraph(paragraph));
        }

        Ok(SourceDocument {
            id: self.id,
            author: self.author,
            title: self.title,
            year: self.year,
            era_label: self.era_label,
            tags: self.tags,
            strategy: self.strategy,
            blocks,
        })
    }
}

fn validate_strategy(id: &str, strategy: &InferenceStrategy) -> Result<()> {
    match strategy {
        InferenceStrategy::Headings => Ok(()),
        InferenceStrategy::BoundaryTable { ranges } => {
            for r in ranges {
                if r.start > r.end {
                    return Err(DiaryError::invalid(
                        id,
                        format!("range {}..={} is reversed", r.start, r.end),
                    ));
                }
                if !(1..=12).contains(&r.month) {
                    return Err(DiaryError::invalid(id, format!("range month {}", r.month)));
                }
            }
            Ok(())
        }
        InferenceStrategy::Rollover(params) => {
            if !(1..=12).contains(&params.start_month) {
                return Err(DiaryError::invalid(
                    id,
                    format!("start month {}", params.start_month),
                ));
            }
            Ok(())
        }
    }
}

/// Split a scraped paragraph into one block per day entry.
///
/// Text before the first marker becomes a block of its own, so an entry
/// whose first line lost its indent is still dated and stray prose is
/// dropped and counted by inference rather than here. The paragraph's
/// heading goes on the first block; a paragraph with a heading and no
/// text still yields a marker block so month tracking sees it.
pub fn split_paragraph(paragraph: &RawBlock) -> Vec<RawBlock> {
    let text = &paragraph.text;
    let mut cuts = vec![0];
    cuts.extend(
        RE_ENTRY_MARKER
            .captures_iter(text)
            .filter_map(|c| c.get(1).map(|m| m.start())),
    );

    let mut blocks = Vec::with_capacity(cuts.len());
    for (i, &start) in cuts.iter().enumerate() {
        let end = cuts.get(i + 1).copied().unwrap_or(text.len());
        let piece = text[start..end].trim();
        if piece.is_empty() {
            continue;
        }
        if i == 0 && cuts.len() > 1 {
            debug!("text before the first day marker kept as its own block: `{piece}`");
        }
        blocks.push(RawBlock::entry(piece));
    }

    if let Some(heading) = &paragraph.heading {
        match blocks.first_mut() {
            Some(first) => first.heading = Some(heading.clone()),
            None => blocks.push(RawBlock::headed(heading.clone(), "")),
        }
    }
    blocks
}

/// Read one manifest file.
pub fn load_document(path: &Path) -> Result<SourceDocument> {
    let json = std::fs::read_to_string(path).map_err(|e| DiaryError::io(path, e))?;
    let manifest: SourceManifest =
        serde_json::from_str(&json).map_err(|e| DiaryError::json(path, e))?;
    let doc = manifest.into_document()?;
    debug!(
        "loaded {} ({} blocks, strategy {})",
        path.display(),
        doc.blocks.len(),
        doc.strategy.name()
    );
    Ok(doc)
}

/// Find all `*.json` manifests under `root`, sorted by path.
pub fn scan_documents(root: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| match e {
            Ok(e) => Some(e),
            Err(err) => {
                warn!("skipping unreadable path under {}: {err}", root.display());
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    paths.sort();
    paths
}
