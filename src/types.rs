use serde::Deserialize;

use crate::infer::InferenceStrategy;
use crate::numeral;

// ── Raw input from the page collaborator ───────────────────────────

/// One text fragment handed over by the page scraper.
///
/// `heading` carries the month heading that immediately precedes this
/// fragment, if any. A block with a heading and blank text is a pure
/// heading marker and produces no entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawBlock {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub heading: Option<String>,
}

impl RawBlock {
    pub fn entry(text: impl Into<String>) -> Self {
        RawBlock {
            text: text.into(),
            heading: None,
        }
    }

    pub fn headed(heading: impl Into<String>, text: impl Into<String>) -> Self {
        RawBlock {
            text: text.into(),
            heading: Some(heading.into()),
        }
    }

    pub fn is_marker(&self) -> bool {
        self.text.trim().is_empty()
    }
}

// ── Source document ────────────────────────────────────────────────

/// A fully fetched source page: fixed year, labels, inference strategy,
/// and the ordered blocks to date.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Stable identifier, also used for output file names
    pub id: String,
    pub author: String,
    /// Collection title, e.g. 壬子日记
    pub title: String,
    /// Calendar year of the first entry
    pub year: i32,
    /// Year label written into `date_raw`, e.g. 一九一二年
    pub era_label: Option<String>,
    /// Labels attached to every entry of this document
    pub tags: Vec<String>,
    pub strategy: InferenceStrategy,
    pub blocks: Vec<RawBlock>,
}

impl SourceDocument {
    /// Year label for `year`: the document's own label for its fixed year,
    /// digit-by-digit numerals otherwise (rollover past December).
    pub fn era_label_for(&self, year: i32) -> String {
        match &self.era_label {
            Some(label) if year == self.year && !label.trim().is_empty() => label.clone(),
            _ => numeral::year_label(year),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(era_label: Option<&str>) -> SourceDocument {
        SourceDocument {
            id: "renzi".to_string(),
            author: "鲁迅".to_string(),
            title: "壬子日记".to_string(),
            year: 1912,
            era_label: era_label.map(str::to_string),
            tags: vec!["壬子日记".to_string()],
            strategy: InferenceStrategy::Headings,
            blocks: Vec::new(),
        }
    }

    #[test]
    fn test_era_label_prefers_document_label() {
        assert_eq!(doc(Some("壬子年")).era_label_for(1912), "壬子年");
        assert_eq!(doc(Some("壬子年")).era_label_for(1913), "一九一三年");
        assert_eq!(doc(None).era_label_for(1912), "一九一二年");
    }

    #[test]
    fn test_marker_block() {
        assert!(RawBlock::headed("五月", "  ").is_marker());
        assert!(!RawBlock::entry("一日 晴。").is_marker());
    }
}
