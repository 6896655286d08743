use serde::{Deserialize, Serialize};

/// Author recorded on a corpus that did not exist before the first merge.
pub const DEFAULT_AUTHOR: &str = "鲁迅";
/// Title recorded on a corpus that did not exist before the first merge.
pub const DEFAULT_TITLE: &str = "鲁迅日记";

fn default_author() -> String {
    DEFAULT_AUTHOR.to_string()
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|s| s.trim().is_empty())
}

// ── Diary entry ──────────────────────────────────────────────────────────

/// One dated unit of diary content, as stored on disk.
///
/// Optional keys are written only when they carry a non-empty value, so
/// an entry whose date could not be resolved serializes without `iso_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryEntry {
    #[serde(default, skip_serializing_if = "is_blank")]
    pub title: Option<String>,
    pub content: String,
    /// `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "is_blank")]
    pub iso_date: Option<String>,
    /// Date reconstructed in the source language, e.g. 一九一二年五月一日
    #[serde(default, skip_serializing_if = "is_blank")]
    pub date_raw: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub weather: Option<String>,
    /// Source collection labels, e.g. 壬子日记
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl DiaryEntry {
    pub fn new(content: impl Into<String>) -> Self {
        DiaryEntry {
            title: None,
            content: content.into(),
            iso_date: None,
            date_raw: None,
            weather: None,
            tags: Vec::new(),
        }
    }

    /// The resolved date, if any. Blank strings count as unresolved.
    pub fn date(&self) -> Option<&str> {
        self.iso_date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    /// Add a tag unless it is already present.
    pub fn add_tag(&mut self, tag: &str) {
        if !tag.is_empty() && !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
        }
    }

    /// First `max_chars` characters of the content, with `...` when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.content.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

// ── Corpus ───────────────────────────────────────────────────────────────

/// An ordered collection of entries plus aggregate metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub items: Vec<DiaryEntry>,
}

impl Corpus {
    pub fn new(author: impl Into<String>, title: impl Into<String>) -> Self {
        Corpus {
            author: author.into(),
            title: title.into(),
            count: 0,
            items: Vec::new(),
        }
    }

    /// Build a corpus from items, setting `count` to match.
    pub fn with_items(
        author: impl Into<String>,
        title: impl Into<String>,
        items: Vec<DiaryEntry>,
    ) -> Self {
        let mut corpus = Corpus::new(author, title);
        corpus.items = items;
        corpus.recount();
        corpus
    }

    pub fn recount(&mut self) {
        self.count = self.items.len();
    }
}

impl Default for Corpus {
    fn default() -> Self {
        Corpus::new(DEFAULT_AUTHOR, DEFAULT_TITLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_keys_omitted_when_empty() {
        let mut entry = DiaryEntry::new("一日 晴。");
        entry.weather = Some(String::new());
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"content":"一日 晴。"}"#);
    }

    #[test]
    fn test_optional_keys_present_when_set() {
        let mut entry = DiaryEntry::new("一日 晴。");
        entry.iso_date = Some("1912-05-01".to_string());
        entry.weather = Some("晴".to_string());
        entry.add_tag("壬子日记");
        entry.add_tag("壬子日记");
        let value: serde_json::Value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["iso_date"], "1912-05-01");
        assert_eq!(value["weather"], "晴");
        assert_eq!(value["tags"], serde_json::json!(["壬子日记"]));
        assert!(value.get("date_raw").is_none());
        assert!(value.get("title").is_none());
    }

    #[test]
    fn test_corpus_reads_without_count() {
        let corpus: Corpus = serde_json::from_str(
            r#"{"author":"鲁迅","title":"鲁迅日记","items":[{"content":"二日 雨。"}]}"#,
        )
        .unwrap();
        assert_eq!(corpus.items.len(), 1);
        assert_eq!(corpus.count, 0);
        assert_eq!(corpus.items[0].date(), None);
    }

    #[test]
    fn test_corpus_reads_without_metadata() {
        let corpus: Corpus = serde_json::from_str(
            r#"{"title":"壬子日记","count":1,"items":[{"content":"一日","iso_date":"1912-05-01"}]}"#,
        )
        .unwrap();
        assert_eq!(corpus.author, DEFAULT_AUTHOR);
        assert_eq!(corpus.title, "壬子日记");
        assert_eq!(corpus.items[0].date(), Some("1912-05-01"));

        let bare: Corpus = serde_json::from_str(r#"{"items":[]}"#).unwrap();
        assert_eq!(bare, Corpus::default());
    }

    #[test]
    fn test_preview_truncates_by_chars() {
        let entry = DiaryEntry::new("一二三四五六");
        assert_eq!(entry.preview(3), "一二三...");
        assert_eq!(entry.preview(10), "一二三四五六");
    }
}
