//! Cumulative run statistics, printed once at the end of a run.

use std::collections::BTreeMap;

use crate::infer::{DocumentInference, InferenceWarning};
use crate::merge::{Collision, ImportOutcome, MergeOutcome};

/// Counts for one run, built from the values each stage returns.
#[derive(Debug, Default)]
pub struct RunReport {
    pub documents: usize,
    pub failed_documents: Vec<String>,
    /// Entries seen by inference
    pub processed: usize,
    pub resolved: usize,
    pub dropped: usize,
    /// Kept entries whose date needs a human check
    pub flagged: usize,
    pub collided: usize,
    /// Same-date pairs inside single documents
    pub document_duplicates: usize,
    pub skipped: usize,
    /// Individual files written twice for the same date
    pub overwritten: usize,
    pub undated: usize,
    /// Undated entries already in a target corpus, carried over unchanged
    pub kept_undated: usize,
    /// Resolved entries per `YYYY-MM`
    pub per_month: BTreeMap<String, usize>,
    /// Warning messages in the order they were produced
    pub warnings: Vec<String>,
}

impl RunReport {
    pub fn add_inference(&mut self, doc_id: &str, inference: &DocumentInference) {
        self.documents += 1;
        self.processed += inference.processed();
        self.resolved += inference.dates.len();
        self.dropped += inference.dropped.len();
        self.flagged += inference.dates.iter().filter(|d| d.is_flagged()).count();
        for d in &inference.dates {
            *self
                .per_month
                .entry(format!("{:04}-{:02}", d.year, d.month))
                .or_insert(0) += 1;
        }
        self.warnings.extend(
            inference
                .warnings()
                .map(|w: &InferenceWarning| format!("[{doc_id}] {w}")),
        );
    }

    pub fn add_failure(&mut self, source: &str, reason: &str) {
        self.failed_documents.push(source.to_string());
        self.warnings.push(format!("[{source}] {reason}"));
    }

    pub fn add_document_duplicates(&mut self, doc_id: &str, collisions: &[Collision]) {
        self.document_duplicates += collisions.len();
        self.warnings.extend(
            collisions
                .iter()
                .map(|c| format!("[{doc_id}] duplicate date {}: `{}`", c.iso_date, c.second_preview)),
        );
    }

    pub fn add_merge(&mut self, outcome: &MergeOutcome) {
        self.add_collisions(&outcome.collisions);
        self.undated += outcome.undated;
        self.kept_undated += outcome.kept_undated;
    }

    pub fn add_import(&mut self, outcome: &ImportOutcome) {
        self.skipped += outcome.skipped.len();
        self.undated += outcome.undated;
        self.kept_undated += outcome.kept_undated;
        self.warnings.extend(
            outcome
                .skipped
                .iter()
                .map(|d| format!("skipped already present date {d}")),
        );
    }

    fn add_collisions(&mut self, collisions: &[Collision]) {
        self.collided += collisions.len();
        self.warnings.extend(collisions.iter().map(|c| {
            format!(
                "duplicate date {}: `{}` / `{}`",
                c.iso_date, c.first_preview, c.second_preview
            )
        }));
    }

    /// Human-readable summary lines.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Documents:  {}", self.documents),
            format!("Processed:  {}", self.processed),
            format!("Resolved:   {}", self.resolved),
            format!("Dropped:    {}", self.dropped),
            format!("Flagged:    {}", self.flagged),
            format!("Collided:   {}", self.collided),
        ];
        if self.document_duplicates > 0 {
            lines.push(format!("Duplicates: {}", self.document_duplicates));
        }
        if self.skipped > 0 {
            lines.push(format!("Skipped:    {}", self.skipped));
        }
        if self.overwritten > 0 {
            lines.push(format!("Overwrote:  {}", self.overwritten));
        }
        if self.undated > 0 {
            lines.push(format!("Undated:    {}", self.undated));
        }
        if self.kept_undated > 0 {
            lines.push(format!("Kept undated: {}", self.kept_undated));
        }
        if !self.failed_documents.is_empty() {
            lines.push(format!("Failed:     {}", self.failed_documents.join(", ")));
        }
        lines
    }

    pub fn print(&self) {
        eprintln!("\n══════════════════════════════════════════");
        eprintln!("  RUN SUMMARY");
        eprintln!("══════════════════════════════════════════");
        for line in self.summary_lines() {
            eprintln!("  {line}");
        }

        if !self.per_month.is_empty() {
            eprintln!("\nBy month:");
            for (month, count) in &self.per_month {
                eprintln!("  {month}: {count} entries");
            }
        }

        if !self.warnings.is_empty() {
            eprintln!("\nWarnings ({} total):", self.warnings.len());
            for w in self.warnings.iter().take(30) {
                eprintln!("  {w}");
            }
            if self.warnings.len() > 30 {
                eprintln!("  ... and {} more", self.warnings.len() - 30);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::{infer_by_rollover, RolloverParams};
    use crate::merge::merge;
    use crate::types::RawBlock;
    use diary_types::DiaryEntry;

    #[test]
    fn test_counts_from_inference() {
        let blocks = vec![
            RawBlock::entry("三十日 晴。"),
            RawBlock::entry("無日"),
            RawBlock::entry("一日 雨。"),
            RawBlock::entry("三十一日 雨。"),
        ];
        let params = RolloverParams {
            start_month: 5,
            ..RolloverParams::default()
        };
        let inference = infer_by_rollover(1912, &blocks, &params);

        let mut report = RunReport::default();
        report.add_inference("renzi", &inference);
        assert_eq!(report.documents, 1);
        assert_eq!(report.processed, 4);
        assert_eq!(report.resolved, 3);
        assert_eq!(report.dropped, 1);
        assert_eq!(report.flagged, 1);
        assert_eq!(report.per_month.get("1912-05"), Some(&1));
        assert_eq!(report.per_month.get("1912-06"), Some(&2));
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings.iter().all(|w| w.starts_with("[renzi]")));
    }

    #[test]
    fn test_collisions_counted() {
        let mut a = DiaryEntry::new("a");
        a.iso_date = Some("1912-05-01".to_string());
        let b = DiaryEntry {
            content: "b".to_string(),
            ..a.clone()
        };
        let outcome = merge(None, vec![a, b]);

        let mut report = RunReport::default();
        report.add_merge(&outcome);
        assert_eq!(report.collided, 1);
        assert!(report.summary_lines().contains(&"Collided:   1".to_string()));
    }

    #[test]
    fn test_kept_undated_reported() {
        let existing = diary_types::Corpus::with_items("鲁迅", "鲁迅日记", vec![DiaryEntry::new("序")]);
        let outcome = merge(Some(existing), Vec::new());

        let mut report = RunReport::default();
        report.add_merge(&outcome);
        assert_eq!(report.kept_undated, 1);
        assert_eq!(report.undated, 0);
        assert!(report.summary_lines().contains(&"Kept undated: 1".to_string()));
    }
}
