//! Build canonical diary entries from inferred dates.

use diary_types::DiaryEntry;

use crate::infer::InferredDate;
use crate::numeral;
use crate::types::SourceDocument;
use crate::weather;

/// `YYYY-MM-DD`
pub fn iso_date(year: i32, month: u8, day: u8) -> String {
    format!("{year:04}-{month:02}-{day:02}")
}

/// Assemble the stored entry for one inferred date.
///
/// The content is re-prefixed with the reconstructed day numeral, so it
/// stays self-describing outside the structured fields. Weather is read
/// from the body only.
pub fn normalize(doc: &SourceDocument, date: &InferredDate) -> DiaryEntry {
    let day_text = format!("{}日", numeral::to_text(date.day));
    let body = date.body.trim();
    let content = if body.is_empty() {
        day_text.clone()
    } else {
        format!("{day_text} {body}")
    };

    let mut entry = DiaryEntry::new(content);
    entry.iso_date = Some(iso_date(date.year, date.month, date.day));
    entry.date_raw = Some(format!(
        "{}{}{day_text}",
        doc.era_label_for(date.year),
        date.month_name
    ));
    entry.weather = weather::extract(body);
    for tag in &doc.tags {
        entry.add_tag(tag);
    }
    entry
}

/// Normalize every inferred date of a document, in document order.
pub fn normalize_all(doc: &SourceDocument, dates: &[InferredDate]) -> Vec<DiaryEntry> {
    dates.iter().map(|d| normalize(doc, d)).collect()
}
