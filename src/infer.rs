//! Date inference: recover a (month, day) pair for every entry of a
//! source document.
//!
//! Each document is dated by exactly one strategy, chosen up front:
//!
//! - [`InferenceStrategy::Headings`]: month comes from the latest month
//!   heading. Authoritative whenever the page has headings.
//! - [`InferenceStrategy::BoundaryTable`]: month comes from a fixed table
//!   of block-index ranges, for pages whose headings cannot be recovered.
//! - [`InferenceStrategy::Rollover`]: month is tracked positionally and
//!   advanced when the day sequence falls back. Heuristic, last resort.
//!
//! The day always comes from the entry's leading numeral. Entries without
//! one are dropped. Problems are returned as [`InferenceWarning`] values
//! next to the results, never kept in shared counters.

use std::fmt;

use log::{debug, warn};
use serde::Deserialize;

use crate::calendar;
use crate::numeral;
use crate::types::{RawBlock, SourceDocument};

const PREVIEW_CHARS: usize = 20;

// ── Strategy ───────────────────────────────────────────────────────

/// Inclusive range of block indices that belong to one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MonthRange {
    pub start: usize,
    pub end: usize,
    pub month: u8,
}

impl MonthRange {
    pub fn contains(&self, index: usize) -> bool {
        (self.start..=self.end).contains(&index)
    }
}

/// Thresholds of the rollover heuristic.
///
/// The defaults were tuned by hand on the 1912 diary and have not been
/// validated elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RolloverParams {
    /// Month of the first entry
    pub start_month: u8,
    /// A previous day at or above this value…
    pub reset_from: u8,
    /// …followed by a day at or below this value starts a new month
    pub reset_to: u8,
    /// A drop of strictly more than this many days starts a new month
    pub max_drop: u8,
}

impl Default for RolloverParams {
    fn default() -> Self {
        RolloverParams {
            start_month: 1,
            reset_from: 28,
            reset_to: 3,
            max_drop: 15,
        }
    }
}

impl RolloverParams {
    /// Does `prev → cur` look like the start of a new month?
    pub fn is_rollover(&self, prev: u8, cur: u8) -> bool {
        (prev >= self.reset_from && cur <= self.reset_to) || prev.saturating_sub(cur) > self.max_drop
    }
}

/// How a document's months are recovered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InferenceStrategy {
    Headings,
    BoundaryTable { ranges: Vec<MonthRange> },
    Rollover(RolloverParams),
}

impl InferenceStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Headings => "headings",
            Self::BoundaryTable { .. } => "boundary_table",
            Self::Rollover(_) => "rollover",
        }
    }
}

// ── Warnings ───────────────────────────────────────────────────────

/// A data-quality problem found while dating one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferenceWarning {
    /// No leading day numeral; the entry is dropped.
    MissingDayNumeral { index: usize, preview: String },
    /// Day numeral present but unreadable; the fallback day was used.
    UnknownNumeral { index: usize, numeral: String },
    /// Day exceeded the month's length and was reduced to the last day.
    DayClamped {
        index: usize,
        month: u8,
        day: u8,
        max: u8,
    },
    /// Entry appears before any usable month heading; dropped.
    NoActiveMonth { index: usize, preview: String },
    /// Heading text is not a month; ends the current run.
    UnknownHeading { index: usize, heading: String },
    /// Entry index lies outside every boundary range; dropped.
    OutsideBoundaryTable { index: usize },
    /// Entry index lies inside several ranges; the first one was used.
    OverlappingBoundary { index: usize, months: Vec<u8> },
    /// Rollover advanced past December into the next year.
    YearAdvanced { index: usize, year: i32 },
}

impl InferenceWarning {
    /// Entry kept with a best-effort date that a human should audit.
    pub fn is_ambiguity(&self) -> bool {
        matches!(
            self,
            Self::DayClamped { .. } | Self::OverlappingBoundary { .. } | Self::YearAdvanced { .. }
        )
    }
}

impl fmt::Display for InferenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDayNumeral { index, preview } => {
                write!(f, "entry {index}: no day numeral in `{preview}`")
            }
            Self::UnknownNumeral { index, numeral } => write!(
                f,
                "entry {index}: unreadable day numeral `{numeral}`, using day {}",
                numeral::FALLBACK_DAY
            ),
            Self::DayClamped {
                index,
                month,
                day,
                max,
            } => write!(
                f,
                "entry {index}: day {day} exceeds {max} days of month {month}, clamped"
            ),
            Self::NoActiveMonth { index, preview } => {
                write!(f, "entry {index}: no month heading before `{preview}`")
            }
            Self::UnknownHeading { index, heading } => {
                write!(f, "block {index}: `{heading}` is not a month heading")
            }
            Self::OutsideBoundaryTable { index } => {
                write!(f, "entry {index}: outside every boundary range")
            }
            Self::OverlappingBoundary { index, months } => {
                write!(f, "entry {index}: in overlapping ranges for months {months:?}")
            }
            Self::YearAdvanced { index, year } => {
                write!(f, "entry {index}: month rollover moved into year {year}")
            }
        }
    }
}

fn preview(text: &str) -> String {
    text.trim().chars().take(PREVIEW_CHARS).collect()
}

// ── Results ────────────────────────────────────────────────────────

/// The date recovered for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferredDate {
    /// Position of the source block in the document
    pub index: usize,
    pub year: i32,
    pub month: u8,
    /// Month as written by the source, e.g. 閏二月
    pub month_name: String,
    /// Day after clamping
    pub day: u8,
    /// Entry text after the day marker
    pub body: String,
    pub warnings: Vec<InferenceWarning>,
}

impl InferredDate {
    /// True when the date needs a human check.
    pub fn is_flagged(&self) -> bool {
        self.warnings.iter().any(InferenceWarning::is_ambiguity)
    }
}

/// Everything inferred from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentInference {
    pub dates: Vec<InferredDate>,
    /// One warning per dropped entry
    pub dropped: Vec<InferenceWarning>,
    /// Document-level warnings not tied to a kept or dropped entry
    pub notices: Vec<InferenceWarning>,
}

impl DocumentInference {
    /// Entries seen, kept or dropped.
    pub fn processed(&self) -> usize {
        self.dates.len() + self.dropped.len()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &InferenceWarning> {
        self.notices
            .iter()
            .chain(self.dates.iter().flat_map(|d| d.warnings.iter()))
            .chain(self.dropped.iter())
    }

    fn drop_entry(&mut self, warning: InferenceWarning) {
        warn!("{warning}; entry dropped");
        self.dropped.push(warning);
    }

    fn notice(&mut self, warning: InferenceWarning) {
        warn!("{warning}");
        self.notices.push(warning);
    }

    fn resolve(
        &mut self,
        ctx: &mut MonthContext,
        index: usize,
        reading: DayReading<'_>,
        mut warnings: Vec<InferenceWarning>,
    ) {
        let day = match ctx.clamp(reading.day) {
            Some(max) => {
                let w = InferenceWarning::DayClamped {
                    index,
                    month: ctx.month,
                    day: reading.day,
                    max,
                };
                warn!("{w}");
                warnings.push(w);
                max
            }
            None => reading.day,
        };
        // a fallback day says nothing about where the month is
        if !reading.fallback {
            ctx.last_day = Some(reading.day);
        }
        self.dates.push(InferredDate {
            index,
            year: ctx.year,
            month: ctx.month,
            month_name: ctx.month_name.clone(),
            day,
            body: reading.body.to_string(),
            warnings,
        });
    }
}

// ── Month context ──────────────────────────────────────────────────

/// Running month state while one document is scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthContext {
    pub year: i32,
    pub month: u8,
    pub month_name: String,
    pub max_days: u8,
    /// Last day numeral read in this month, before clamping
    pub last_day: Option<u8>,
}

impl MonthContext {
    pub fn new(year: i32, month: u8) -> Self {
        Self::named(year, month, calendar::month_name(month))
    }

    pub fn named(year: i32, month: u8, month_name: String) -> Self {
        MonthContext {
            year,
            month,
            month_name,
            max_days: calendar::days_in_month(year, month),
            last_day: None,
        }
    }

    /// Move to the following month, wrapping December into January.
    pub fn advance(&mut self) {
        let (year, month) = if self.month >= 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        *self = MonthContext::new(year, month);
    }

    /// `Some(max)` when `day` does not fit this month.
    pub fn clamp(&self, day: u8) -> Option<u8> {
        (day > self.max_days).then_some(self.max_days)
    }
}

// ── Day reading ────────────────────────────────────────────────────

struct DayReading<'a> {
    day: u8,
    body: &'a str,
    /// The numeral was unreadable and the fallback day was substituted
    fallback: bool,
}

/// Read the leading day numeral. `None` means the entry has none.
fn read_day<'a>(
    index: usize,
    block: &'a RawBlock,
    warnings: &mut Vec<InferenceWarning>,
) -> Option<DayReading<'a>> {
    let prefix = numeral::parse_day_prefix(&block.text)?;
    let fallback = prefix.day.is_none();
    if fallback {
        warnings.push(InferenceWarning::UnknownNumeral {
            index,
            numeral: prefix.numeral.to_string(),
        });
    }
    Some(DayReading {
        day: prefix.day.unwrap_or_else(|| numeral::to_number(prefix.numeral)),
        body: prefix.body,
        fallback,
    })
}

fn heading_label(heading: &str) -> String {
    let heading = heading.trim();
    match heading.find('[') {
        Some(idx) => heading[..idx].trim_end().to_string(),
        None => heading.to_string(),
    }
}

// ── Strategies ─────────────────────────────────────────────────────

/// Date every entry of `doc` with its configured strategy.
pub fn infer_document(doc: &SourceDocument) -> DocumentInference {
    let inference = match &doc.strategy {
        InferenceStrategy::Headings => infer_by_headings(doc.year, &doc.blocks),
        InferenceStrategy::BoundaryTable { ranges } => {
            infer_by_table(doc.year, &doc.blocks, ranges)
        }
        InferenceStrategy::Rollover(params) => infer_by_rollover(doc.year, &doc.blocks, params),
    };
    debug!(
        "event=infer doc={} strategy={} resolved={} dropped={} notices={}",
        doc.id,
        doc.strategy.name(),
        inference.dates.len(),
        inference.dropped.len(),
        inference.notices.len()
    );
    let flagged: Vec<usize> = inference
        .dates
        .iter()
        .filter(|d| d.is_flagged())
        .map(|d| d.index)
        .collect();
    if !flagged.is_empty() {
        debug!("doc={} entries flagged for audit: {flagged:?}", doc.id);
    }
    inference
}

/// Month = most recent month heading.
///
/// An unrecognized heading ends the current run; entries after it are
/// dropped until the next month heading.
pub fn infer_by_headings(year: i32, blocks: &[RawBlock]) -> DocumentInference {
    let mut out = DocumentInference::default();
    let mut ctx: Option<MonthContext> = None;

    for (index, block) in blocks.iter().enumerate() {
        if let Some(heading) = &block.heading {
            ctx = match numeral::parse_month_heading(heading) {
                Some(month) => {
                    debug!("block {index}: month heading {heading} → {month}");
                    Some(MonthContext::named(year, month, heading_label(heading)))
                }
                None => {
                    out.notice(InferenceWarning::UnknownHeading {
                        index,
                        heading: heading.clone(),
                    });
                    None
                }
            };
        }
        if block.is_marker() {
            continue;
        }

        let mut warnings = Vec::new();
        let Some(reading) = read_day(index, block, &mut warnings) else {
            out.drop_entry(InferenceWarning::MissingDayNumeral {
                index,
                preview: preview(&block.text),
            });
            continue;
        };
        let Some(current) = ctx.as_mut() else {
            out.drop_entry(InferenceWarning::NoActiveMonth {
                index,
                preview: preview(&block.text),
            });
            continue;
        };
        out.resolve(current, index, reading, warnings);
    }

    out
}

/// Month = the boundary range containing the block index.
pub fn infer_by_table(year: i32, blocks: &[RawBlock], ranges: &[MonthRange]) -> DocumentInference {
    let mut out = DocumentInference::default();
    let mut ctx: Option<MonthContext> = None;

    for (index, block) in blocks.iter().enumerate() {
        if block.is_marker() {
            continue;
        }

        let mut warnings = Vec::new();
        let Some(reading) = read_day(index, block, &mut warnings) else {
            out.drop_entry(InferenceWarning::MissingDayNumeral {
                index,
                preview: preview(&block.text),
            });
            continue;
        };

        let months: Vec<u8> = ranges
            .iter()
            .filter(|r| r.contains(index))
            .map(|r| r.month)
            .collect();
        let Some(&month) = months.first() else {
            out.drop_entry(InferenceWarning::OutsideBoundaryTable { index });
            continue;
        };
        if months.len() > 1 {
            let w = InferenceWarning::OverlappingBoundary { index, months };
            warn!("{w}");
            warnings.push(w);
        }

        if ctx.as_ref().is_some_and(|c| c.month != month) {
            ctx = None;
        }
        let current = ctx.get_or_insert_with(|| MonthContext::new(year, month));
        out.resolve(current, index, reading, warnings);
    }

    out
}

/// Month tracked positionally from `params.start_month`, advanced on
/// every day-sequence reset.
pub fn infer_by_rollover(
    year: i32,
    blocks: &[RawBlock],
    params: &RolloverParams,
) -> DocumentInference {
    let mut out = DocumentInference::default();
    let mut ctx = MonthContext::new(year, params.start_month);

    for (index, block) in blocks.iter().enumerate() {
        if block.is_marker() {
            continue;
        }

        let mut warnings = Vec::new();
        let Some(reading) = read_day(index, block, &mut warnings) else {
            out.drop_entry(InferenceWarning::MissingDayNumeral {
                index,
                preview: preview(&block.text),
            });
            continue;
        };

        if let Some(prev) = ctx.last_day {
            if !reading.fallback && params.is_rollover(prev, reading.day) {
                let year_before = ctx.year;
                ctx.advance();
                debug!(
                    "entry {index}: day {prev} → {}, month change to {}{}",
                    reading.day, ctx.year, ctx.month_name
                );
                if ctx.year != year_before {
                    let w = InferenceWarning::YearAdvanced {
                        index,
                        year: ctx.year,
                    };
                    warn!("{w}");
                    warnings.push(w);
                }
            }
        }
        out.resolve(&mut ctx, index, reading, warnings);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(days: &[&str]) -> Vec<RawBlock> {
        days.iter()
            .map(|d| RawBlock::entry(format!("{d}日 晴。")))
            .collect()
    }

    fn months(inf: &DocumentInference) -> Vec<u8> {
        inf.dates.iter().map(|d| d.month).collect()
    }

    fn days(inf: &DocumentInference) -> Vec<u8> {
        inf.dates.iter().map(|d| d.day).collect()
    }

    // ── headings ─────────────────────────────────────────────────────

    #[test]
    fn test_headings_assign_runs() {
        let blocks = vec![
            RawBlock::headed("五月", "一日 晴。"),
            RawBlock::entry("十五日 雨。"),
            RawBlock::entry("三日 陰。"),
            RawBlock::headed("六月", ""),
            RawBlock::entry("二十日 晴。"),
            RawBlock::entry("二日 雪。"),
        ];
        let inf = infer_by_headings(1912, &blocks);
        assert_eq!(months(&inf), vec![5, 5, 5, 6, 6]);
        assert_eq!(days(&inf), vec![1, 15, 3, 20, 2]);
        assert_eq!(inf.dates[3].index, 4);
        assert_eq!(inf.dates[3].month_name, "六月");
        assert!(inf.dropped.is_empty());
    }

    #[test]
    fn test_headings_keep_leap_month_name() {
        let blocks = vec![RawBlock::headed("閏二月[编辑]", "三日 晴。")];
        let inf = infer_by_headings(1916, &blocks);
        assert_eq!(inf.dates[0].month, 2);
        assert_eq!(inf.dates[0].month_name, "閏二月");
    }

    #[test]
    fn test_headings_drop_entries_before_first_heading() {
        let blocks = vec![
            RawBlock::entry("一日 晴。"),
            RawBlock::headed("正月", "二日 晴。"),
        ];
        let inf = infer_by_headings(1916, &blocks);
        assert_eq!(months(&inf), vec![1]);
        assert!(matches!(
            inf.dropped[0],
            InferenceWarning::NoActiveMonth { index: 0, .. }
        ));
    }

    #[test]
    fn test_headings_unknown_heading_ends_run() {
        let blocks = vec![
            RawBlock::headed("五月", "一日 晴。"),
            RawBlock::headed("附錄", "二日 雨。"),
            RawBlock::headed("六月", "三日 雨。"),
        ];
        let inf = infer_by_headings(1912, &blocks);
        assert_eq!(months(&inf), vec![5, 6]);
        assert_eq!(inf.dropped.len(), 1);
        assert!(matches!(
            inf.notices[0],
            InferenceWarning::UnknownHeading { index: 1, .. }
        ));
    }

    #[test]
    fn test_missing_day_numeral_is_dropped() {
        let blocks = vec![
            RawBlock::headed("五月", "一日 晴。"),
            RawBlock::entry("夜雨，無事。"),
            RawBlock::entry("三日 晴。"),
        ];
        let inf = infer_by_headings(1912, &blocks);
        assert_eq!(days(&inf), vec![1, 3]);
        assert_eq!(inf.processed(), 3);
        assert!(matches!(
            &inf.dropped[0],
            InferenceWarning::MissingDayNumeral { index: 1, preview } if preview == "夜雨，無事。"
        ));
    }

    #[test]
    fn test_headings_clamp_day() {
        let blocks = vec![RawBlock::headed("二月", "三十日 晴。")];
        let inf = infer_by_headings(1913, &blocks);
        assert_eq!(days(&inf), vec![28]);
        assert!(inf.dates[0].is_flagged());
    }

    // ── rollover ─────────────────────────────────────────────────────

    fn rollover(start_month: u8) -> RolloverParams {
        RolloverParams {
            start_month,
            ..RolloverParams::default()
        }
    }

    #[test]
    fn test_rollover_month_end_reset() {
        let inf = infer_by_rollover(1912, &entries(&["二十九", "三十", "一", "二"]), &rollover(5));
        assert_eq!(months(&inf), vec![5, 5, 6, 6]);
        assert_eq!(days(&inf), vec![29, 30, 1, 2]);
        assert_eq!(inf.warnings().count(), 0);
    }

    #[test]
    fn test_rollover_drop_of_fifteen_is_not_a_reset() {
        let inf = infer_by_rollover(1912, &entries(&["二十五", "十", "二十五"]), &rollover(5));
        assert_eq!(months(&inf), vec![5, 5, 5]);
    }

    #[test]
    fn test_rollover_rise_is_not_a_reset() {
        let inf = infer_by_rollover(1912, &entries(&["十", "二十五"]), &rollover(5));
        assert_eq!(months(&inf), vec![5, 5]);
    }

    #[test]
    fn test_rollover_drop_of_sixteen_is_a_reset() {
        let inf = infer_by_rollover(1912, &entries(&["二十六", "十"]), &rollover(5));
        assert_eq!(months(&inf), vec![5, 6]);
    }

    #[test]
    fn test_rollover_thresholds_are_configurable() {
        let params = RolloverParams {
            start_month: 5,
            max_drop: 5,
            ..RolloverParams::default()
        };
        let inf = infer_by_rollover(1912, &entries(&["十二", "六"]), &params);
        assert_eq!(months(&inf), vec![5, 6]);
    }

    #[test]
    fn test_rollover_clamps_to_month_length() {
        // 6th month has 30 days
        let inf = infer_by_rollover(1912, &entries(&["二十九", "三十一"]), &rollover(6));
        assert_eq!(days(&inf), vec![29, 30]);
        assert_eq!(
            inf.dates[1].warnings,
            vec![InferenceWarning::DayClamped {
                index: 1,
                month: 6,
                day: 31,
                max: 30,
            }]
        );
    }

    #[test]
    fn test_rollover_leap_february() {
        let inf = infer_by_rollover(1912, &entries(&["二十九"]), &rollover(2));
        assert_eq!(days(&inf), vec![29]);
        assert!(inf.dates[0].warnings.is_empty());
        let inf = infer_by_rollover(1913, &entries(&["二十九"]), &rollover(2));
        assert_eq!(days(&inf), vec![28]);
    }

    #[test]
    fn test_rollover_wraps_into_next_year() {
        let inf = infer_by_rollover(1912, &entries(&["三十一", "一"]), &rollover(12));
        assert_eq!(months(&inf), vec![12, 1]);
        assert_eq!(inf.dates[1].year, 1913);
        assert_eq!(inf.dates[1].month_name, "正月");
        assert!(inf.dates[1].is_flagged());
    }

    #[test]
    fn test_rollover_fallback_numeral_does_not_reset() {
        let blocks = vec![
            RawBlock::entry("二十九日 晴。"),
            RawBlock::entry("十十日 雨。"),
            RawBlock::entry("三十日 晴。"),
        ];
        let inf = infer_by_rollover(1912, &blocks, &rollover(5));
        assert_eq!(months(&inf), vec![5, 5, 5]);
        assert_eq!(days(&inf), vec![29, 1, 30]);
        assert!(matches!(
            &inf.dates[1].warnings[0],
            InferenceWarning::UnknownNumeral { numeral, .. } if numeral == "十十"
        ));
    }

    // ── boundary table ───────────────────────────────────────────────

    #[test]
    fn test_table_assigns_by_index() {
        let ranges = vec![
            MonthRange {
                start: 0,
                end: 1,
                month: 5,
            },
            MonthRange {
                start: 2,
                end: 3,
                month: 6,
            },
        ];
        let inf = infer_by_table(1912, &entries(&["五", "二十", "一", "二", "三"]), &ranges);
        assert_eq!(months(&inf), vec![5, 5, 6, 6]);
        assert!(matches!(
            inf.dropped[0],
            InferenceWarning::OutsideBoundaryTable { index: 4 }
        ));
    }

    #[test]
    fn test_table_overlap_is_flagged() {
        let ranges = vec![
            MonthRange {
                start: 0,
                end: 1,
                month: 5,
            },
            MonthRange {
                start: 1,
                end: 2,
                month: 6,
            },
        ];
        let inf = infer_by_table(1912, &entries(&["三十", "三十一", "一"]), &ranges);
        assert_eq!(months(&inf), vec![5, 5, 6]);
        assert!(inf.dates[1].is_flagged());
        assert!(!inf.dates[0].is_flagged());
    }

    // ── strategy config ──────────────────────────────────────────────

    #[test]
    fn test_strategy_from_json() {
        let s: InferenceStrategy =
            serde_json::from_str(r#"{"mode":"rollover","start_month":5}"#).unwrap();
        assert_eq!(
            s,
            InferenceStrategy::Rollover(RolloverParams {
                start_month: 5,
                ..RolloverParams::default()
            })
        );
        let s: InferenceStrategy = serde_json::from_str(
            r#"{"mode":"boundary_table","ranges":[{"start":0,"end":30,"month":5}]}"#,
        )
        .unwrap();
        assert_eq!(s.name(), "boundary_table");
        let s: InferenceStrategy = serde_json::from_str(r#"{"mode":"headings"}"#).unwrap();
        assert_eq!(s, InferenceStrategy::Headings);
    }
}
