//! Traditional numeral codec for diary day and month positions.
//!
//! Diary pages write days as 一日 … 三十一日 and months as 正月 … 十二月,
//! sometimes with a 閏 (leap) prefix. Only the closed 1–31 range the
//! sources use is supported.

use std::sync::LazyLock;

use log::warn;
use regex::Regex;

/// Value substituted for a numeral that cannot be read.
pub const FALLBACK_DAY: u8 = 1;

// Leading day numeral of an entry, e.g. "　　十三日 晴。" → "十三".
static RE_DAY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([一二三四五六七八九十]+)日").unwrap());

/// Single numeral character → value 1–9.
fn cn_digit(c: char) -> Option<u8> {
    match c {
        '一' => Some(1),
        '二' => Some(2),
        '三' => Some(3),
        '四' => Some(4),
        '五' => Some(5),
        '六' => Some(6),
        '七' => Some(7),
        '八' => Some(8),
        '九' => Some(9),
        _ => None,
    }
}

const DIGITS: [char; 10] = ['〇', '一', '二', '三', '四', '五', '六', '七', '八', '九'];

/// Strict parse of a day numeral, with or without the trailing 日.
///
/// Handles 一–九, 十, 十一–十九, 二十, 三十, 二十一–三十一.
/// Returns `None` outside 1–31.
pub fn parse_day(s: &str) -> Option<u8> {
    let s = s.trim();
    let s = s.strip_suffix('日').unwrap_or(s);
    let chars: Vec<char> = s.chars().collect();
    let n = match chars.as_slice() {
        ['十'] => 10,
        ['十', d] => 10 + cn_digit(*d)?,
        [c] => cn_digit(*c)?,
        [d, '十'] => cn_digit(*d)? * 10,
        [d1, '十', d2] => cn_digit(*d1)? * 10 + cn_digit(*d2)?,
        _ => return None,
    };
    (1..=31).contains(&n).then_some(n)
}

/// Lenient day numeral → number.
///
/// Unrecognized input yields [`FALLBACK_DAY`] so that one malformed token
/// does not abort a whole document. The fallback is logged as a warning.
pub fn to_number(s: &str) -> u8 {
    match parse_day(s) {
        Some(n) => n,
        None => {
            warn!("unrecognized day numeral `{s}`, using {FALLBACK_DAY}");
            FALLBACK_DAY
        }
    }
}

/// Number → numeral text, the inverse of [`parse_day`] for 1–31.
///
/// 11 is written 十一, not 一十一. Values above 99 are written digit by digit.
pub fn to_text(n: u8) -> String {
    let digit = |d: u8| DIGITS[d as usize];
    match n {
        0..=9 => digit(n).to_string(),
        10 => "十".to_string(),
        11..=19 => format!("十{}", digit(n - 10)),
        20..=99 if n % 10 == 0 => format!("{}十", digit(n / 10)),
        20..=99 => format!("{}十{}", digit(n / 10), digit(n % 10)),
        _ => n.to_string().bytes().map(|b| digit(b - b'0')).collect(),
    }
}

/// Year written digit by digit, e.g. 1912 → 一九一二年.
pub fn year_label(year: i32) -> String {
    let digits: String = year
        .unsigned_abs()
        .to_string()
        .bytes()
        .map(|b| DIGITS[(b - b'0') as usize])
        .collect();
    format!("{digits}年")
}

/// A day numeral found at the start of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayPrefix<'a> {
    /// Numeral as written, without 日
    pub numeral: &'a str,
    /// Parsed value, `None` when the numeral is malformed
    pub day: Option<u8>,
    /// Entry text after the day marker, trimmed
    pub body: &'a str,
}

/// Locate the leading day numeral of an entry.
///
/// Returns `None` when the text does not start with `<numeral>日`.
pub fn parse_day_prefix(text: &str) -> Option<DayPrefix<'_>> {
    let caps = RE_DAY_PREFIX.captures(text)?;
    let numeral = caps.get(1)?.as_str();
    let end = caps.get(0)?.end();
    Some(DayPrefix {
        numeral,
        day: parse_day(numeral),
        body: text[end..].trim(),
    })
}

/// Parse a month heading → month number (1–12).
///
/// Accepts 正月, 一月–十二月, 冬月, 臘月/腊月, and leap months with the
/// 閏/闰 prefix. Leap months return their base month number. A trailing
/// wiki edit marker such as `[编辑]` is ignored.
pub fn parse_month_heading(s: &str) -> Option<u8> {
    let s = s.trim();
    let s = match s.find('[') {
        Some(idx) => s[..idx].trim_end(),
        None => s,
    };
    let s = s.strip_suffix('月')?;
    let base = s
        .strip_prefix('閏')
        .or_else(|| s.strip_prefix('闰'))
        .unwrap_or(s);
    let m = match base {
        "正" => 1,
        "冬" => 11,
        "臘" | "腊" => 12,
        _ => parse_day(base)?,
    };
    (1..=12).contains(&m).then_some(m)
}
