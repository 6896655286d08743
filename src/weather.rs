//! Weather token extraction from entry text.
//!
//! Patterns are tried in list order and the first one that matches
//! anywhere in the text wins, so compound terms are listed before the
//! single characters they contain.

use std::sync::LazyLock;

use regex::Regex;

// Real data examples:
//   晴。上午往部。
//   雨，終日未出門。
//   晴，午後大風。
//   曇。晚小雨。
const PATTERNS: &[&str] = &[
    // Sunny turning windy within the same sentence
    r"晴，[^。]*?[風风]",
    // Compound intensities
    r"大雨",
    r"小雨",
    r"暴雨",
    r"大雪",
    r"微雪",
    r"大[風风]",
    // Single characters closed by punctuation
    r"晴[。，]",
    r"雨[。，]",
    r"[陰阴][。，]",
    r"雪[。，]",
    r"[風风][。，]",
    // Overcast, written bare
    r"[曇昙]",
];

static WEATHER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    PATTERNS
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
});

/// Return the first weather token found, trimmed of trailing punctuation.
pub fn extract(text: &str) -> Option<String> {
    WEATHER_PATTERNS.iter().find_map(|re| {
        re.find(text).map(|m| {
            m.as_str()
                .trim_end_matches(['。', '，'])
                .to_string()
        })
    })
}
