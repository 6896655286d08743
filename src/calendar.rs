//! Day-count table and month names for the diary calendar.

use crate::numeral;

/// Gregorian leap-year rule.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` of `year`. Unknown months count as 30.
pub fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 30,
    }
}

/// Display name of a month: 正月 for the first, 二月 … 十二月 otherwise.
pub fn month_name(month: u8) -> String {
    match month {
        1 => "正月".to_string(),
        m => format!("{}月", numeral::to_text(m)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(1912));
        assert!(is_leap_year(1916));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(1913));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(1912, 2), 29);
        assert_eq!(days_in_month(1913, 2), 28);
        assert_eq!(days_in_month(1912, 6), 30);
        assert_eq!(days_in_month(1912, 12), 31);
        assert_eq!(days_in_month(1912, 13), 30);
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), "正月");
        assert_eq!(month_name(5), "五月");
        assert_eq!(month_name(11), "十一月");
    }
}
