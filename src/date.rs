// Copyright 2018 The GeoRust Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//	http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Date parsing and formatting for values found in JSON records.
//!
//! A date may be given as text (`"2020-05-18"`, `"2020/05/18 10:30"`, RFC 3339)
//! or as a timestamp in milliseconds, either a number or numeric text. Dates
//! are read and printed in UTC.
//!
//! Formats use the `YYYY-MM-DD HH:mm:ss` token style:
//!
//! | Token | Output |
//! |---|---|
//! | `YYYY`, `YY` | year, two-digit year |
//! | `MMMM`, `MMM`, `MM`, `M` | month name, short name, padded, plain |
//! | `DD`, `D` | day of the month, padded or plain |
//! | `dddd`, `ddd`, `d` | weekday name, short name, number (Sunday is 0) |
//! | `HH`, `H`, `hh`, `h` | hour on 24 or 12 hours, padded or plain |
//! | `mm`, `m`, `ss`, `s` | minutes and seconds, padded or plain |
//! | `SSS` | milliseconds |
//! | `A`, `a` | `AM`/`PM`, `am`/`pm` |
//! | `ZZ`, `Z` | UTC offset, `+0000` or `+00:00` |
//! | `[text]` | `text`, unchanged |
//!
//! ```
//! use geostar_util::date::date_string;
//! use serde_json::json;
//!
//! assert_eq!(date_string(&json!(1589760000000u64), None), Some("2020-05-18".to_owned()));
//! assert_eq!(date_string(&json!("2020/5/18"), Some("D MMM YYYY")), Some("18 May 2020".to_owned()));
//! ```

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::json::JsonValue;
use crate::util;

/// Format used by [`date_string`] when none is given.
pub const DATE_FORMAT: &str = "YYYY-MM-DD";
/// Format used by [`datetime_string`] when none is given.
pub const DATETIME_FORMAT: &str = "YYYY-MM-DD HH:mm";

const DATETIME_PATTERNS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

fn from_millis(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() {
        return None;
    }
    Utc.timestamp_millis_opt(ms.trunc() as i64).single()
}

fn parse_text(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Some(date.with_timezone(&Utc));
    }
    let s = s.replace('/', "-");
    let naive = DATETIME_PATTERNS
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(&s, pattern).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        });
    match naive {
        Some(naive) => Some(Utc.from_utc_datetime(&naive)),
        // Numeric text is a timestamp.
        None => s.parse::<f64>().ok().and_then(from_millis),
    }
}

/// Read a date from text or from a millisecond timestamp. Anything else, and
/// text that is neither a date nor a number, gives `None`.
pub fn parse_date(value: &JsonValue) -> Option<DateTime<Utc>> {
    let date = match value {
        JsonValue::Number(n) => n.as_f64().and_then(from_millis),
        JsonValue::String(s) => parse_text(s),
        _ => None,
    };
    if date.is_none() {
        log::debug!("{} is neither a date nor a timestamp", value);
    }
    date
}

/// Whether [`parse_date`] can read a date from `value`.
pub fn is_valid_date(value: &JsonValue) -> bool {
    parse_date(value).is_some()
}

/// Translate a `YYYY-MM-DD` style format into a chrono format string.
fn to_strftime(format: &str) -> String {
    let chars: Vec<char> = format.chars().collect();
    let mut out = String::with_capacity(format.len() * 2);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '[' {
            if let Some(close) = chars[i..].iter().position(|&x| x == ']') {
                for &literal in &chars[i + 1..i + close] {
                    push_literal(&mut out, literal);
                }
                i += close + 1;
                continue;
            }
        }
        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        let (spec, used) = match (c, run) {
            ('Y', 4..) => ("%Y", 4),
            ('Y', 2..) => ("%y", 2),
            ('M', 4..) => ("%B", 4),
            ('M', 3) => ("%b", 3),
            ('M', 2) => ("%m", 2),
            ('M', 1) => ("%-m", 1),
            ('D', 2..) => ("%d", 2),
            ('D', 1) => ("%-d", 1),
            ('d', 4..) => ("%A", 4),
            ('d', 3) => ("%a", 3),
            ('d', _) => ("%w", 1),
            ('H', 2..) => ("%H", 2),
            ('H', 1) => ("%-H", 1),
            ('h', 2..) => ("%I", 2),
            ('h', 1) => ("%-I", 1),
            ('m', 2..) => ("%M", 2),
            ('m', 1) => ("%-M", 1),
            ('s', 2..) => ("%S", 2),
            ('s', 1) => ("%-S", 1),
            ('S', 3..) => ("%3f", 3),
            ('A', _) => ("%p", 1),
            ('a', _) => ("%P", 1),
            ('Z', 2..) => ("%z", 2),
            ('Z', 1) => ("%:z", 1),
            _ => {
                push_literal(&mut out, c);
                i += 1;
                continue;
            }
        };
        out.push_str(spec);
        i += used;
    }
    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

/// Print `date` with a `YYYY-MM-DD` style format.
pub fn format_date(date: &DateTime<Utc>, format: &str) -> String {
    date.format(&to_strftime(format)).to_string()
}

/// Format the date read from `value`, with [`DATE_FORMAT`] unless `format` is
/// given. A falsy value (`null`, `0`, `""`, `false`) or one that holds no
/// date gives `None`.
pub fn date_string(value: &JsonValue, format: Option<&str>) -> Option<String> {
    if !util::is_truthy(value) {
        return None;
    }
    parse_date(value).map(|date| format_date(&date, format.unwrap_or(DATE_FORMAT)))
}

/// Same as [`date_string`], defaulting to [`DATETIME_FORMAT`].
pub fn datetime_string(value: &JsonValue, format: Option<&str>) -> Option<String> {
    date_string(value, Some(format.unwrap_or(DATETIME_FORMAT)))
}

/// Today's local date as year, month and day joined by `separator`.
pub fn now_date(separator: &str) -> String {
    let separator = separator.replace('%', "%%");
    Local::now()
        .format(&format!("%Y{0}%m{0}%d", separator))
        .to_string()
}

/// Number of days in `month` (1 to 12) of `year`.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    if month == 0 || month > 12 {
        return None;
    }
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|last| last.day())
}

/// Whole seconds in `ms` milliseconds, rounded down.
pub fn ms_to_seconds(ms: i64) -> i64 {
    ms.div_euclid(1000)
}

/// Whole minutes in `ms` milliseconds, rounded down.
pub fn ms_to_minutes(ms: i64) -> i64 {
    ms_to_seconds(ms).div_euclid(60)
}

/// Whole hours in `ms` milliseconds, rounded down.
pub fn ms_to_hours(ms: i64) -> i64 {
    ms_to_minutes(ms).div_euclid(60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // 2020-05-18 11:30:00.123 UTC, a Monday.
    const MONDAY_MORNING: i64 = 1589801400123;

    fn monday_morning() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(MONDAY_MORNING).unwrap()
    }

    #[test]
    fn parse_dates_from_text_and_numbers() {
        let midnight = Utc.with_ymd_and_hms(2020, 5, 18, 0, 0, 0).unwrap();
        assert_eq!(parse_date(&json!("2020-05-18")), Some(midnight));
        assert_eq!(parse_date(&json!("2020/05/18")), Some(midnight));
        assert_eq!(parse_date(&json!("2020/5/18")), Some(midnight));
        assert_eq!(parse_date(&json!(1589760000000u64)), Some(midnight));
        assert_eq!(parse_date(&json!("1589760000000")), Some(midnight));
        assert_eq!(
            parse_date(&json!("2020-05-18 10:30")),
            Utc.with_ymd_and_hms(2020, 5, 18, 10, 30, 0).single()
        );
        assert_eq!(
            parse_date(&json!("2020-05-18T10:30:05")),
            Utc.with_ymd_and_hms(2020, 5, 18, 10, 30, 5).single()
        );
        assert_eq!(
            parse_date(&json!("2020-05-18T02:30:00+08:00")),
            Utc.with_ymd_and_hms(2020, 5, 17, 18, 30, 0).single()
        );
    }

    #[test]
    fn invalid_dates() {
        assert!(!is_valid_date(&json!("not a date")));
        assert!(!is_valid_date(&json!("2020-13-01")));
        assert!(!is_valid_date(&json!(true)));
        assert!(!is_valid_date(&json!({"year": 2020})));
        assert!(is_valid_date(&json!(0)));
    }

    #[test]
    fn format_tokens() {
        let date = monday_morning();
        assert_eq!(format_date(&date, "YYYY-MM-DD HH:mm:ss.SSS"), "2020-05-18 11:30:00.123");
        assert_eq!(format_date(&date, "D/M/YY"), "18/5/20");
        assert_eq!(format_date(&date, "dddd, MMMM D"), "Monday, May 18");
        assert_eq!(format_date(&date, "ddd MMM d"), "Mon May 1");
        assert_eq!(format_date(&date, "h:mm A"), "11:30 AM");
        assert_eq!(format_date(&date, "HH:mm Z"), "11:30 +00:00");
        assert_eq!(format_date(&date, "[Year] YYYY, 100%"), "Year 2020, 100%");
    }

    #[test]
    fn date_and_datetime_strings() {
        let ts = json!(MONDAY_MORNING);
        assert_eq!(date_string(&ts, None), Some("2020-05-18".to_owned()));
        assert_eq!(datetime_string(&ts, None), Some("2020-05-18 11:30".to_owned()));
        assert_eq!(datetime_string(&ts, Some("HH:mm:ss")), Some("11:30:00".to_owned()));
        assert_eq!(date_string(&json!(0), None), None);
        assert_eq!(date_string(&json!(""), None), None);
        assert_eq!(date_string(&JsonValue::Null, None), None);
        assert_eq!(date_string(&json!("someday"), None), None);
    }

    #[test]
    fn today() {
        let today = now_date("/");
        assert_eq!(today.len(), 10);
        assert!(NaiveDate::parse_from_str(&today, "%Y/%m/%d").is_ok());
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2020, 5), Some(31));
        assert_eq!(days_in_month(2020, 2), Some(29));
        assert_eq!(days_in_month(2021, 2), Some(28));
        assert_eq!(days_in_month(2021, 4), Some(30));
        assert_eq!(days_in_month(2021, 12), Some(31));
        assert_eq!(days_in_month(2021, 0), None);
        assert_eq!(days_in_month(2021, 13), None);
    }

    #[test]
    fn millisecond_conversions() {
        assert_eq!(ms_to_seconds(1999), 1);
        assert_eq!(ms_to_minutes(119_999), 1);
        assert_eq!(ms_to_hours(7_200_000), 2);
        assert_eq!(ms_to_hours(7_199_999), 1);
        assert_eq!(ms_to_seconds(-1500), -2);
    }
}
