//! Holiday versus festival classification and summary cleanup.

use std::sync::LazyLock;

use regex::Regex;

use calengine_core::{EventCategory, HolidayRecord};

/// Statutory holidays. A bare name (no parenthesized suffix) is a day off.
const MAJOR_HOLIDAYS: [&str; 7] = ["元旦", "春节", "清明", "劳动", "端午", "中秋", "国庆"];

const DAY_OFF_MARKERS: [&str; 4] = ["（休）", "（班）", "(休)", "(班)"];

static FULL_WIDTH_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s*（(.*?)）\s*$").expect("Invalid full-width paren regex"));

static TIGHT_ASCII_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?\S)\((.*?)\)\s*$").expect("Invalid ascii paren regex"));

/// Why a record was classified the way it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    SpecialDayMarker,
    DayOffMarker,
    MajorHoliday,
    Fallback,
}

impl Rule {
    pub fn category(&self) -> EventCategory {
        match self {
            Self::Fallback => EventCategory::Festival,
            _ => EventCategory::Holiday,
        }
    }
}

/// First matching rule for a record.
pub fn classify(record: &HolidayRecord) -> Rule {
    let summary = record.summary.as_str();
    if record.special_day.is_some() {
        Rule::SpecialDayMarker
    } else if DAY_OFF_MARKERS.iter().any(|m| summary.contains(m)) {
        Rule::DayOffMarker
    } else if !summary.contains('（')
        && !summary.contains('(')
        && MAJOR_HOLIDAYS.iter().any(|name| summary.contains(name))
    {
        Rule::MajorHoliday
    } else {
        Rule::Fallback
    }
}

/// Canonical form of a holiday summary.
///
/// 清明 becomes 清明节, and parenthesized suffixes become `"X (y)"` with ASCII
/// parentheses. Applying it twice changes nothing.
pub fn normalize_summary(summary: &str) -> String {
    let trimmed = summary.trim();

    let spaced = if let Some(caps) = FULL_WIDTH_PARENS.captures(trimmed) {
        format!("{} ({})", &caps[1], &caps[2])
    } else if let Some(caps) = TIGHT_ASCII_PARENS.captures(trimmed) {
        format!("{} ({})", &caps[1], &caps[2])
    } else {
        trimmed.to_string()
    };

    expand_qingming(&spaced)
}

fn expand_qingming(summary: &str) -> String {
    let (head, tail) = match summary.find(" (") {
        Some(at) => summary.split_at(at),
        None => (summary, ""),
    };
    if head == "清明" {
        format!("清明节{tail}")
    } else {
        summary.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calengine_core::SpecialDay;
    use chrono::NaiveDate;

    fn record(summary: &str) -> HolidayRecord {
        HolidayRecord::new(NaiveDate::from_ymd_opt(2025, 1, 29).unwrap(), summary)
    }

    mod rules {
        use super::*;

        #[test]
        fn special_day_marker_wins() {
            let marked = record("立春").with_special_day(SpecialDay::WorkHoliday);
            assert_eq!(classify(&marked), Rule::SpecialDayMarker);
            assert_eq!(classify(&marked).category(), EventCategory::Holiday);
        }

        #[test]
        fn day_off_markers() {
            assert_eq!(classify(&record("春节（休）")), Rule::DayOffMarker);
            assert_eq!(classify(&record("春节 (班)")), Rule::DayOffMarker);
        }

        #[test]
        fn bare_major_names() {
            assert_eq!(classify(&record("春节")), Rule::MajorHoliday);
            assert_eq!(classify(&record("国庆节")), Rule::MajorHoliday);
        }

        #[test]
        fn decorated_major_name_is_festival() {
            assert_eq!(classify(&record("中秋（农历八月十五）")), Rule::Fallback);
        }

        #[test]
        fn everything_else_is_festival() {
            assert_eq!(classify(&record("立春")).category(), EventCategory::Festival);
            assert_eq!(classify(&record("母亲节")).category(), EventCategory::Festival);
        }
    }

    mod summaries {
        use super::*;

        #[test]
        fn full_width_parens_become_ascii() {
            assert_eq!(normalize_summary("春节（休）"), "春节 (休)");
        }

        #[test]
        fn tight_ascii_parens_get_a_space() {
            assert_eq!(normalize_summary("国庆节(班)"), "国庆节 (班)");
            assert_eq!(normalize_summary("国庆节 (班)"), "国庆节 (班)");
        }

        #[test]
        fn qingming_is_expanded_once() {
            assert_eq!(normalize_summary("清明"), "清明节");
            assert_eq!(normalize_summary("清明节"), "清明节");
            assert_eq!(normalize_summary("清明（休）"), "清明节 (休)");
        }

        #[test]
        fn idempotent() {
            for raw in ["春节（休）", "清明", "国庆节(班)", "立春", " 元旦 "] {
                let once = normalize_summary(raw);
                assert_eq!(normalize_summary(&once), once, "{raw}");
            }
        }
    }
}
