//! Free-text recurrence hints and bounded instance expansion.
//!
//! Patterns are recognised by an ordered rule table (first match wins), so
//! "every 2 weeks" is read as a two-week interval before the bare "weekly"
//! rules are consulted. Expansion never drifts: instance `k` is always
//! `basis + k * interval`, computed from the basis date rather than from the
//! previous instance.

use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, Days, Months, NaiveDate};
use regex::Regex;
use thiserror::Error;

/// Errors that can occur while building a recurrence pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecurrenceError {
    #[error("recurrence interval must be positive")]
    ZeroInterval,
}

/// Calendar unit a pattern advances by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecurrenceUnit {
    Day,
    Week,
    Month,
    Year,
}

impl RecurrenceUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

struct PatternRule {
    regex: Regex,
    unit: RecurrenceUnit,
}

impl PatternRule {
    fn new(pattern: &str, unit: RecurrenceUnit) -> Self {
        Self {
            regex: Regex::new(&format!("(?i){pattern}")).expect("Invalid recurrence regex"),
            unit,
        }
    }
}

/// Ordered recurrence rules. A rule with a capture group reads the interval from it.
static RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    use RecurrenceUnit::{Day, Month, Week, Year};
    vec![
        PatternRule::new(r"\bevery\s+day\b", Day),
        PatternRule::new(r"\bdaily\b", Day),
        PatternRule::new(r"\bevery\s+(\d+)\s+days?\b", Day),
        PatternRule::new(r"\brepeat:\s*daily\b", Day),
        PatternRule::new(r"\brepeat\s+(\d+)\s+days?\b", Day),
        PatternRule::new(r"\bevery\s+week\b", Week),
        PatternRule::new(r"\bweekly\b", Week),
        PatternRule::new(r"\bevery\s+(\d+)\s+weeks?\b", Week),
        PatternRule::new(r"\brepeat:\s*weekly\b", Week),
        PatternRule::new(r"\bevery\s+month\b", Month),
        PatternRule::new(r"\bmonthly\b", Month),
        PatternRule::new(r"\bevery\s+(\d+)\s+months?\b", Month),
        PatternRule::new(r"\brepeat:\s*monthly\b", Month),
        PatternRule::new(r"\bevery\s+year\b", Year),
        PatternRule::new(r"\byearly\b", Year),
        PatternRule::new(r"\bannually\b", Year),
        PatternRule::new(r"\bevery\s+(\d+)\s+years?\b", Year),
        PatternRule::new(r"\brepeat:\s*yearly\b", Year),
    ]
});

/// A unit and a positive interval, e.g. "every 2 weeks".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecurrencePattern {
    unit: RecurrenceUnit,
    interval: u32,
}

impl RecurrencePattern {
    pub fn new(unit: RecurrenceUnit, interval: u32) -> Result<Self, RecurrenceError> {
        if interval == 0 {
            return Err(RecurrenceError::ZeroInterval);
        }
        Ok(Self { unit, interval })
    }

    pub fn unit(&self) -> RecurrenceUnit {
        self.unit
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Finds the first matching rule in `text`.
    ///
    /// A rule whose captured interval is zero or unparseable is skipped and
    /// matching continues with the next rule.
    pub fn parse(text: &str) -> Option<Self> {
        RULES.iter().find_map(|rule| {
            let caps = rule.regex.captures(text)?;
            let interval = match caps.get(1) {
                Some(m) => m.as_str().parse().ok()?,
                None => 1,
            };
            Self::new(rule.unit, interval).ok()
        })
    }

    /// The `k`-th instance relative to `basis` (negative `k` goes backwards).
    ///
    /// Month and year steps clamp to the last day of shorter months.
    /// Returns `None` when the result leaves chrono's date range.
    pub fn nth(&self, basis: NaiveDate, k: i64) -> Option<NaiveDate> {
        let amount = k.unsigned_abs().checked_mul(u64::from(self.interval))?;
        let forward = k >= 0;

        match self.unit {
            RecurrenceUnit::Day => shift_days(basis, amount, forward),
            RecurrenceUnit::Week => shift_days(basis, amount.checked_mul(7)?, forward),
            RecurrenceUnit::Month => shift_months(basis, amount, forward),
            RecurrenceUnit::Year => shift_months(basis, amount.checked_mul(12)?, forward),
        }
    }

    /// Builds a bounded expansion starting at `basis`.
    pub fn expand(&self, basis: NaiveDate, window: ExpansionWindow) -> Expansion {
        Expansion {
            pattern: *self,
            basis,
            window,
        }
    }
}

impl fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.interval == 1 {
            write!(f, "every {}", self.unit.as_str())
        } else {
            write!(f, "every {} {}s", self.interval, self.unit.as_str())
        }
    }
}

fn shift_days(date: NaiveDate, days: u64, forward: bool) -> Option<NaiveDate> {
    if forward {
        date.checked_add_days(Days::new(days))
    } else {
        date.checked_sub_days(Days::new(days))
    }
}

fn shift_months(date: NaiveDate, months: u64, forward: bool) -> Option<NaiveDate> {
    let months = Months::new(u32::try_from(months).ok()?);
    if forward {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    }
}

/// Which instances of an expansion are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionWindow {
    /// Instances before this date are skipped. `None` starts at the basis.
    pub start: Option<NaiveDate>,
    /// Number of instances emitted.
    pub count: u32,
}

impl ExpansionWindow {
    /// `count` instances starting at the basis.
    pub fn forward(count: u32) -> Self {
        Self { start: None, count }
    }

    /// `count` instances starting at the first one on or after `start`.
    pub fn from_date(start: NaiveDate, count: u32) -> Self {
        Self {
            start: Some(start),
            count,
        }
    }
}

/// A finite, restartable sequence of occurrence dates.
///
/// Iterating twice yields the same dates. Dates are strictly increasing and
/// never precede the basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expansion {
    pattern: RecurrencePattern,
    basis: NaiveDate,
    window: ExpansionWindow,
}

impl Expansion {
    /// Index of the first instance on or after the window start.
    ///
    /// Day and week steps are exact. Month and year steps start from a lower
    /// bound and move forward at most twice, since month-end clamping can only
    /// pull an instance earlier within its month.
    fn first_index(&self) -> Option<i64> {
        let Some(start) = self.window.start.filter(|s| *s > self.basis) else {
            return Some(0);
        };
        let interval = i64::from(self.pattern.interval);

        let mut k = match self.pattern.unit {
            RecurrenceUnit::Day | RecurrenceUnit::Week => {
                let step = if self.pattern.unit == RecurrenceUnit::Week { interval * 7 } else { interval };
                let days = (start - self.basis).num_days();
                return Some((days + step - 1) / step);
            }
            RecurrenceUnit::Month => month_span(self.basis, start) / interval,
            RecurrenceUnit::Year => month_span(self.basis, start) / (interval * 12),
        };
        while self.pattern.nth(self.basis, k)? < start {
            k += 1;
        }
        Some(k)
    }

    pub fn iter(&self) -> ExpansionIter {
        match self.first_index() {
            Some(first) => ExpansionIter {
                pattern: self.pattern,
                basis: self.basis,
                next: first,
                end: first.saturating_add(i64::from(self.window.count)),
            },
            None => ExpansionIter {
                pattern: self.pattern,
                basis: self.basis,
                next: 0,
                end: 0,
            },
        }
    }
}

fn month_span(from: NaiveDate, to: NaiveDate) -> i64 {
    (i64::from(to.year()) - i64::from(from.year())) * 12 + i64::from(to.month()) - i64::from(from.month())
}

impl IntoIterator for &Expansion {
    type Item = NaiveDate;
    type IntoIter = ExpansionIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over an [`Expansion`].
#[derive(Debug, Clone)]
pub struct ExpansionIter {
    pattern: RecurrencePattern,
    basis: NaiveDate,
    next: i64,
    end: i64,
}

impl Iterator for ExpansionIter {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let k = self.next;
        self.next += 1;
        match self.pattern.nth(self.basis, k) {
            Some(date) => Some(date),
            None => {
                self.next = self.end;
                None
            }
        }
    }
}
