//! Chinese lunar calendar conversion for 1900-2100.
//!
//! Each year is packed into one word of [`LUNAR_INFO`]:
//! - bits 0-3: the leap month number (0 when the year has none)
//! - bits 4-15: one bit per regular month, month 1 at bit 15, set for 30 days
//! - bit 16: set when the leap month has 30 days
//!
//! Lunar 1900-01-01 is solar 1900-01-31.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// First supported lunar year.
pub const MIN_YEAR: i32 = 1900;
/// Last supported lunar year.
pub const MAX_YEAR: i32 = 2100;

#[rustfmt::skip]
const LUNAR_INFO: [u32; 201] = [
    0x04bd8, 0x04ae0, 0x0a570, 0x054d5, 0x0d260, 0x0d950, 0x16554, 0x056a0, 0x09ad0, 0x055d2, // 1900
    0x04ae0, 0x0a5b6, 0x0a4d0, 0x0d250, 0x1d255, 0x0b540, 0x0d6a0, 0x0ada2, 0x095b0, 0x14977, // 1910
    0x04970, 0x0a4b0, 0x0b4b5, 0x06a50, 0x06d40, 0x1ab54, 0x02b60, 0x09570, 0x052f2, 0x04970, // 1920
    0x06566, 0x0d4a0, 0x0ea50, 0x16a95, 0x05ad0, 0x02b60, 0x186e3, 0x092e0, 0x1c8d7, 0x0c950, // 1930
    0x0d4a0, 0x1d8a6, 0x0b550, 0x056a0, 0x1a5b4, 0x025d0, 0x092d0, 0x0d2b2, 0x0a950, 0x0b557, // 1940
    0x06ca0, 0x0b550, 0x15355, 0x04da0, 0x0a5b0, 0x14573, 0x052b0, 0x0a9a8, 0x0e950, 0x06aa0, // 1950
    0x0aea6, 0x0ab50, 0x04b60, 0x0aae4, 0x0a570, 0x05260, 0x0f263, 0x0d950, 0x05b57, 0x056a0, // 1960
    0x096d0, 0x04dd5, 0x04ad0, 0x0a4d0, 0x0d4d4, 0x0d250, 0x0d558, 0x0b540, 0x0b6a0, 0x195a6, // 1970
    0x095b0, 0x049b0, 0x0a974, 0x0a4b0, 0x0b27a, 0x06a50, 0x06d40, 0x0af46, 0x0ab60, 0x09570, // 1980
    0x04af5, 0x04970, 0x064b0, 0x074a3, 0x0ea50, 0x06b58, 0x05ac0, 0x0ab60, 0x096d5, 0x092e0, // 1990
    0x0c960, 0x0d954, 0x0d4a0, 0x0da50, 0x07552, 0x056a0, 0x0abb7, 0x025d0, 0x092d0, 0x0cab5, // 2000
    0x0a950, 0x0b4a0, 0x0baa4, 0x0ad50, 0x055d9, 0x04ba0, 0x0a5b0, 0x15176, 0x052b0, 0x0a930, // 2010
    0x07954, 0x06aa0, 0x0ad50, 0x05b52, 0x04b60, 0x0a6e6, 0x0a4e0, 0x0d260, 0x0ea65, 0x0d530, // 2020
    0x05aa0, 0x076a3, 0x096d0, 0x04afb, 0x04ad0, 0x0a4d0, 0x1d0b6, 0x0d250, 0x0d520, 0x0dd45, // 2030
    0x0b5a0, 0x056d0, 0x055b2, 0x049b0, 0x0a577, 0x0a4b0, 0x0aa50, 0x1b255, 0x06d20, 0x0ada0, // 2040
    0x14b63, 0x09370, 0x049f8, 0x04970, 0x064b0, 0x168a6, 0x0ea50, 0x06b20, 0x1a6c4, 0x0aae0, // 2050
    0x0a2e0, 0x0d2e3, 0x0c960, 0x0d557, 0x0d4a0, 0x0da50, 0x05d55, 0x056a0, 0x0a6d0, 0x055d4, // 2060
    0x052d0, 0x0a9b8, 0x0a950, 0x0b4a0, 0x0b6a6, 0x0ad50, 0x055a0, 0x0aba4, 0x0a5b0, 0x052b0, // 2070
    0x0b273, 0x06930, 0x07337, 0x06aa0, 0x0ad50, 0x14b55, 0x04b60, 0x0a570, 0x054e4, 0x0d160, // 2080
    0x0e968, 0x0d520, 0x0daa0, 0x16aa6, 0x056d0, 0x04ae0, 0x0a9d4, 0x0a2d0, 0x0d150, 0x0f252, // 2090
    0x0d520,                                                                                   // 2100
];

/// Errors that can occur during lunar date conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LunarError {
    /// The year lies outside the conversion table.
    #[error("lunar year {0} is outside the supported range {MIN_YEAR}-{MAX_YEAR}")]
    UnsupportedRange(i32),

    /// Month or day can never be valid (month not 1-12, day not 1-30).
    #[error("invalid lunar date: month {month}, day {day}")]
    InvalidDate { month: u32, day: u32 },
}

/// A date in the lunar calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LunarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// True when the date falls in the intercalary copy of `month`.
    pub is_leap_month: bool,
}

/// Result of resolving a lunar month/day to a solar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LunarConversion {
    pub solar: NaiveDate,
    pub lunar_year: i32,
    pub requested_day: u32,
    pub resolved_day: u32,
}

impl LunarConversion {
    /// Number of days the requested day was moved back to exist in the month.
    pub fn adjustment(&self) -> u32 {
        self.requested_day - self.resolved_day
    }

    pub fn was_adjusted(&self) -> bool {
        self.adjustment() > 0
    }
}

fn epoch() -> NaiveDate {
    // Lunar 1900-01-01.
    NaiveDate::from_ymd_opt(1900, 1, 31).unwrap_or_default()
}

fn year_info(year: i32) -> Result<u32, LunarError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(LunarError::UnsupportedRange(year));
    }
    Ok(LUNAR_INFO[(year - MIN_YEAR) as usize])
}

fn check_month_day(month: u32, day: u32) -> Result<(), LunarError> {
    if !(1..=12).contains(&month) || !(1..=30).contains(&day) {
        return Err(LunarError::InvalidDate { month, day });
    }
    Ok(())
}

/// The leap month of `year`, if it has one.
pub fn leap_month(year: i32) -> Result<Option<u32>, LunarError> {
    let month = year_info(year)? & 0xf;
    Ok((month != 0).then_some(month))
}

fn leap_month_days(year: i32) -> Result<u32, LunarError> {
    let info = year_info(year)?;
    if info & 0xf == 0 {
        return Ok(0);
    }
    Ok(if info & 0x10000 != 0 { 30 } else { 29 })
}

/// Length of regular (non-leap) `month` in `year`: 29 or 30.
pub fn month_days(year: i32, month: u32) -> Result<u32, LunarError> {
    check_month_day(month, 1)?;
    let info = year_info(year)?;
    Ok(if info & (0x10000 >> month) != 0 { 30 } else { 29 })
}

/// Total number of days in lunar `year`, leap month included.
pub fn year_days(year: i32) -> Result<u32, LunarError> {
    let info = year_info(year)?;
    let big_months = (1..=12).filter(|m| info & (0x10000 >> m) != 0).count() as u32;
    Ok(348 + big_months + leap_month_days(year)?)
}

/// Converts an existing lunar date in a regular month to its solar date.
///
/// Fails with [`LunarError::InvalidDate`] when `day` exceeds the month length.
pub fn to_solar(year: i32, month: u32, day: u32) -> Result<NaiveDate, LunarError> {
    check_month_day(month, day)?;
    if day > month_days(year, month)? {
        return Err(LunarError::InvalidDate { month, day });
    }

    let mut offset: i64 = 0;
    for y in MIN_YEAR..year {
        offset += i64::from(year_days(y)?);
    }

    let leap = leap_month(year)?;
    for m in 1..month {
        offset += i64::from(month_days(year, m)?);
        if leap == Some(m) {
            offset += i64::from(leap_month_days(year)?);
        }
    }
    offset += i64::from(day - 1);

    epoch()
        .checked_add_signed(chrono::Duration::days(offset))
        .ok_or(LunarError::UnsupportedRange(year))
}

/// Converts a lunar month/day in `year`, falling back to the last existing day
/// of the month when `day` does not exist (the 30th of a 29-day month).
pub fn resolve(year: i32, month: u32, day: u32) -> Result<LunarConversion, LunarError> {
    check_month_day(month, day)?;
    let resolved_day = day.min(month_days(year, month)?);
    Ok(LunarConversion {
        solar: to_solar(year, month, resolved_day)?,
        lunar_year: year,
        requested_day: day,
        resolved_day,
    })
}

/// The solar date in `solar_year` on which lunar `month`/`day` falls.
///
/// Lunar year `solar_year` is tried first, then the previous lunar year whose
/// late months spill into January and February. Returns `Ok(None)` when neither
/// lands inside `solar_year`.
pub fn solar_date_in_year(
    month: u32,
    day: u32,
    solar_year: i32,
) -> Result<Option<LunarConversion>, LunarError> {
    check_month_day(month, day)?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&solar_year) {
        return Err(LunarError::UnsupportedRange(solar_year));
    }

    for lunar_year in [solar_year, solar_year - 1] {
        let conversion = match resolve(lunar_year, month, day) {
            Ok(c) => c,
            Err(LunarError::UnsupportedRange(_)) => continue,
            Err(e) => return Err(e),
        };
        if conversion.solar.year() == solar_year {
            return Ok(Some(conversion));
        }
    }
    Ok(None)
}

/// Converts a solar date to its lunar date.
pub fn from_solar(date: NaiveDate) -> Result<LunarDate, LunarError> {
    let mut offset = date.signed_duration_since(epoch()).num_days();
    if offset < 0 {
        return Err(LunarError::UnsupportedRange(date.year()));
    }

    let mut year = MIN_YEAR;
    loop {
        let days = i64::from(year_days(year)?);
        if offset < days {
            break;
        }
        offset -= days;
        year += 1;
    }

    let leap = leap_month(year)?;
    for month in 1..=12 {
        let days = i64::from(month_days(year, month)?);
        if offset < days {
            return Ok(LunarDate {
                year,
                month,
                day: offset as u32 + 1,
                is_leap_month: false,
            });
        }
        offset -= days;

        if leap == Some(month) {
            let days = i64::from(leap_month_days(year)?);
            if offset < days {
                return Ok(LunarDate {
                    year,
                    month,
                    day: offset as u32 + 1,
                    is_leap_month: true,
                });
            }
            offset -= days;
        }
    }

    Err(LunarError::UnsupportedRange(year))
}
