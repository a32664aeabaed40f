// src/services/calendar.rs

use crate::models::{EthiopianDate, FiscalDate, Language, MonthName};
use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};

/// Source of the reporting wall clock. Read once per logical operation and
/// pass the snapshot down; never re-read mid-computation.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// System clock shifted to a fixed UTC offset (East Africa Time by default).
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn with_offset_hours(hours: i32) -> Self {
        let offset = FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix());
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }
}

#[cfg(test)]
pub struct FixedClock(pub NaiveDateTime);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

// ─── Fiscal month derivation ──────────────────────────────────────────────────

/// Gregorian month (index 0 = January) → fiscal month. July opens the fiscal year.
const GREGORIAN_TO_FISCAL: [u32; 12] = [7, 8, 9, 10, 11, 12, 1, 2, 3, 4, 5, 6];

/// Map a wall-clock reading to its fiscal month and year.
///
/// Only whole months are modelled: the year steps at the Gregorian September
/// boundary, which approximates Enkutatash (Meskerem 1).
pub fn current_fiscal_date(now: NaiveDateTime) -> FiscalDate {
    let gregorian_month = now.month();
    let gregorian_year = now.year();

    let month = GREGORIAN_TO_FISCAL[(gregorian_month - 1) as usize];
    let year = if gregorian_month >= 9 {
        gregorian_year - 7
    } else {
        gregorian_year - 8
    };

    FiscalDate::new(month, year)
}

// ─── Month names ──────────────────────────────────────────────────────────────

/// Calendar-year month names, Meskerem first, Pagumen last.
const ETHIOPIAN_MONTHS: [(&str, &str); 13] = [
    ("መስከረም", "Meskerem"),
    ("ጥቅምት", "Tikimt"),
    ("ኅዳር", "Hidar"),
    ("ታኅሣሥ", "Tahsas"),
    ("ጥር", "Tir"),
    ("የካቲት", "Yekatit"),
    ("መጋቢት", "Megabit"),
    ("ሚያዝያ", "Miazia"),
    ("ግንቦት", "Ginbot"),
    ("ሰኔ", "Sene"),
    ("ሐምሌ", "Hamle"),
    ("ነሐሴ", "Nehase"),
    ("ጳጉሜን", "Pagumen"),
];

/// Fiscal month (Hamle = 1) → calendar-year month (Meskerem = 1).
/// Presentation only; fiscal months never reach Pagumen.
pub fn fiscal_to_calendar_month(fiscal_month: u32) -> Option<u32> {
    (1..=12)
        .contains(&fiscal_month)
        .then(|| (fiscal_month + 9) % 12 + 1)
}

pub fn calendar_month_name(calendar_month: u32) -> Option<MonthName> {
    let (amharic, english) = *ETHIOPIAN_MONTHS.get(calendar_month.checked_sub(1)? as usize)?;
    Some(MonthName {
        amharic: amharic.to_string(),
        english: english.to_string(),
    })
}

pub fn fiscal_month_name(fiscal_month: u32) -> Option<MonthName> {
    fiscal_to_calendar_month(fiscal_month).and_then(calendar_month_name)
}

impl MonthName {
    pub fn in_language(&self, language: Language) -> &str {
        match language {
            Language::Amharic => &self.amharic,
            Language::English => &self.english,
        }
    }
}

// ─── Exact Ethiopian dates (display) ──────────────────────────────────────────

/// Era anchor (Amete Mihret) for the 1461-day cycle arithmetic below.
const ETHIOPIC_EPOCH_JDN: i64 = 1_723_856;
/// `NaiveDate::num_days_from_ce()` + this = Julian day number.
const CE_TO_JDN: i64 = 1_721_425;

impl EthiopianDate {
    pub fn from_gregorian(date: NaiveDate) -> Self {
        let jdn = i64::from(date.num_days_from_ce()) + CE_TO_JDN;
        let offset = jdn - ETHIOPIC_EPOCH_JDN;

        let r = offset.rem_euclid(1461);
        let n = r % 365 + 365 * (r / 1460);
        let year = 4 * offset.div_euclid(1461) + r / 365 - r / 1460;

        Self {
            year: year as i32,
            month: (n / 30 + 1) as u32,
            day: (n % 30 + 1) as u32,
        }
    }

    /// Back to the proleptic Gregorian calendar. `None` for out-of-range dates
    /// (e.g. Pagumen 6 in a common year).
    pub fn to_gregorian(self) -> Option<NaiveDate> {
        if !(1..=13).contains(&self.month) || self.day == 0 || self.day > self.month_length() {
            return None;
        }
        let year = i64::from(self.year);
        let jdn = ETHIOPIC_EPOCH_JDN + 365 + 365 * (year - 1) + year.div_euclid(4)
            + 30 * i64::from(self.month)
            + i64::from(self.day)
            - 31;
        let days_from_ce = i32::try_from(jdn - CE_TO_JDN).ok()?;
        NaiveDate::from_num_days_from_ce_opt(days_from_ce)
    }

    pub fn is_leap_year(&self) -> bool {
        self.year.rem_euclid(4) == 3
    }

    pub fn month_length(&self) -> u32 {
        match self.month {
            13 if self.is_leap_year() => 6,
            13 => 5,
            _ => 30,
        }
    }

    pub fn display(&self, language: Language) -> String {
        match calendar_month_name(self.month) {
            Some(name) => format!("{} {}, {}", name.in_language(language), self.day, self.year),
            None => format!("{}/{}/{}", self.day, self.month, self.year),
        }
    }
}
