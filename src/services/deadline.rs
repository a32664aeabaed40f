// src/services/deadline.rs

use crate::{
    errors::{AppError, AppResult},
    models::{Deadline, DeadlineBucket, DeadlineStatus, FiscalDate, Language},
    services::calendar::fiscal_month_name,
};
use chrono::{NaiveDate, NaiveDateTime};

/// Every report is due on the 18th day of its Ethiopian month.
pub const DEADLINE_DAY: u32 = 18;

/// Fiscal month (index 0 = Hamle) → Gregorian month holding its 18th.
const FISCAL_TO_GREGORIAN_MONTH: [u32; 12] = [7, 8, 9, 10, 11, 12, 1, 2, 3, 4, 5, 6];

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Gregorian date of the 18th of the given fiscal month.
///
/// Hamle through Tikimt (1–4) land in Gregorian year `fiscal + 7`; Hidar
/// through Sene (5–12) in `fiscal + 8`.
pub fn deadline_for(fiscal_date: FiscalDate) -> AppResult<Deadline> {
    let month = fiscal_date.month;
    if !(1..=12).contains(&month) {
        return Err(AppError::InvalidFiscalMonth(month));
    }

    let gregorian_month = FISCAL_TO_GREGORIAN_MONTH[(month - 1) as usize];
    let offset = if month <= 4 { 7 } else { 8 };

    eighteenth_of(fiscal_date, gregorian_month, offset)
}

/// The 18th of the Gregorian month in which the clock reports `fiscal_date`
/// as current. Late submissions are judged against this date.
pub fn reporting_deadline(fiscal_date: FiscalDate) -> AppResult<Deadline> {
    let month = fiscal_date.month;
    if !(1..=12).contains(&month) {
        return Err(AppError::InvalidFiscalMonth(month));
    }

    // Inverse of the September year step in `current_fiscal_date`
    let gregorian_month = FISCAL_TO_GREGORIAN_MONTH[(month - 1) as usize];
    let offset = if gregorian_month >= 9 { 7 } else { 8 };

    eighteenth_of(fiscal_date, gregorian_month, offset)
}

fn eighteenth_of(
    fiscal_date: FiscalDate,
    gregorian_month: u32,
    offset: i32,
) -> AppResult<Deadline> {
    let out_of_range =
        || AppError::Validation(format!("Fiscal year {} is out of range", fiscal_date.year));

    let gregorian_year = fiscal_date.year.checked_add(offset).ok_or_else(out_of_range)?;
    let gregorian_date = NaiveDate::from_ymd_opt(gregorian_year, gregorian_month, DEADLINE_DAY)
        .ok_or_else(out_of_range)?;

    Ok(Deadline {
        fiscal_date,
        gregorian_date,
    })
}

/// All twelve deadlines of a fiscal year, Hamle first.
pub fn yearly_deadlines(fiscal_year: i32) -> AppResult<Vec<Deadline>> {
    (1..=12)
        .map(|month| deadline_for(FiscalDate::new(month, fiscal_year)))
        .collect()
}

/// Signed whole days until the deadline, rounded up. The deadline falls due
/// at local midnight opening the Gregorian day.
pub fn days_remaining(deadline: &Deadline, now: NaiveDateTime) -> i64 {
    let due = deadline.gregorian_date.and_time(chrono::NaiveTime::MIN);
    let millis = (due - now).num_milliseconds();

    let whole = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) == 0 {
        whole
    } else {
        whole + 1
    }
}

pub fn bucket_for(days_remaining: i64) -> DeadlineBucket {
    match days_remaining {
        d if d < 0 => DeadlineBucket::Overdue,
        0 => DeadlineBucket::Today,
        1..=3 => DeadlineBucket::Urgent,
        4..=7 => DeadlineBucket::Warning,
        _ => DeadlineBucket::Normal,
    }
}

pub fn classify(deadline: &Deadline, now: NaiveDateTime) -> DeadlineStatus {
    let days_remaining = days_remaining(deadline, now);
    DeadlineStatus {
        days_remaining,
        bucket: bucket_for(days_remaining),
    }
}

/// True once the whole deadline day has elapsed, i.e. the status is overdue.
pub fn is_past_deadline(deadline: &Deadline, now: NaiveDateTime) -> bool {
    days_remaining(deadline, now) < 0
}

impl DeadlineBucket {
    pub fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (DeadlineBucket::Overdue, Language::English) => "Overdue",
            (DeadlineBucket::Overdue, Language::Amharic) => "ዘግይቷል",
            (DeadlineBucket::Today, Language::English) => "Today",
            (DeadlineBucket::Today, Language::Amharic) => "ዛሬ",
            (DeadlineBucket::Urgent, Language::English) => "Urgent",
            (DeadlineBucket::Urgent, Language::Amharic) => "አስቸኳይ",
            (DeadlineBucket::Warning, Language::English) => "Warning",
            (DeadlineBucket::Warning, Language::Amharic) => "ማስጠንቀቂያ",
            (DeadlineBucket::Normal, Language::English) => "Normal",
            (DeadlineBucket::Normal, Language::Amharic) => "መደበኛ",
        }
    }
}

/// "<month> 18, <fiscal year>" in the requested language.
pub fn format_deadline_label(fiscal_date: FiscalDate, language: Language) -> AppResult<String> {
    let name = fiscal_month_name(fiscal_date.month)
        .ok_or(AppError::InvalidFiscalMonth(fiscal_date.month))?;
    Ok(format!(
        "{} {}, {}",
        name.in_language(language),
        DEADLINE_DAY,
        fiscal_date.year
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::calendar::current_fiscal_date;
    use chrono::{Datelike, NaiveTime};

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(h, 0, 0).unwrap())
    }

    fn deadline_on(y: i32, m: u32, d: u32) -> Deadline {
        Deadline {
            fiscal_date: FiscalDate::new(1, 2018),
            gregorian_date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        }
    }

    #[test]
    fn every_deadline_falls_on_the_eighteenth() {
        for deadline in yearly_deadlines(2018).unwrap() {
            assert_eq!(deadline.gregorian_date.day(), 18);
        }
    }

    #[test]
    fn deadline_year_splits_after_tikimt() {
        for month in 1..=12 {
            let deadline = deadline_for(FiscalDate::new(month, 2018)).unwrap();
            let expected = if month <= 4 { 2025 } else { 2026 };
            assert_eq!(deadline.gregorian_date.year(), expected, "fiscal month {month}");
        }
    }

    #[test]
    fn deadline_months_follow_the_mapping_table() {
        let hamle = deadline_for(FiscalDate::new(1, 2018)).unwrap();
        assert_eq!(hamle.gregorian_date, NaiveDate::from_ymd_opt(2025, 7, 18).unwrap());

        let sene = deadline_for(FiscalDate::new(12, 2018)).unwrap();
        assert_eq!(sene.gregorian_date, NaiveDate::from_ymd_opt(2026, 6, 18).unwrap());
    }

    #[test]
    fn month_thirteen_is_rejected() {
        let err = deadline_for(FiscalDate::new(13, 2018)).unwrap_err();
        assert!(matches!(err, AppError::InvalidFiscalMonth(13)));

        let err = deadline_for(FiscalDate::new(0, 2018)).unwrap_err();
        assert!(matches!(err, AppError::InvalidFiscalMonth(0)));
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(bucket_for(-1), DeadlineBucket::Overdue);
        assert_eq!(bucket_for(0), DeadlineBucket::Today);
        assert_eq!(bucket_for(1), DeadlineBucket::Urgent);
        assert_eq!(bucket_for(3), DeadlineBucket::Urgent);
        assert_eq!(bucket_for(4), DeadlineBucket::Warning);
        assert_eq!(bucket_for(7), DeadlineBucket::Warning);
        assert_eq!(bucket_for(8), DeadlineBucket::Normal);
    }

    #[test]
    fn days_remaining_rounds_partial_days_up() {
        let deadline = deadline_on(2025, 12, 18);
        assert_eq!(days_remaining(&deadline, at(2025, 12, 16, 0)), 2);
        assert_eq!(days_remaining(&deadline, at(2025, 12, 16, 10)), 2);
        assert_eq!(days_remaining(&deadline, at(2025, 12, 17, 23)), 1);
        assert_eq!(days_remaining(&deadline, at(2025, 12, 18, 0)), 0);
        // The rest of the 18th still counts as today
        assert_eq!(days_remaining(&deadline, at(2025, 12, 18, 12)), 0);
        assert_eq!(days_remaining(&deadline, at(2025, 12, 19, 12)), -1);
    }

    #[test]
    fn mid_december_scenario() {
        let now = at(2025, 12, 16, 9);
        let fiscal = current_fiscal_date(now);
        assert_eq!(fiscal, FiscalDate::new(6, 2018));

        // Tahsas lands in fiscal+8 by the table, i.e. the December of the following year
        let deadline = deadline_for(fiscal).unwrap();
        assert_eq!(deadline.gregorian_date.month(), 12);
        assert_eq!(deadline.gregorian_date.day(), 18);

        let same_month = deadline_on(2025, 12, 18);
        let status = classify(&same_month, now);
        assert_eq!(status.days_remaining, 2);
        assert_eq!(status.bucket, DeadlineBucket::Urgent);
    }

    #[test]
    fn past_deadline_detection() {
        let deadline = deadline_on(2025, 12, 18);
        assert!(!is_past_deadline(&deadline, at(2025, 12, 17, 23)));
        assert!(!is_past_deadline(&deadline, at(2025, 12, 18, 23)));
        assert!(is_past_deadline(&deadline, at(2025, 12, 19, 0)));
    }

    #[test]
    fn huge_fiscal_year_is_a_validation_error() {
        let err = yearly_deadlines(i32::MAX).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = reporting_deadline(FiscalDate::new(1, i32::MAX)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn reporting_deadline_sits_in_the_current_month() {
        for (y, m) in [(2025, 7), (2025, 8), (2025, 9), (2025, 11), (2025, 12), (2026, 1), (2026, 6)] {
            let now = at(y, m, 5, 9);
            let deadline = reporting_deadline(current_fiscal_date(now)).unwrap();
            assert_eq!(
                deadline.gregorian_date,
                NaiveDate::from_ymd_opt(y, m, 18).unwrap(),
                "{y}-{m}"
            );
            assert!(!is_past_deadline(&deadline, now));
            assert!(is_past_deadline(&deadline, at(y, m, 19, 0)));
        }
    }

    #[test]
    fn labels_in_both_languages() {
        let tahsas = FiscalDate::new(6, 2018);
        assert_eq!(format_deadline_label(tahsas, Language::English).unwrap(), "Tahsas 18, 2018");
        assert_eq!(format_deadline_label(tahsas, Language::Amharic).unwrap(), "ታኅሣሥ 18, 2018");
        assert_eq!(DeadlineBucket::Urgent.label(Language::Amharic), "አስቸኳይ");
    }
}
