// src/models/mod.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ─── Fiscal Calendar ──────────────────────────────────────────────────────────

/// A coordinate in the Ethiopian government fiscal year.
/// Month 1 is Hamle (≈ July), month 12 is Sene (≈ June).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct FiscalDate {
    pub month: u32,
    pub year: i32,
}

impl FiscalDate {
    pub fn new(month: u32, year: i32) -> Self {
        Self { month, year }
    }

    /// The following fiscal month, wrapping Sene → Hamle of the next year.
    pub fn next(self) -> Self {
        if self.month >= 12 {
            Self::new(1, self.year + 1)
        } else {
            Self::new(self.month + 1, self.year)
        }
    }

    /// The preceding fiscal month, wrapping Hamle → Sene of the previous year.
    pub fn previous(self) -> Self {
        if self.month <= 1 {
            Self::new(12, self.year - 1)
        } else {
            Self::new(self.month - 1, self.year)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Deadline {
    pub fiscal_date: FiscalDate,
    /// Always the 18th Ethiopian day of the fiscal month, as a Gregorian date
    pub gregorian_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineBucket {
    Overdue,
    Today,
    Urgent,
    Warning,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DeadlineStatus {
    /// Signed: negative once the deadline has passed
    pub days_remaining: i64,
    pub bucket: DeadlineBucket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Amharic,
    English,
}

/// An exact day in the 13-month Ethiopian calendar year (Meskerem = 1, Pagumen = 13).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct EthiopianDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthName {
    pub amharic: String,
    pub english: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CalendarToday {
    pub gregorian_date: NaiveDate,
    pub fiscal_date: FiscalDate,
    pub fiscal_month_name: MonthName,
    pub ethiopian_date: EthiopianDate,
    /// e.g. "ታኅሣሥ 7, 2018"
    pub display: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeadlineView {
    pub deadline: Deadline,
    pub month_name: MonthName,
    /// e.g. "Tahsas 18, 2018"
    pub label: String,
    pub status: DeadlineStatus,
    pub status_text: String,
}

// ─── Monthly Period ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "period_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    Active,
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, PartialEq)]
pub struct MonthlyPeriod {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub fiscal_month: i32,
    pub fiscal_year: i32,
    pub target_amount: Decimal,
    pub deadline: NaiveDate,
    pub status: PeriodStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MonthlyPeriod {
    pub fn fiscal_date(&self) -> FiscalDate {
        FiscalDate::new(self.fiscal_month as u32, self.fiscal_year)
    }
}

/// Everything needed to insert a period; the store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewPeriod {
    pub title: String,
    pub description: String,
    pub fiscal_date: FiscalDate,
    pub target_amount: Decimal,
    pub deadline: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTargetRequest {
    pub target_amount: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RolloverOutcome {
    /// No active period existed for the current slot; it was ensured instead
    Ensured { period: MonthlyPeriod },
    /// Still inside the reporting window
    NotDue { period: MonthlyPeriod },
    RolledOver {
        archived: MonthlyPeriod,
        next: MonthlyPeriod,
        next_created: bool,
    },
}

// ─── Report Shells ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Submitted,
    Late,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, PartialEq)]
pub struct ReportShell {
    pub id: Uuid,
    pub period_id: Uuid,
    pub user_id: Uuid,
    pub status: ReportStatus,
    pub achieved_amount: Decimal,
    pub progress_percentage: Decimal,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitReportRequest {
    pub achieved_amount: Decimal,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct PeriodStats {
    pub period_id: Uuid,
    pub total_reports: i64,
    pub submitted_reports: i64,
    pub pending_reports: i64,
    pub late_reports: i64,
    pub total_achieved: Decimal,
    pub average_progress: Decimal,
    #[sqlx(skip)]
    pub grade: String,
}
