// src/openapi.rs

use crate::models::{
    CalendarToday, Deadline, DeadlineBucket, DeadlineStatus, DeadlineView, EthiopianDate,
    FiscalDate, Language, MonthName, MonthlyPeriod, PeriodStats, PeriodStatus, ReportShell,
    ReportStatus, RolloverOutcome, SubmitReportRequest, UpdateTargetRequest,
};
use crate::handlers::calendar::ConvertedDate;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Planning Calendar API",
        version = "0.1.0",
        description = "Ethiopian fiscal calendar service for monthly planning and reporting. \
            Derives the current fiscal month, computes the 18th-of-month reporting deadline, \
            classifies countdown urgency, and keeps exactly one active monthly period with \
            report shells for every subordinate branch.",
        license(name = "MIT")
    ),
    paths(
        // Calendar
        crate::handlers::calendar::get_today,
        crate::handlers::calendar::convert_to_gregorian,
        // Deadlines
        crate::handlers::calendar::get_current_deadline,
        crate::handlers::calendar::get_next_deadline,
        crate::handlers::calendar::get_yearly_deadlines,
        crate::handlers::calendar::get_deadline,
        // Periods
        crate::handlers::periods::get_current_period,
        crate::handlers::periods::list_periods,
        crate::handlers::periods::trigger_rollover,
        crate::handlers::periods::update_current_target,
        // Reports
        crate::handlers::periods::list_period_reports,
        crate::handlers::periods::get_period_stats,
        crate::handlers::periods::submit_report,
    ),
    components(
        schemas(
            FiscalDate, Deadline, DeadlineBucket, DeadlineStatus, DeadlineView,
            EthiopianDate, MonthName, Language, CalendarToday, ConvertedDate,
            MonthlyPeriod, PeriodStatus, UpdateTargetRequest, RolloverOutcome,
            ReportShell, ReportStatus, SubmitReportRequest, PeriodStats,
        )
    ),
    tags(
        (name = "Calendar", description = "Gregorian to Ethiopian fiscal calendar"),
        (name = "Deadlines", description = "Monthly reporting deadlines and countdown status"),
        (name = "Periods", description = "Monthly planning periods and rollover"),
        (name = "Reports", description = "Per-branch report shells and progress"),
    )
)]
pub struct ApiDoc;
