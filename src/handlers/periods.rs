// src/handlers/periods.rs

use crate::{
    errors::{AppError, AppResult},
    models::{
        MonthlyPeriod, PeriodStats, PeriodStatus, ReportShell,
        ReportStatus, RolloverOutcome, SubmitReportRequest, UpdateTargetRequest,
    },
    services::{
        calendar::current_fiscal_date,
        deadline::{is_past_deadline, reporting_deadline},
        rollover::{ensure_current_period, rollover_if_due},
        store::{PERIOD_COLUMNS, REPORT_COLUMNS},
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Get the period for the current fiscal month, creating it if needed
#[utoipa::path(
    get,
    path = "/api/v1/periods/current",
    responses(
        (status = 200, description = "Current monthly period", body = MonthlyPeriod),
        (status = 503, description = "Store unavailable, retry later"),
    ),
    tag = "Periods"
)]
pub async fn get_current_period(State(state): State<AppState>) -> AppResult<Json<MonthlyPeriod>> {
    let now = state.clock.now();
    let period = ensure_current_period(state.periods.as_ref(), now).await?;
    Ok(Json(period))
}

/// List all periods, newest first
#[utoipa::path(
    get,
    path = "/api/v1/periods",
    responses((status = 200, description = "All monthly periods", body = Vec<MonthlyPeriod>)),
    tag = "Periods"
)]
pub async fn list_periods(State(state): State<AppState>) -> AppResult<Json<Vec<MonthlyPeriod>>> {
    let periods = sqlx::query_as::<_, MonthlyPeriod>(&format!(
        "SELECT {PERIOD_COLUMNS} FROM monthly_periods ORDER BY fiscal_year DESC, fiscal_month DESC"
    ))
    .fetch_all(&state.db)
    .await?;

    Ok(Json(periods))
}

/// Archive the active period and open the next one if the grace window has passed
#[utoipa::path(
    post,
    path = "/api/v1/periods/rollover",
    responses(
        (status = 200, description = "Rollover result", body = RolloverOutcome),
        (status = 503, description = "Store unavailable, retry later"),
    ),
    tag = "Periods"
)]
pub async fn trigger_rollover(State(state): State<AppState>) -> AppResult<Json<RolloverOutcome>> {
    let now = state.clock.now();
    let outcome = rollover_if_due(state.periods.as_ref(), now).await?;
    Ok(Json(outcome))
}

/// Update the target amount of the current active period
#[utoipa::path(
    put,
    path = "/api/v1/periods/current/target",
    request_body = UpdateTargetRequest,
    responses(
        (status = 200, description = "Target updated", body = MonthlyPeriod),
        (status = 404, description = "No active period for the current month"),
    ),
    tag = "Periods"
)]
pub async fn update_current_target(
    State(state): State<AppState>,
    Json(body): Json<UpdateTargetRequest>,
) -> AppResult<Json<MonthlyPeriod>> {
    if body.target_amount < Decimal::ZERO {
        return Err(AppError::Validation(
            "Target amount cannot be negative".to_string(),
        ));
    }

    let current = current_fiscal_date(state.clock.now());

    let period = sqlx::query_as::<_, MonthlyPeriod>(&format!(
        r#"UPDATE monthly_periods SET target_amount = $1, updated_at = NOW()
           WHERE fiscal_month = $2 AND fiscal_year = $3 AND status = 'active'
           RETURNING {PERIOD_COLUMNS}"#
    ))
    .bind(body.target_amount)
    .bind(current.month as i32)
    .bind(current.year)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("No active monthly period found".to_string()))?;

    Ok(Json(period))
}

/// List the report shells of a period
#[utoipa::path(
    get,
    path = "/api/v1/periods/{period_id}/reports",
    params(("period_id" = Uuid, Path, description = "Monthly period ID")),
    responses((status = 200, description = "Reports for the period", body = Vec<ReportShell>)),
    tag = "Reports"
)]
pub async fn list_period_reports(
    State(state): State<AppState>,
    Path(period_id): Path<Uuid>,
) -> AppResult<Json<Vec<ReportShell>>> {
    let reports = sqlx::query_as::<_, ReportShell>(&format!(
        "SELECT {REPORT_COLUMNS} FROM report_shells WHERE period_id = $1 ORDER BY created_at"
    ))
    .bind(period_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(reports))
}

/// Submission counts and progress for a period
#[utoipa::path(
    get,
    path = "/api/v1/periods/{period_id}/stats",
    params(("period_id" = Uuid, Path, description = "Monthly period ID")),
    responses(
        (status = 200, description = "Period statistics", body = PeriodStats),
        (status = 404, description = "Period not found"),
    ),
    tag = "Reports"
)]
pub async fn get_period_stats(
    State(state): State<AppState>,
    Path(period_id): Path<Uuid>,
) -> AppResult<Json<PeriodStats>> {
    let mut stats = sqlx::query_as::<_, PeriodStats>(
        r#"SELECT
            mp.id AS period_id,
            COUNT(rs.id) AS total_reports,
            COUNT(*) FILTER (WHERE rs.status = 'submitted') AS submitted_reports,
            COUNT(*) FILTER (WHERE rs.status = 'pending') AS pending_reports,
            COUNT(*) FILTER (WHERE rs.status = 'late') AS late_reports,
            COALESCE(SUM(rs.achieved_amount), 0) AS total_achieved,
            COALESCE(ROUND(AVG(rs.progress_percentage), 2), 0) AS average_progress
           FROM monthly_periods mp
           LEFT JOIN report_shells rs ON rs.period_id = mp.id
           WHERE mp.id = $1
           GROUP BY mp.id"#,
    )
    .bind(period_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Period {} not found", period_id)))?;

    stats.grade = grade_for(stats.average_progress).to_string();
    Ok(Json(stats))
}

/// Record a subordinate's achievement against the period target
#[utoipa::path(
    post,
    path = "/api/v1/periods/{period_id}/reports/{user_id}/submit",
    params(
        ("period_id" = Uuid, Path, description = "Monthly period ID"),
        ("user_id" = Uuid, Path, description = "Reporting user ID"),
    ),
    request_body = SubmitReportRequest,
    responses(
        (status = 200, description = "Report submitted", body = ReportShell),
        (status = 404, description = "No report shell for this user and period"),
        (status = 409, description = "Period is archived"),
    ),
    tag = "Reports"
)]
pub async fn submit_report(
    State(state): State<AppState>,
    Path((period_id, user_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<SubmitReportRequest>,
) -> AppResult<Json<ReportShell>> {
    if body.achieved_amount < Decimal::ZERO {
        return Err(AppError::Validation(
            "Achieved amount cannot be negative".to_string(),
        ));
    }

    let now = state.clock.now();

    let period = sqlx::query_as::<_, MonthlyPeriod>(&format!(
        "SELECT {PERIOD_COLUMNS} FROM monthly_periods WHERE id = $1"
    ))
    .bind(period_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Period {} not found", period_id)))?;

    if period.status == PeriodStatus::Archived {
        return Err(AppError::Conflict(format!(
            "Period {} is archived and no longer accepts reports",
            period_id
        )));
    }

    let status = submission_status(&period, now)?;
    let progress = progress_percentage(body.achieved_amount, period.target_amount);

    let report = sqlx::query_as::<_, ReportShell>(&format!(
        r#"UPDATE report_shells
           SET status = $1, achieved_amount = $2, progress_percentage = $3, submitted_at = NOW()
           WHERE period_id = $4 AND user_id = $5
           RETURNING {REPORT_COLUMNS}"#
    ))
    .bind(status)
    .bind(body.achieved_amount)
    .bind(progress)
    .bind(period_id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| {
        AppError::NotFound(format!(
            "No report for user {} in period {}",
            user_id, period_id
        ))
    })?;

    Ok(Json(report))
}

/// `late` once the 18th of the period's own reporting month has fully passed.
pub fn submission_status(period: &MonthlyPeriod, now: NaiveDateTime) -> AppResult<ReportStatus> {
    let deadline = reporting_deadline(period.fiscal_date())?;
    Ok(if is_past_deadline(&deadline, now) {
        ReportStatus::Late
    } else {
        ReportStatus::Submitted
    })
}

/// achieved / target × 100, rounded to two places; zero when no target is set
pub fn progress_percentage(achieved: Decimal, target: Decimal) -> Decimal {
    if target <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (achieved * dec!(100) / target).round_dp(2)
}

pub fn grade_for(progress: Decimal) -> &'static str {
    match progress {
        p if p >= dec!(90) => "A+",
        p if p >= dec!(80) => "A",
        p if p >= dec!(70) => "B+",
        p if p >= dec!(60) => "B",
        p if p >= dec!(50) => "C+",
        p if p >= dec!(40) => "C",
        p if p >= dec!(30) => "D",
        _ => "F",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::deadline::deadline_for;
    use chrono::{NaiveDate, Utc};

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    fn period_for(now: NaiveDateTime) -> MonthlyPeriod {
        let fiscal = current_fiscal_date(now);
        MonthlyPeriod {
            id: Uuid::new_v4(),
            title: "Monthly Plan".to_string(),
            description: String::new(),
            fiscal_month: fiscal.month as i32,
            fiscal_year: fiscal.year,
            target_amount: dec!(1000),
            deadline: deadline_for(fiscal).unwrap().gregorian_date,
            status: PeriodStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn july_submission_before_the_eighteenth_is_on_time() {
        let period = period_for(at(2025, 7, 1, 9));
        assert_eq!(submission_status(&period, at(2025, 7, 5, 9)).unwrap(), ReportStatus::Submitted);
        assert_eq!(submission_status(&period, at(2025, 7, 18, 23)).unwrap(), ReportStatus::Submitted);
        assert_eq!(submission_status(&period, at(2025, 7, 19, 0)).unwrap(), ReportStatus::Late);
    }

    #[test]
    fn december_submission_after_the_eighteenth_is_late() {
        let period = period_for(at(2025, 12, 1, 9));
        assert_eq!(submission_status(&period, at(2025, 12, 10, 9)).unwrap(), ReportStatus::Submitted);
        assert_eq!(submission_status(&period, at(2025, 12, 25, 9)).unwrap(), ReportStatus::Late);
        // Still late once the following month has begun
        assert_eq!(submission_status(&period, at(2026, 1, 3, 9)).unwrap(), ReportStatus::Late);
    }

    #[test]
    fn progress_against_target() {
        assert_eq!(progress_percentage(dec!(50), dec!(200)), dec!(25.00));
        assert_eq!(progress_percentage(dec!(1), dec!(3)), dec!(33.33));
        assert_eq!(progress_percentage(dec!(10), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn grade_thresholds() {
        assert_eq!(grade_for(dec!(95)), "A+");
        assert_eq!(grade_for(dec!(90)), "A+");
        assert_eq!(grade_for(dec!(89.99)), "A");
        assert_eq!(grade_for(dec!(70)), "B+");
        assert_eq!(grade_for(dec!(45)), "C");
        assert_eq!(grade_for(dec!(30)), "D");
        assert_eq!(grade_for(dec!(29.5)), "F");
    }
}
