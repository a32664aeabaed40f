// src/handlers/calendar.rs

use crate::{
    errors::{AppError, AppResult},
    models::{CalendarToday, Deadline, DeadlineView, EthiopianDate, FiscalDate, Language},
    services::{
        calendar::{current_fiscal_date, fiscal_month_name},
        deadline::{classify, deadline_for, format_deadline_label, yearly_deadlines},
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LanguageQuery {
    /// `amharic` (default) or `english`
    pub lang: Option<Language>,
}

impl LanguageQuery {
    fn language(&self) -> Language {
        self.lang.unwrap_or(Language::Amharic)
    }
}

fn deadline_view(
    deadline: Deadline,
    now: NaiveDateTime,
    language: Language,
) -> AppResult<DeadlineView> {
    let month_name = fiscal_month_name(deadline.fiscal_date.month)
        .ok_or(AppError::InvalidFiscalMonth(deadline.fiscal_date.month))?;
    let status = classify(&deadline, now);

    Ok(DeadlineView {
        deadline,
        label: format_deadline_label(deadline.fiscal_date, language)?,
        month_name,
        status,
        status_text: status.bucket.label(language).to_string(),
    })
}

/// Today's date in Gregorian, fiscal and Ethiopian calendar terms
#[utoipa::path(
    get,
    path = "/api/v1/calendar/today",
    params(LanguageQuery),
    responses((status = 200, description = "Current calendar position", body = CalendarToday)),
    tag = "Calendar"
)]
pub async fn get_today(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
) -> AppResult<Json<CalendarToday>> {
    let now = state.clock.now();
    let fiscal_date = current_fiscal_date(now);
    let ethiopian_date = EthiopianDate::from_gregorian(now.date());

    let fiscal_month_name = fiscal_month_name(fiscal_date.month)
        .ok_or(AppError::InvalidFiscalMonth(fiscal_date.month))?;

    Ok(Json(CalendarToday {
        gregorian_date: now.date(),
        fiscal_date,
        fiscal_month_name,
        display: ethiopian_date.display(query.language()),
        ethiopian_date,
    }))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EthiopianDateQuery {
    pub year: i32,
    /// 1 (Meskerem) to 13 (Pagumen)
    pub month: u32,
    pub day: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConvertedDate {
    pub ethiopian_date: EthiopianDate,
    pub gregorian_date: NaiveDate,
}

/// Convert an Ethiopian calendar date to its Gregorian equivalent
#[utoipa::path(
    get,
    path = "/api/v1/calendar/convert",
    params(EthiopianDateQuery),
    responses(
        (status = 200, description = "Gregorian equivalent", body = ConvertedDate),
        (status = 400, description = "No such Ethiopian date"),
    ),
    tag = "Calendar"
)]
pub async fn convert_to_gregorian(
    Query(query): Query<EthiopianDateQuery>,
) -> AppResult<Json<ConvertedDate>> {
    let ethiopian_date = EthiopianDate {
        year: query.year,
        month: query.month,
        day: query.day,
    };
    let gregorian_date = ethiopian_date.to_gregorian().ok_or_else(|| {
        AppError::Validation(format!(
            "{}/{}/{} is not a valid Ethiopian date",
            query.day, query.month, query.year
        ))
    })?;

    Ok(Json(ConvertedDate {
        ethiopian_date,
        gregorian_date,
    }))
}

/// Deadline for the current fiscal month, with countdown status
#[utoipa::path(
    get,
    path = "/api/v1/deadlines/current",
    params(LanguageQuery),
    responses((status = 200, description = "Current deadline", body = DeadlineView)),
    tag = "Deadlines"
)]
pub async fn get_current_deadline(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
) -> AppResult<Json<DeadlineView>> {
    let now = state.clock.now();
    let deadline = deadline_for(current_fiscal_date(now))?;
    Ok(Json(deadline_view(deadline, now, query.language())?))
}

/// Deadline for the fiscal month after the current one
#[utoipa::path(
    get,
    path = "/api/v1/deadlines/next",
    params(LanguageQuery),
    responses((status = 200, description = "Next deadline", body = DeadlineView)),
    tag = "Deadlines"
)]
pub async fn get_next_deadline(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
) -> AppResult<Json<DeadlineView>> {
    let now = state.clock.now();
    let deadline = deadline_for(current_fiscal_date(now).next())?;
    Ok(Json(deadline_view(deadline, now, query.language())?))
}

/// All twelve deadlines of a fiscal year
#[utoipa::path(
    get,
    path = "/api/v1/deadlines/years/{year}",
    params(("year" = i32, Path, description = "Ethiopian fiscal year"), LanguageQuery),
    responses(
        (status = 200, description = "Yearly deadlines", body = Vec<DeadlineView>),
        (status = 400, description = "Fiscal year out of range"),
    ),
    tag = "Deadlines"
)]
pub async fn get_yearly_deadlines(
    State(state): State<AppState>,
    Path(year): Path<i32>,
    Query(query): Query<LanguageQuery>,
) -> AppResult<Json<Vec<DeadlineView>>> {
    let now = state.clock.now();
    let views = yearly_deadlines(year)?
        .into_iter()
        .map(|d| deadline_view(d, now, query.language()))
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Json(views))
}

/// Deadline for a specific fiscal month
#[utoipa::path(
    get,
    path = "/api/v1/deadlines/years/{year}/months/{month}",
    params(
        ("year" = i32, Path, description = "Ethiopian fiscal year"),
        ("month" = u32, Path, description = "Fiscal month, 1 (Hamle) to 12 (Sene)"),
        LanguageQuery,
    ),
    responses(
        (status = 200, description = "Deadline", body = DeadlineView),
        (status = 400, description = "Month outside 1-12"),
    ),
    tag = "Deadlines"
)]
pub async fn get_deadline(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    Query(query): Query<LanguageQuery>,
) -> AppResult<Json<DeadlineView>> {
    let now = state.clock.now();
    let deadline = deadline_for(FiscalDate::new(month, year))?;
    Ok(Json(deadline_view(deadline, now, query.language())?))
}
