use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde_json::json;

/// Root handler: a short landing page with links
pub async fn root_handler() -> impl IntoResponse {
    Html(r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <title>Planning Calendar API</title>
  <style>
    body { font-family: system-ui, sans-serif; background: #0f172a; color: #e2e8f0; padding: 40px 20px; }
    .container { max-width: 760px; margin: 0 auto; }
    h1 { font-size: 2.2rem; margin-bottom: 8px; }
    p { color: #94a3b8; }
    a { color: #38bdf8; }
    li { margin: 6px 0; font-family: monospace; }
  </style>
</head>
<body>
<div class="container">
  <h1>Planning Calendar API</h1>
  <p>Ethiopian fiscal calendar, monthly reporting deadlines and period rollover.</p>
  <p><a href="/docs">Swagger UI</a> · <a href="/health">Health</a></p>
  <ul>
    <li>GET  /api/v1/calendar/today</li>
    <li>GET  /api/v1/calendar/convert?year=&amp;month=&amp;day=</li>
    <li>GET  /api/v1/deadlines/current</li>
    <li>GET  /api/v1/deadlines/next</li>
    <li>GET  /api/v1/deadlines/years/:year</li>
    <li>GET  /api/v1/deadlines/years/:year/months/:month</li>
    <li>GET  /api/v1/periods</li>
    <li>GET  /api/v1/periods/current</li>
    <li>PUT  /api/v1/periods/current/target</li>
    <li>POST /api/v1/periods/rollover</li>
    <li>GET  /api/v1/periods/:id/reports</li>
    <li>GET  /api/v1/periods/:id/stats</li>
    <li>POST /api/v1/periods/:id/reports/:user_id/submit</li>
  </ul>
</div>
</body>
</html>"#)
}

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected",
                "service": "planning-calendar",
                "version": env!("CARGO_PKG_VERSION"),
                "calendar_utc_offset_hours": state.config.calendar_utc_offset_hours
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "database": "disconnected",
                "error": e.to_string()
            })),
        ),
    }
}
