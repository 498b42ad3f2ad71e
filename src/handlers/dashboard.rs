// src/handlers/dashboard.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Local;
use serde_json::json;

use crate::{
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::dashboard::DashboardReport,
};

// GET /api/dashboard
//
// O agregador recebe o "agora" daqui (hora de parede local): o serviço em si
// nunca consulta o relógio. Qualquer falha vira um 500 opaco; o detalhe do
// erro fica só no log.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Snapshot agregado de vendas do PDV", body = DashboardReport),
        (status = 401, description = "Não autorizado"),
        (status = 500, description = "Falha ao montar o relatório")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> impl IntoResponse {
    let now = Local::now().naive_local();

    match app_state.dashboard_service.compute_report(now).await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "data": report,
            })),
        ),
        Err(err) => {
            tracing::error!("Dashboard error: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "message": "Failed to load dashboard data",
                })),
            )
        }
    }
}
