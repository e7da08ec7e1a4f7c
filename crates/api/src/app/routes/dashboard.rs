use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::app::dto;
use crate::app::services::AppServices;

/// Stat cards plus the creation-date chart. The stats are global; only the
/// chart honors `status_filter` and `period`.
pub async fn show(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::DashboardQuery>,
) -> axum::response::Response {
    let data = services.dashboard(&query, Utc::now());

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "stats": {
                "total_events": data.total_events,
                "total_users": data.total_users,
                "upcoming_events": data.upcoming_events,
            },
            "period": data.period.as_str(),
            "chart": data.chart,
        })),
    )
        .into_response()
}
