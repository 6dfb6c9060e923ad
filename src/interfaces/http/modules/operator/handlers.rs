//! Operator console handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use super::dto::{MaintenanceAlertDto, OperatorStatsDto, PricingRequest, StationFeedbackDto};
use crate::application::{OperatorService, StationService};
use crate::interfaces::http::common::{ok, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::stations::{StationDto, StatusRequest};

#[utoipa::path(
    get,
    path = "/api/operator/stats",
    tag = "Operator",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard figures for the caller's stations", body = ApiResponse<OperatorStatsDto>),
        (status = 403, description = "Operator or admin role required")
    )
)]
pub async fn operator_stats(
    State(operator): State<Arc<OperatorService>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<OperatorStatsDto> {
    ok(operator.stats(&user.actor()).await?.into())
}

#[utoipa::path(
    get,
    path = "/api/operator/stations",
    tag = "Operator",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Stations run by the caller", body = ApiResponse<Vec<StationDto>>))
)]
pub async fn operator_stations(
    State(stations): State<Arc<StationService>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<StationDto>> {
    let list = stations.by_operator(&user.user_id).await?;
    ok(list.into_iter().map(StationDto::from).collect())
}

#[utoipa::path(
    put,
    path = "/api/operator/pricing/{station_id}",
    tag = "Operator",
    security(("bearer_auth" = [])),
    params(("station_id" = String, Path, description = "Station ID")),
    request_body = PricingRequest,
    responses(
        (status = 200, description = "Pricing updated"),
        (status = 403, description = "Not the station's operator"),
        (status = 404, description = "Station not found")
    )
)]
pub async fn update_pricing(
    State(stations): State<Arc<StationService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(station_id): Path<String>,
    ValidatedJson(request): ValidatedJson<PricingRequest>,
) -> ApiResult<()> {
    stations
        .update_pricing(&user.actor(), &station_id, request.pricing, request.peak_hours)
        .await?;
    Ok(Json(ApiResponse::message("Pricing updated")))
}

#[utoipa::path(
    put,
    path = "/api/operator/port-status/{station_id}/{port_id}",
    tag = "Operator",
    security(("bearer_auth" = [])),
    params(
        ("station_id" = String, Path, description = "Station ID"),
        ("port_id" = i32, Path, description = "Port number within the station")
    ),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Port status changed"),
        (status = 400, description = "Invalid status"),
        (status = 404, description = "Station or port not found")
    )
)]
pub async fn update_port_status(
    State(stations): State<Arc<StationService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((station_id, port_id)): Path<(String, i32)>,
    ValidatedJson(request): ValidatedJson<StatusRequest>,
) -> ApiResult<()> {
    stations
        .set_port_status(&user.actor(), &station_id, port_id, &request.status)
        .await?;
    Ok(Json(ApiResponse::message("Port status updated")))
}

#[utoipa::path(
    get,
    path = "/api/operator/maintenance-alerts",
    tag = "Operator",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "One alert per offline port", body = ApiResponse<Vec<MaintenanceAlertDto>>))
)]
pub async fn maintenance_alerts(
    State(operator): State<Arc<OperatorService>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<MaintenanceAlertDto>> {
    let alerts = operator.maintenance_alerts(&user.actor()).await?;
    ok(alerts.into_iter().map(MaintenanceAlertDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/operator/feedback",
    tag = "Operator",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Review summary per station", body = ApiResponse<Vec<StationFeedbackDto>>))
)]
pub async fn station_feedback(
    State(operator): State<Arc<OperatorService>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<StationFeedbackDto>> {
    let feedback = operator.feedback(&user.actor()).await?;
    ok(feedback.into_iter().map(StationFeedbackDto::from).collect())
}

#[utoipa::path(
    post,
    path = "/api/operator/resolve-alert/{alert_id}",
    tag = "Operator",
    security(("bearer_auth" = [])),
    params(("alert_id" = String, Path, description = "Alert ID, `{stationId}-{portId}`")),
    responses(
        (status = 200, description = "Port back to available"),
        (status = 400, description = "Invalid alert ID"),
        (status = 404, description = "Alert not found")
    )
)]
pub async fn resolve_alert(
    State(operator): State<Arc<OperatorService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(alert_id): Path<String>,
) -> ApiResult<()> {
    operator.resolve_alert(&user.actor(), &alert_id).await?;
    Ok(Json(ApiResponse::message("Alert resolved")))
}
