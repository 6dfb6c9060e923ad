//! Station handlers. Listing and lookups are public; changes need the owning
//! operator or an admin.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use super::dto::{
    CreateStationRequest, StationDto, StationListingDto, StationSearchParams, StatusRequest,
    UpdateStationRequest,
};
use crate::application::StationService;
use crate::domain::UserRole;
use crate::interfaces::http::common::{
    created, ok, ApiResponse, ApiResult, Created, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/api/stations",
    tag = "Stations",
    params(StationSearchParams),
    responses((status = 200, description = "Matching stations", body = ApiResponse<Vec<StationListingDto>>))
)]
pub async fn list_stations(
    State(stations): State<Arc<StationService>>,
    Query(params): Query<StationSearchParams>,
) -> ApiResult<Vec<StationListingDto>> {
    let found = stations.search(params.into()).await?;
    ok(found.into_iter().map(StationListingDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/stations/{id}",
    tag = "Stations",
    params(("id" = String, Path, description = "Station ID")),
    responses(
        (status = 200, description = "Station", body = ApiResponse<StationDto>),
        (status = 404, description = "Station not found")
    )
)]
pub async fn get_station(
    State(stations): State<Arc<StationService>>,
    Path(id): Path<String>,
) -> ApiResult<StationDto> {
    ok(stations.get(&id).await?.into())
}

#[utoipa::path(
    get,
    path = "/api/stations/operator/{operator_id}",
    tag = "Stations",
    params(("operator_id" = String, Path, description = "Operator user ID")),
    responses((status = 200, description = "Stations run by the operator", body = ApiResponse<Vec<StationDto>>))
)]
pub async fn list_operator_stations(
    State(stations): State<Arc<StationService>>,
    Path(operator_id): Path<String>,
) -> ApiResult<Vec<StationDto>> {
    let found = stations.by_operator(&operator_id).await?;
    ok(found.into_iter().map(StationDto::from).collect())
}

#[utoipa::path(
    post,
    path = "/api/stations",
    tag = "Stations",
    security(("bearer_auth" = [])),
    request_body = CreateStationRequest,
    responses(
        (status = 201, description = "Station created", body = ApiResponse<StationDto>),
        (status = 400, description = "Missing name, city or landmark"),
        (status = 403, description = "Operators and admins only")
    )
)]
pub async fn create_station(
    State(stations): State<Arc<StationService>>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateStationRequest>,
) -> Created<StationDto> {
    let actor = user.require(&[UserRole::Operator, UserRole::Admin])?;
    created(stations.create(&actor, request.into()).await?.into())
}

#[utoipa::path(
    put,
    path = "/api/stations/{id}",
    tag = "Stations",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Station ID")),
    request_body = UpdateStationRequest,
    responses(
        (status = 200, description = "Station updated", body = ApiResponse<StationDto>),
        (status = 403, description = "Not the owning operator"),
        (status = 404, description = "Station not found")
    )
)]
pub async fn update_station(
    State(stations): State<Arc<StationService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateStationRequest>,
) -> ApiResult<StationDto> {
    let actor = user.require(&[UserRole::Operator, UserRole::Admin])?;
    ok(stations.update(&actor, &id, request.into()).await?.into())
}

#[utoipa::path(
    put,
    path = "/api/stations/{id}/status",
    tag = "Stations",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Station ID")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Status changed"),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Not the owning operator")
    )
)]
pub async fn update_station_status(
    State(stations): State<Arc<StationService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<StatusRequest>,
) -> ApiResult<()> {
    let actor = user.require(&[UserRole::Operator, UserRole::Admin])?;
    stations.set_status(&actor, &id, &request.status).await?;
    Ok(Json(ApiResponse::message("Station status updated")))
}

#[utoipa::path(
    put,
    path = "/api/stations/{id}/ports/{port_id}/status",
    tag = "Stations",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Station ID"),
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
    Path((id, port_id)): Path<(String, i32)>,
    ValidatedJson(request): ValidatedJson<StatusRequest>,
) -> ApiResult<()> {
    let actor = user.require(&[UserRole::Operator, UserRole::Admin])?;
    stations
        .set_port_status(&actor, &id, port_id, &request.status)
        .await?;
    Ok(Json(ApiResponse::message("Port status updated")))
}
