//! Booking handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension,
};

use super::dto::{AvailableSlotsParams, BookingDto, CreateBookingRequest};
use crate::application::BookingService;
use crate::domain::UserRole;
use crate::interfaces::http::common::{
    created, ok, ApiResponse, ApiResult, Created, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

const ANY_ROLE: [UserRole; 3] = [UserRole::User, UserRole::Operator, UserRole::Admin];

#[utoipa::path(
    get,
    path = "/api/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Own bookings, bookings at own stations, or all for admins", body = ApiResponse<Vec<BookingDto>>))
)]
pub async fn list_bookings(
    State(bookings): State<Arc<BookingService>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<BookingDto>> {
    let actor = user.require(&ANY_ROLE)?;
    let views = bookings.list(&actor).await?;
    ok(views.into_iter().map(BookingDto::from).collect())
}

/// Same listing as `GET /api/bookings`; the path id is not consulted.
#[utoipa::path(
    get,
    path = "/api/bookings/user/{user_id}",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "User ID")),
    responses((status = 200, description = "Bookings visible to the caller", body = ApiResponse<Vec<BookingDto>>))
)]
pub async fn list_user_bookings(
    State(bookings): State<Arc<BookingService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(_user_id): Path<String>,
) -> ApiResult<Vec<BookingDto>> {
    list_bookings(State(bookings), Extension(user)).await
}

#[utoipa::path(
    post,
    path = "/api/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking confirmed", body = ApiResponse<BookingDto>),
        (status = 400, description = "Missing field, bad date or slot, or slot already booked"),
        (status = 404, description = "Station not found")
    )
)]
pub async fn create_booking(
    State(bookings): State<Arc<BookingService>>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateBookingRequest>,
) -> Created<BookingDto> {
    let actor = user.require(&[UserRole::User])?;
    created(bookings.create(&actor, request.into()).await?.into())
}

#[utoipa::path(
    post,
    path = "/api/bookings/{id}/cancel",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking cancelled", body = ApiResponse<BookingDto>),
        (status = 400, description = "Booking is already cancelled"),
        (status = 403, description = "Not the booking's owner"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn cancel_booking(
    State(bookings): State<Arc<BookingService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<BookingDto> {
    let actor = user.require(&[UserRole::User, UserRole::Admin])?;
    ok(bookings.cancel(&actor, &id).await?.into())
}

#[utoipa::path(
    get,
    path = "/api/bookings/available-slots",
    tag = "Bookings",
    params(AvailableSlotsParams),
    responses(
        (status = 200, description = "Free slots in display order", body = ApiResponse<Vec<String>>),
        (status = 400, description = "stationId and date are required")
    )
)]
pub async fn available_slots(
    State(bookings): State<Arc<BookingService>>,
    Query(params): Query<AvailableSlotsParams>,
) -> ApiResult<Vec<String>> {
    ok(bookings
        .available_slots(
            params.station_id.as_deref(),
            params.date.as_deref(),
            params.port_id,
        )
        .await?)
}

#[utoipa::path(
    get,
    path = "/api/bookings/station/{station_id}",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("station_id" = String, Path, description = "Station ID")),
    responses(
        (status = 200, description = "Bookings at the station", body = ApiResponse<Vec<BookingDto>>),
        (status = 403, description = "Not the owning operator")
    )
)]
pub async fn list_station_bookings(
    State(bookings): State<Arc<BookingService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(station_id): Path<String>,
) -> ApiResult<Vec<BookingDto>> {
    let actor = user.require(&[UserRole::Operator, UserRole::Admin])?;
    let views = bookings.for_station(&actor, &station_id).await?;
    ok(views.into_iter().map(BookingDto::from).collect())
}
