//! API router with Swagger documentation

use std::sync::Arc;

use axum::{
    extract::FromRef,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{
    AdminService, BookingService, NotificationService, OperatorService, OptimizerService,
    PaymentService, ReviewService, SessionService, StationService, UserService,
};
use crate::domain::RepositoryProvider;
use crate::infrastructure::ai::{AiClient, AiConfig};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::middleware::{
    auth_middleware, require_admin, require_operator, AuthState,
};
use crate::interfaces::http::modules::health::HealthState;
use crate::interfaces::http::modules::metrics::{
    http_metrics_middleware, prometheus_metrics, MetricsState,
};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::{
    admin, ai, auth, bookings, health, notifications, operator, reviews, sessions, stations,
    transactions, users,
};

/// Shared state of every route. Handlers extract the piece they need.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub stations: Arc<StationService>,
    pub bookings: Arc<BookingService>,
    pub sessions: Arc<SessionService>,
    pub payments: Arc<PaymentService>,
    pub reviews: Arc<ReviewService>,
    pub notifications: Arc<NotificationService>,
    pub admin: Arc<AdminService>,
    pub operator: Arc<OperatorService>,
    pub optimizer: Arc<OptimizerService>,
    pub auth: AuthState,
    pub health: HealthState,
}

impl AppState {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        jwt_config: JwtConfig,
        ai_config: AiConfig,
        health: HealthState,
    ) -> Self {
        Self {
            users: Arc::new(UserService::new(repos.clone(), jwt_config.clone())),
            stations: Arc::new(StationService::new(repos.clone())),
            bookings: Arc::new(BookingService::new(repos.clone())),
            sessions: Arc::new(SessionService::new(repos.clone())),
            payments: Arc::new(PaymentService::new(repos.clone())),
            reviews: Arc::new(ReviewService::new(repos.clone())),
            notifications: Arc::new(NotificationService::new(repos.clone())),
            admin: Arc::new(AdminService::new(repos.clone())),
            operator: Arc::new(OperatorService::new(repos.clone())),
            optimizer: Arc::new(OptimizerService::new(Arc::new(AiClient::new(ai_config)))),
            auth: AuthState { jwt_config, repos },
            health,
        }
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token from /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::test_endpoint,
        health::db_status,
        health::db_diagnostics,
        auth::login,
        auth::register,
        auth::get_current_user,
        auth::update_profile,
        auth::change_password,
        users::search_users,
        users::get_user,
        users::update_user,
        stations::list_stations,
        stations::get_station,
        stations::list_operator_stations,
        stations::create_station,
        stations::update_station,
        stations::update_station_status,
        stations::update_port_status,
        bookings::list_bookings,
        bookings::list_user_bookings,
        bookings::create_booking,
        bookings::cancel_booking,
        bookings::available_slots,
        bookings::list_station_bookings,
        sessions::list_sessions,
        sessions::list_user_sessions,
        sessions::active_session,
        sessions::start_session,
        sessions::stop_session,
        sessions::list_station_sessions,
        sessions::session_history,
        sessions::session_stats,
        transactions::list_transactions,
        transactions::list_user_transactions,
        transactions::process_payment,
        transactions::wallet_balance,
        transactions::wallet_topup,
        transactions::payment_summary,
        reviews::station_reviews,
        reviews::user_reviews,
        reviews::create_review,
        reviews::mark_helpful,
        notifications::list_notifications,
        notifications::mark_read,
        notifications::mark_all_read,
        notifications::delete_notification,
        notifications::unread_count,
        admin::admin_stats,
        admin::all_bookings,
        admin::all_sessions,
        admin::all_transactions,
        admin::list_users,
        admin::all_stations,
        admin::update_user_status,
        admin::update_station_status,
        admin::feedback_stats,
        admin::feedback_reviews,
        operator::operator_stats,
        operator::operator_stations,
        operator::update_pricing,
        operator::update_port_status,
        operator::maintenance_alerts,
        operator::station_feedback,
        operator::resolve_alert,
        ai::optimize,
    ),
    components(
        schemas(
            auth::LoginRequest,
            auth::RegisterRequest,
            auth::AuthResponse,
            auth::ChangePasswordRequest,
            users::UserDto,
            users::UpdateProfileRequest,
            stations::StationDto,
            stations::StationListingDto,
            stations::CreateStationRequest,
            stations::UpdateStationRequest,
            stations::StatusRequest,
            bookings::BookingDto,
            bookings::CreateBookingRequest,
            sessions::SessionDto,
            sessions::StartSessionRequest,
            sessions::SessionStatsDto,
            transactions::TransactionDto,
            transactions::ProcessPaymentRequest,
            transactions::TopupRequest,
            reviews::ReviewDto,
            reviews::CreateReviewRequest,
            notifications::NotificationDto,
            admin::AdminStatsDto,
            operator::OperatorStatsDto,
            operator::PricingRequest,
            ai::OptimizeRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness, database status and diagnostics"),
        (name = "Authentication", description = "Login, registration, profile and password change"),
        (name = "Users", description = "User directory and profile lookups"),
        (name = "Stations", description = "Station discovery and management"),
        (name = "Bookings", description = "Time-slot reservations of station ports"),
        (name = "Sessions", description = "Charging sessions: start, stop, history and stats"),
        (name = "Transactions", description = "Payments and the wallet"),
        (name = "Reviews", description = "Station reviews and ratings"),
        (name = "Notifications", description = "In-app notifications"),
        (name = "Admin", description = "Platform dashboard and management (admin only)"),
        (name = "Operator", description = "Operator console for the caller's stations"),
        (name = "AI", description = "AI charging optimizer"),
    ),
    info(
        title = "EVPulse API",
        version = "1.0.0",
        description = "REST API of the EVPulse EV-charging marketplace",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// `*` allows any origin; otherwise only the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}

pub fn create_api_router(
    state: AppState,
    cors_origins: &[String],
    metrics: Option<MetricsState>,
) -> Router {
    let auth_layer = || middleware::from_fn_with_state(state.auth.clone(), auth_middleware);

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/test", get(health::test_endpoint))
        .route("/db/status", get(health::db_status))
        .route("/db/diagnostics", get(health::db_diagnostics));

    // Auth: login/register are public, the rest need a token
    let auth_routes = Router::new()
        .route("/me", get(auth::get_current_user))
        .route("/update-profile", put(auth::update_profile))
        .route("/change-password", put(auth::change_password))
        .route_layer(auth_layer())
        .route("/login", post(auth::login))
        .route("/register", post(auth::register));

    let user_routes = Router::new()
        .route("/search", get(users::search_users))
        .route("/{id}", get(users::get_user).put(users::update_user))
        .route_layer(auth_layer());

    let station_routes = Router::new()
        .route("/", post(stations::create_station))
        .route("/{id}", put(stations::update_station))
        .route("/{id}/status", put(stations::update_station_status))
        .route(
            "/{id}/ports/{port_id}/status",
            put(stations::update_port_status),
        )
        .route_layer(auth_layer())
        .route("/", get(stations::list_stations))
        .route("/{id}", get(stations::get_station))
        .route("/operator/{operator_id}", get(stations::list_operator_stations));

    let booking_routes = Router::new()
        .route(
            "/",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/user/{user_id}", get(bookings::list_user_bookings))
        .route("/{id}/cancel", post(bookings::cancel_booking))
        .route("/station/{station_id}", get(bookings::list_station_bookings))
        .route_layer(auth_layer())
        .route("/available-slots", get(bookings::available_slots));

    let session_routes = Router::new()
        .route("/", get(sessions::list_sessions))
        .route("/user/{user_id}", get(sessions::list_user_sessions))
        .route("/active/{user_id}", get(sessions::active_session))
        .route("/start", post(sessions::start_session))
        .route("/stop/{id}", post(sessions::stop_session))
        .route("/station/{station_id}", get(sessions::list_station_sessions))
        .route("/history/{user_id}", get(sessions::session_history))
        .route("/stats/{user_id}", get(sessions::session_stats))
        .route_layer(auth_layer());

    let transaction_routes = Router::new()
        .route("/", get(transactions::list_transactions))
        .route("/user/{user_id}", get(transactions::list_user_transactions))
        .route("/process", post(transactions::process_payment))
        .route(
            "/wallet/balance/{user_id}",
            get(transactions::wallet_balance),
        )
        .route("/wallet/topup", post(transactions::wallet_topup))
        .route("/summary/{user_id}", get(transactions::payment_summary))
        .route_layer(auth_layer());

    let review_routes = Router::new()
        .route("/", post(reviews::create_review))
        .route("/user/{user_id}", get(reviews::user_reviews))
        .route("/{id}/helpful", post(reviews::mark_helpful))
        .route_layer(auth_layer())
        .route("/station/{station_id}", get(reviews::station_reviews));

    let notification_routes = Router::new()
        .route("/user/{user_id}", get(notifications::list_notifications))
        .route("/{id}/read", put(notifications::mark_read))
        .route(
            "/user/{user_id}/read-all",
            put(notifications::mark_all_read),
        )
        .route(
            "/{id}",
            axum::routing::delete(notifications::delete_notification),
        )
        .route(
            "/user/{user_id}/unread-count",
            get(notifications::unread_count),
        )
        .route_layer(auth_layer());

    // Layers run bottom-up: authenticate first, then check the role
    let admin_routes = Router::new()
        .route("/stats", get(admin::admin_stats))
        .route("/bookings", get(admin::all_bookings))
        .route("/sessions", get(admin::all_sessions))
        .route("/transactions", get(admin::all_transactions))
        .route("/users", get(admin::list_users))
        .route("/stations", get(admin::all_stations))
        .route("/users/{id}/status", put(admin::update_user_status))
        .route("/stations/{id}/status", put(admin::update_station_status))
        .route("/feedback/stats", get(admin::feedback_stats))
        .route("/feedback/reviews", get(admin::feedback_reviews))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(auth_layer());

    let operator_routes = Router::new()
        .route("/stats", get(operator::operator_stats))
        .route("/stations", get(operator::operator_stations))
        .route("/pricing/{station_id}", put(operator::update_pricing))
        .route(
            "/port-status/{station_id}/{port_id}",
            put(operator::update_port_status),
        )
        .route("/maintenance-alerts", get(operator::maintenance_alerts))
        .route("/feedback", get(operator::station_feedback))
        .route("/resolve-alert/{alert_id}", post(operator::resolve_alert))
        .route_layer(middleware::from_fn(require_operator))
        .route_layer(auth_layer());

    let ai_routes = Router::new().route("/optimize", post(ai::optimize));

    let api = Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/stations", station_routes)
        .nest("/bookings", booking_routes)
        .nest("/sessions", session_routes)
        .nest("/transactions", transaction_routes)
        .nest("/reviews", review_routes)
        .nest("/notifications", notification_routes)
        .nest("/admin", admin_routes)
        .nest("/operator", operator_routes)
        .nest("/ai", ai_routes);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(swagger_routes)
        .nest("/api", api)
        .with_state(state);

    if let Some(metrics_state) = metrics {
        router = router.merge(
            Router::new()
                .route("/metrics", get(prometheus_metrics))
                .with_state(metrics_state),
        );
    }

    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors_layer(cors_origins))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};

    use crate::application::seed_default_users;
    use crate::infrastructure::database::testing::test_db;
    use crate::infrastructure::database::{DatabaseConfig, SeaOrmRepositoryProvider};

    async fn app() -> Router {
        let db = test_db().await;
        let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        seed_default_users(repos.as_ref()).await.unwrap();
        let health = HealthState {
            db,
            db_config: DatabaseConfig::in_memory(),
            started_at: Arc::new(Instant::now()),
            config_issues: Arc::new(Vec::new()),
        };
        let state = AppState::new(repos, JwtConfig::default(), AiConfig::default(), health);
        create_api_router(state, &["*".to_string()], None)
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        use tower::Service;
        let mut svc = app.clone().into_service();
        let resp = svc.call(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn login(app: &Router, email: &str, password: &str) -> (String, String) {
        let (status, body) = send(
            app,
            json_request(
                "POST",
                "/api/auth/login",
                None,
                json!({"email": email, "password": password}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        (
            body["data"]["token"].as_str().unwrap().to_string(),
            body["data"]["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = app().await;
        let (status, body) = send(&app, get("/api/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["collections"]["users"], 3);
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        let app = app().await;
        let (status, body) = send(&app, get("/api/bookings", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let (status, _) = send(&app, get("/api/bookings", Some("garbage"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn role_guards_reject_drivers() {
        let app = app().await;
        let (token, _) = login(&app, "user@evpulse.com", "user123").await;

        let (status, body) = send(&app, get("/api/admin/stats", Some(&token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Unauthorized");

        let (status, _) = send(&app, get("/api/operator/stats", Some(&token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (admin, _) = login(&app, "admin@evpulse.com", "admin123").await;
        let (status, body) = send(&app, get("/api/admin/stats", Some(&admin))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["totalUsers"], 1);
        assert_eq!(body["data"]["totalOperators"], 1);
    }

    #[tokio::test]
    async fn station_booking_and_charging_flow() {
        let app = app().await;
        let (op_token, _) = login(&app, "operator@evpulse.com", "operator123").await;
        let (token, user_id) = login(&app, "user@evpulse.com", "user123").await;

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/stations",
                Some(&op_token),
                json!({
                    "name": "Baner Hub",
                    "city": "Pune",
                    "nearbyLandmark": "Baner",
                    "ports": [{"type": "Fast DC", "power": 60}, {"type": "Normal AC"}]
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["data"]["address"], "Pune - Baner");
        let station_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, get("/api/stations?city=pune", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["operatorName"], "Station Operator");

        let (status, body) = send(
            &app,
            get("/api/stations?city=pune&lat=abc&lng=&maxDistance=0", None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let booking = json!({
            "stationId": station_id,
            "portId": 1,
            "date": "2030-01-15",
            "timeSlot": "10:00 - 11:00",
            "chargingType": "Fast DC"
        });
        let (status, body) = send(
            &app,
            json_request("POST", "/api/bookings", Some(&token), booking.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["data"]["stationName"], "Baner Hub");
        assert_eq!(body["data"]["estimatedCost"], 10.5);

        let (status, body) = send(
            &app,
            json_request("POST", "/api/bookings", Some(&token), booking),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Time slot is already booked");

        let uri = format!(
            "/api/bookings/available-slots?stationId={}&date=2030-01-15&portId=1",
            station_id
        );
        let (status, body) = send(&app, get(&uri, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 12);

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/sessions/start",
                Some(&token),
                json!({"stationId": station_id, "portId": 2}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        let session_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            get(&format!("/api/sessions/active/{}", user_id), Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], session_id.as_str());

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                &format!("/api/sessions/stop/{}", session_id),
                Some(&token),
                json!({}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["data"]["status"], "completed");

        let (status, body) = send(
            &app,
            get(&format!("/api/sessions/active/{}", user_id), Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].is_null());

        let (status, body) = send(
            &app,
            get(
                &format!("/api/notifications/user/{}/unread-count", user_id),
                Some(&token),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 2);
    }

    #[tokio::test]
    async fn wallet_topup_and_balance() {
        let app = app().await;
        let (token, user_id) = login(&app, "user@evpulse.com", "user123").await;

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/transactions/wallet/topup",
                Some(&token),
                json!({"amount": 25, "cardLast4": "4242"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["newBalance"], 25.0);

        let (status, body) = send(&app, get("/api/transactions", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["type"], "wallet_topup");
        assert_eq!(body["data"][0]["cardLast4"], "4242");

        let (status, body) = send(
            &app,
            get(&format!("/api/transactions/wallet/balance/{}", user_id), Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["balance"], 25.0);

        let (status, body) = send(
            &app,
            get("/api/transactions/wallet/balance/someone-else", Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn optimizer_without_key_is_a_server_error() {
        let app = app().await;
        let (status, body) = send(
            &app,
            json_request("POST", "/api/ai/optimize", None, json!({"vehicleType": "Car"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Server AI API key not configured.");
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let app = app().await;
        let (status, body) = send(&app, get("/api-doc/openapi.json", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/bookings"].is_object());
    }
}
