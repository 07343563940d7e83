//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{delete, get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{
    AccountPolicy, Authenticator, ChargingService, MaintenanceService, StationService, UserService,
};
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::JwtConfig;
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::{
    auth, chargers, health, maintenance, metrics, request_id, sessions, stations, users,
};
use crate::shared::SharedClock;

/// State shared by every API handler.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub stations: Arc<StationService>,
    pub charging: Arc<ChargingService>,
    pub maintenance: Arc<MaintenanceService>,
    pub repos: Arc<dyn RepositoryProvider>,
    pub auth: AuthState,
    pub started_at: Arc<Instant>,
}

impl AppState {
    /// Wire all services over one repository provider.
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        jwt_config: JwtConfig,
        policy: AccountPolicy,
        clock: SharedClock,
    ) -> Self {
        let authenticator = Arc::new(Authenticator::new(repos.clone(), &jwt_config));
        Self {
            users: Arc::new(UserService::new(repos.clone(), jwt_config, policy)),
            stations: Arc::new(StationService::new(repos.clone())),
            charging: Arc::new(ChargingService::new(repos.clone(), clock.clone())),
            maintenance: Arc::new(MaintenanceService::new(repos.clone(), clock)),
            repos,
            auth: AuthState { authenticator },
            started_at: Arc::new(Instant::now()),
        }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(s: &AppState) -> Self {
        s.auth.clone()
    }
}

impl FromRef<AppState> for health::HealthState {
    fn from_ref(s: &AppState) -> Self {
        health::HealthState {
            repos: s.repos.clone(),
            started_at: s.started_at.clone(),
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
                        .description(Some("Token from POST /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        metrics::prometheus_metrics,
        auth::register,
        auth::login,
        auth::me,
        users::list_users,
        users::get_user,
        users::recharge,
        users::session_history,
        stations::list_stations,
        stations::create_station,
        stations::get_station,
        stations::delete_station,
        stations::station_availability,
        stations::station_consumption,
        stations::add_charger,
        chargers::list_chargers,
        chargers::get_charger,
        sessions::start_session,
        sessions::close_session,
        sessions::active_session,
        maintenance::list_maintenance,
        maintenance::schedule_maintenance,
        maintenance::get_maintenance,
        maintenance::start_maintenance,
        maintenance::complete_maintenance,
    ),
    components(schemas(
        health::HealthResponse,
        auth::RegisterRequest,
        auth::LoginRequest,
        auth::LoginResponse,
        users::RoleDto,
        users::UserDto,
        users::RechargeRequest,
        users::RechargeResponse,
        stations::StationDto,
        stations::CreateStationRequest,
        stations::AddChargerRequest,
        stations::AvailabilityDto,
        stations::ConsumptionReportDto,
        chargers::ChargerDto,
        chargers::ChargerTypeDto,
        chargers::ChargerStatusDto,
        sessions::StartSessionRequest,
        sessions::SessionDto,
        sessions::SessionStatusDto,
        sessions::CloseSessionResponse,
        maintenance::ScheduleMaintenanceRequest,
        maintenance::CompleteMaintenanceRequest,
        maintenance::MaintenanceDto,
        maintenance::MaintenanceKindDto,
        maintenance::MaintenanceStatusDto,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and Prometheus metrics"),
        (name = "Authentication", description = "Registration, login and the current user"),
        (name = "Users", description = "Profiles, balance recharge and session history"),
        (name = "Stations", description = "Stations, their chargers and reports"),
        (name = "Chargers", description = "Charger lookup"),
        (name = "Sessions", description = "Starting and closing charging sessions"),
        (name = "Maintenance", description = "Preventive and corrective maintenance"),
    ),
    info(
        title = "VoltEdge API",
        description = "EV charging network: stations, sessions, billing and maintenance",
    )
)]
pub struct ApiDoc;

/// Build the full HTTP application.
///
/// Without a Prometheus handle `/metrics` is not mounted.
pub fn create_api_router(state: AppState, prometheus: Option<PrometheusHandle>) -> Router {
    let auth_layer = middleware::from_fn_with_state(state.auth.clone(), auth_middleware);

    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/stations", get(stations::list_stations))
        .route("/api/v1/stations/{id}", get(stations::get_station))
        .route(
            "/api/v1/stations/{id}/availability",
            get(stations::station_availability),
        )
        .route("/api/v1/chargers", get(chargers::list_chargers))
        .route("/api/v1/chargers/{id}", get(chargers::get_charger));

    let protected = Router::new()
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/users", get(users::list_users))
        .route("/api/v1/users/{id}", get(users::get_user))
        .route("/api/v1/users/{id}/recharge", post(users::recharge))
        .route("/api/v1/users/{id}/sessions", get(users::session_history))
        .route("/api/v1/stations", post(stations::create_station))
        .route("/api/v1/stations/{id}", delete(stations::delete_station))
        .route(
            "/api/v1/stations/{id}/consumption",
            get(stations::station_consumption),
        )
        .route("/api/v1/stations/{id}/chargers", post(stations::add_charger))
        .route("/api/v1/sessions", post(sessions::start_session))
        .route("/api/v1/sessions/close", post(sessions::close_session))
        .route("/api/v1/sessions/active", get(sessions::active_session))
        .route(
            "/api/v1/maintenance",
            get(maintenance::list_maintenance).post(maintenance::schedule_maintenance),
        )
        .route("/api/v1/maintenance/{id}", get(maintenance::get_maintenance))
        .route(
            "/api/v1/maintenance/{id}/start",
            post(maintenance::start_maintenance),
        )
        .route(
            "/api/v1/maintenance/{id}/complete",
            post(maintenance::complete_maintenance),
        )
        .route_layer(auth_layer);

    let mut app = public.merge(protected).with_state(state);

    if let Some(handle) = prometheus {
        let metrics_routes = Router::new()
            .route("/metrics", get(metrics::prometheus_metrics))
            .with_state(metrics::MetricsState { handle });
        app = app.merge(metrics_routes);
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    app.merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::{json, Value};
    use tower::Service;

    use crate::config::AccountConfig;
    use crate::infrastructure::InMemoryRepositoryProvider;
    use crate::shared::ManualClock;

    struct TestApp {
        router: Router,
        clock: Arc<ManualClock>,
        state: AppState,
    }

    impl TestApp {
        async fn new() -> Self {
            let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()));
            let policy = AccountPolicy::new(&AccountConfig::default(), 4);
            let state = AppState::new(
                InMemoryRepositoryProvider::shared(),
                JwtConfig::default(),
                policy,
                clock.clone(),
            );
            state
                .users
                .bootstrap_admin(&crate::config::AdminConfig::default())
                .await
                .unwrap();
            Self {
                router: create_api_router(state.clone(), None),
                clock,
                state,
            }
        }

        async fn call(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut req = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                req = req.header("authorization", format!("Bearer {}", token));
            }
            let req = match body {
                Some(b) => req
                    .header("content-type", "application/json")
                    .body(Body::from(b.to_string()))
                    .unwrap(),
                None => req.body(Body::empty()).unwrap(),
            };

            let mut svc = self.router.clone().into_service();
            let resp = svc.call(req).await.unwrap();
            let status = resp.status();
            let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
                .await
                .unwrap();
            let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, json)
        }

        async fn login(&self, email: &str, password: &str) -> String {
            let (status, json) = self
                .call(
                    "POST",
                    "/api/v1/auth/login",
                    None,
                    Some(json!({"email": email, "password": password})),
                )
                .await;
            assert_eq!(status, StatusCode::OK, "{}", json);
            json["data"]["token"].as_str().unwrap().to_string()
        }

        async fn admin_token(&self) -> String {
            self.login("admin@voltedge.local", "admin123").await
        }

        async fn register(&self, email: &str, role: &str, balance: &str) -> (String, String) {
            let (status, json) = self
                .call(
                    "POST",
                    "/api/v1/auth/register",
                    None,
                    Some(json!({
                        "name": "Driver",
                        "email": email,
                        "password": "secret-pass",
                        "role": role,
                        "initial_balance": balance,
                    })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{}", json);
            let id = json["data"]["id"].as_str().unwrap().to_string();
            (id, self.login(email, "secret-pass").await)
        }

        async fn station_with_chargers(&self, admin: &str, station_id: u32, chargers: &[u32]) {
            let (status, _) = self
                .call(
                    "POST",
                    "/api/v1/stations",
                    Some(admin),
                    Some(json!({"id": station_id, "name": "Hub", "location": "Main St"})),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
            for id in chargers {
                let (status, _) = self
                    .call(
                        "POST",
                        &format!("/api/v1/stations/{}/chargers", station_id),
                        Some(admin),
                        Some(json!({"id": id, "type": "fast"})),
                    )
                    .await;
                assert_eq!(status, StatusCode::CREATED);
            }
        }
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = TestApp::new().await;
        let (status, json) = app.call("GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["users"], 1);
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let app = TestApp::new().await;
        let req = Request::builder()
            .uri("/health")
            .header("x-request-id", "trace-42")
            .body(Body::empty())
            .unwrap();
        let mut svc = app.router.clone().into_service();
        let resp = svc.call(req).await.unwrap();
        assert_eq!(resp.headers()["x-request-id"], "trace-42");
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let app = TestApp::new().await;
        let (status, json) = app.call("GET", "/api/v1/auth/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["success"], false);

        let (status, _) = app
            .call("GET", "/api/v1/auth/me", Some("not-a-jwt"), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_path_is_404_not_401() {
        let app = TestApp::new().await;
        let (status, _) = app.call("GET", "/api/v1/nowhere", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn station_listing_is_public_but_creation_is_admin_only() {
        let app = TestApp::new().await;
        let (_, driver) = app.register("d@example.com", "individual", "10").await;

        let (status, _) = app
            .call(
                "POST",
                "/api/v1/stations",
                Some(&driver),
                Some(json!({"id": 1, "name": "Hub", "location": "Main St"})),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app
            .call(
                "POST",
                "/api/v1/stations",
                None,
                Some(json!({"id": 1, "name": "Hub", "location": "Main St"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let admin = app.admin_token().await;
        app.station_with_chargers(&admin, 1, &[11, 12]).await;

        let (status, json) = app.call("GET", "/api/v1/stations", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"][0]["charger_ids"], json!([11, 12]));

        let (status, json) = app
            .call("GET", "/api/v1/chargers?station_id=1", None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().unwrap().len(), 2);
        assert_eq!(json["data"][0]["status"], "available");
    }

    #[tokio::test]
    async fn self_registration_cannot_create_admins() {
        let app = TestApp::new().await;
        let (status, _) = app
            .call(
                "POST",
                "/api/v1/auth/register",
                None,
                Some(json!({
                    "name": "Mallory",
                    "email": "m@example.com",
                    "password": "secret-pass",
                    "role": "admin",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn invalid_email_is_422() {
        let app = TestApp::new().await;
        let (status, json) = app
            .call(
                "POST",
                "/api/v1/auth/register",
                None,
                Some(json!({"name": "X", "email": "nope", "password": "secret-pass"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["error"].as_str().unwrap().contains("email"));
    }

    #[tokio::test]
    async fn full_charging_flow_bills_the_session() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        app.station_with_chargers(&admin, 1, &[11]).await;
        let (user_id, driver) = app.register("d@example.com", "individual", "10.00").await;

        let (status, json) = app
            .call(
                "POST",
                "/api/v1/sessions",
                Some(&driver),
                Some(json!({"station_id": 1})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", json);
        assert_eq!(json["data"]["status"], "open");
        assert_eq!(json["data"]["charger_id"], 11);

        let (_, json) = app.call("GET", "/api/v1/chargers/11", None, None).await;
        assert_eq!(json["data"]["status"], "occupied");

        app.clock.advance(Duration::minutes(20));

        let (status, json) = app
            .call("POST", "/api/v1/sessions/close", Some(&driver), None)
            .await;
        assert_eq!(status, StatusCode::OK, "{}", json);
        assert_eq!(json["data"]["session"]["energy_kwh"], "10");
        assert_eq!(json["data"]["session"]["cost"], "3.00");
        assert_eq!(json["data"]["balance"], "7.00");

        let (_, json) = app.call("GET", "/api/v1/chargers/11", None, None).await;
        assert_eq!(json["data"]["status"], "available");

        let (status, json) = app
            .call(
                "GET",
                &format!("/api/v1/users/{}/sessions", user_id),
                Some(&admin),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"][0]["status"], "closed");

        let (_, json) = app
            .call("GET", "/api/v1/stations/1/consumption", Some(&admin), None)
            .await;
        assert_eq!(json["data"]["total_revenue"], "3.00");
    }

    #[tokio::test]
    async fn insufficient_balance_is_402() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        app.station_with_chargers(&admin, 1, &[11]).await;
        let (_, driver) = app.register("d@example.com", "individual", "1.00").await;

        app.call(
            "POST",
            "/api/v1/sessions",
            Some(&driver),
            Some(json!({"station_id": 1})),
        )
        .await;
        app.clock.advance(Duration::minutes(60));

        let (status, json) = app
            .call("POST", "/api/v1/sessions/close", Some(&driver), None)
            .await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(json["success"], false);

        let (_, json) = app
            .call("GET", "/api/v1/sessions/active", Some(&driver), None)
            .await;
        assert_eq!(json["data"]["status"], "open");
    }

    #[tokio::test]
    async fn second_session_for_same_user_conflicts() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        app.station_with_chargers(&admin, 1, &[11, 12]).await;
        let (_, driver) = app.register("d@example.com", "company", "10").await;

        let body = Some(json!({"station_id": 1}));
        let (status, _) = app
            .call("POST", "/api/v1/sessions", Some(&driver), body.clone())
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = app
            .call("POST", "/api/v1/sessions", Some(&driver), body)
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn recharge_is_self_only() {
        let app = TestApp::new().await;
        let (alice_id, alice) = app.register("a@example.com", "individual", "0").await;
        let (_, bob) = app.register("b@example.com", "individual", "0").await;
        let uri = format!("/api/v1/users/{}/recharge", alice_id);

        let (status, _) = app
            .call("POST", &uri, Some(&bob), Some(json!({"amount": "5"})))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app
            .call("POST", &uri, Some(&alice), Some(json!({"amount": "0"})))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = app
            .call(
                "POST",
                &uri,
                Some(&alice),
                Some(json!({"amount": "79228162514264337593543950335"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, json) = app
            .call("POST", &uri, Some(&alice), Some(json!({"amount": "12.50"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["balance"], "12.50");
    }

    #[tokio::test]
    async fn user_listing_is_admin_only() {
        let app = TestApp::new().await;
        let (_, driver) = app.register("d@example.com", "individual", "0").await;

        let (status, _) = app.call("GET", "/api/v1/users", Some(&driver), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let admin = app.admin_token().await;
        let (status, json) = app.call("GET", "/api/v1/users", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn maintenance_takes_charger_out_of_service() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        app.station_with_chargers(&admin, 1, &[11]).await;

        let (status, json) = app
            .call(
                "POST",
                "/api/v1/maintenance",
                Some(&admin),
                Some(json!({
                    "station_id": 1,
                    "charger_id": 11,
                    "kind": "corrective",
                    "fault_description": "cable damaged",
                    "scheduled_for": "2026-03-02",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", json);
        let id = json["data"]["id"].as_u64().unwrap();
        assert_eq!(json["data"]["status"], "scheduled");

        let (status, _) = app
            .call("POST", &format!("/api/v1/maintenance/{}/start", id), Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let (_, json) = app.call("GET", "/api/v1/chargers/11", None, None).await;
        assert_eq!(json["data"]["status"], "under_maintenance");

        let (_, driver) = app.register("d@example.com", "individual", "10").await;
        let (status, _) = app
            .call(
                "POST",
                "/api/v1/sessions",
                Some(&driver),
                Some(json!({"station_id": 1})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, json) = app
            .call(
                "POST",
                &format!("/api/v1/maintenance/{}/complete", id),
                Some(&admin),
                Some(json!({"notes": "cable replaced"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "completed");

        let (_, json) = app.call("GET", "/api/v1/stations/1/availability", None, None).await;
        assert_eq!(json["data"]["available"], 1);
    }

    #[tokio::test]
    async fn preventive_maintenance_without_frequency_is_400() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        app.station_with_chargers(&admin, 1, &[]).await;

        let (status, _) = app
            .call(
                "POST",
                "/api/v1/maintenance",
                Some(&admin),
                Some(json!({
                    "station_id": 1,
                    "kind": "preventive",
                    "scheduled_for": "2026-03-02",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn deleting_station_removes_its_chargers() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        app.station_with_chargers(&admin, 1, &[11]).await;

        let (status, _) = app
            .call("DELETE", "/api/v1/stations/1", Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app.call("GET", "/api/v1/stations/1", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.call("GET", "/api/v1/chargers/11", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(app.state.repos.chargers().find_all().await.unwrap().is_empty());
    }

    #[test]
    fn openapi_document_lists_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/sessions/close"));
        assert!(doc.paths.paths.contains_key("/api/v1/stations/{id}/chargers"));
    }
}
