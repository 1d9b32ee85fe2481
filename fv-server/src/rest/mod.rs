pub mod controllers;

pub use controllers::{
    ActivityController, AdminController, IdeasController, NexusController, ShareController,
    SystemController, TeamsController, UsersController, ValidationController, WaitlistController,
};

use crate::ServerConfig;
use crate::auth::USER_EMAIL_HEADER;
use crate::error::expose_error_details;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    middleware,
    routing::{get, post},
};
use fv_telemetry::warn;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Build CORS layer based on security configuration
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(USER_EMAIL_HEADER),
        ]);

    if config.security.allowed_origins.is_empty() {
        warn!("no CORS origins configured; allowing any origin");
        cors.allow_origin(AllowOrigin::any())
    } else {
        let origins: Vec<HeaderValue> =
            config.security.allowed_origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

/// Create the `/api` application.
pub fn create_app(config: ServerConfig) -> Router {
    let database = config.database.clone();

    let api_router = Router::new()
        .route("/health", get(controllers::system::health))
        .route("/init-db", post(controllers::system::init_db))
        .with_state(SystemController::new(database.clone()))
        .route(
            "/users",
            get(controllers::users::get_user).post(controllers::users::upsert_user),
        )
        .with_state(UsersController::new(database.clone()))
        .route(
            "/ideas",
            get(controllers::ideas::list_ideas).post(controllers::ideas::save_draft),
        )
        .route(
            "/ideas/{id}",
            get(controllers::ideas::get_idea).delete(controllers::ideas::delete_idea),
        )
        .with_state(IdeasController::new(database.clone()))
        .route("/validate-idea", post(controllers::validation::validate_idea))
        .with_state(ValidationController::new(&config))
        .route(
            "/teams",
            get(controllers::teams::list_teams).post(controllers::teams::team_action),
        )
        .route("/teams/join", post(controllers::teams::join_team))
        .with_state(TeamsController::new(database.clone()))
        .route("/nexus", get(controllers::nexus::list_research))
        .route("/nexus/analyze", post(controllers::nexus::analyze))
        .route("/nexus/{id}", get(controllers::nexus::get_research))
        .with_state(NexusController::new(&config))
        .route("/share/{token}", get(controllers::share::get_shared))
        .with_state(ShareController::new(database.clone()))
        .route(
            "/waitlist",
            get(controllers::waitlist::list_waitlist).post(controllers::waitlist::join_waitlist),
        )
        .with_state(WaitlistController::new(database.clone()))
        .route("/activity", get(controllers::activity::list_activity))
        .with_state(ActivityController::new(database))
        .route("/admin/ideas", get(controllers::admin::list_ideas))
        .with_state(AdminController::new(config.clone()))
        .layer(middleware::map_response_with_state(
            config.security.expose_error_details,
            expose_error_details,
        ));

    let app = Router::new().nest("/api", api_router);

    let cors_layer = build_cors_layer(&config);

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                config.security.request_timeout,
            ))
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(cors_layer)
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("DENY"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_XSS_PROTECTION,
                HeaderValue::from_static("1; mode=block"),
            )),
    )
}
