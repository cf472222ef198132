use axum::{
    middleware as axum_mw,
    routing::{get, patch, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};

mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;

use config::Config;
use middleware::rate_limit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimiter,
    pub booking_rate_limiter: RateLimiter,
}

fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // --- Auth + profile routes ---
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/forgot-password", post(routes::auth::forgot_password))
        .route("/reset-password/:token", post(routes::auth::reset_password))
        .route(
            "/me",
            get(routes::auth::me).layer(axum_mw::from_fn_with_state(
                state.clone(),
                middleware::auth::authenticate,
            )),
        )
        .route(
            "/profile",
            put(routes::auth::update_profile).layer(axum_mw::from_fn_with_state(
                state.clone(),
                middleware::auth::authenticate,
            )),
        );

    // --- Venue routes ---
    let venue_routes = Router::new()
        .route("/", get(routes::venues::list_venues))
        .route(
            "/",
            post(routes::venues::create_venue)
                .layer(axum_mw::from_fn_with_state(
                    state.clone(),
                    middleware::roles::require_venue_owner,
                ))
                .layer(axum_mw::from_fn_with_state(
                    state.clone(),
                    middleware::auth::authenticate,
                )),
        )
        .route(
            "/mine",
            get(routes::venues::my_venue)
                .layer(axum_mw::from_fn_with_state(
                    state.clone(),
                    middleware::roles::require_venue_owner,
                ))
                .layer(axum_mw::from_fn_with_state(
                    state.clone(),
                    middleware::auth::authenticate,
                )),
        )
        .route("/:id", get(routes::venues::get_venue))
        .route(
            "/:id",
            put(routes::venues::update_venue)
                .delete(routes::venues::delete_venue)
                .layer(axum_mw::from_fn_with_state(
                    state.clone(),
                    middleware::auth::authenticate,
                )),
        );

    // --- Booking routes ---
    let booking_routes = Router::new()
        .route(
            "/",
            post(routes::bookings::create_booking)
                .layer(axum_mw::from_fn_with_state(
                    state.clone(),
                    middleware::rate_limit::booking_rate_limit,
                ))
                .layer(axum_mw::from_fn_with_state(
                    state.clone(),
                    middleware::roles::require_player,
                ))
                .layer(axum_mw::from_fn_with_state(
                    state.clone(),
                    middleware::auth::authenticate,
                )),
        )
        .route(
            "/me",
            get(routes::bookings::my_bookings).layer(axum_mw::from_fn_with_state(
                state.clone(),
                middleware::auth::authenticate,
            )),
        )
        .route(
            "/venue",
            get(routes::bookings::venue_bookings)
                .layer(axum_mw::from_fn_with_state(
                    state.clone(),
                    middleware::roles::require_venue_owner,
                ))
                .layer(axum_mw::from_fn_with_state(
                    state.clone(),
                    middleware::auth::authenticate,
                )),
        )
        .route(
            "/:id",
            patch(routes::bookings::set_booking_status)
                .delete(routes::bookings::delete_booking)
                .layer(axum_mw::from_fn_with_state(
                    state.clone(),
                    middleware::auth::authenticate,
                )),
        );

    // --- Admin routes ---
    let admin_routes = Router::new()
        .route("/venues", get(routes::admin::list_venues))
        .route("/venues/:id/status", post(routes::admin::set_venue_status))
        .route("/bookings", get(routes::admin::list_bookings))
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::roles::require_admin,
        ))
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::auth::authenticate,
        ));

    // --- Compose full API ---
    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/venues", venue_routes)
        .nest("/bookings", booking_routes)
        .nest("/admin", admin_routes);

    Router::new()
        .nest("/api", api)
        .route("/health", get(routes::health::health))
        // Global middleware
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit,
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .json()
        .init();

    let pool = db::create_pool(&config).await;
    db::ensure_schema(&pool)
        .await
        .expect("Failed to ensure database schema");

    let rate_limiter =
        RateLimiter::new(config.rate_limit.max_requests, config.rate_limit.window_secs);
    let booking_rate_limiter = RateLimiter::new(
        config.rate_limit.booking_submit_max,
        config.rate_limit.window_secs,
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let state = AppState {
        db: pool,
        config: Arc::new(config),
        rate_limiter,
        booking_rate_limiter,
    };

    tracing::info!("Futsal Court API listening on {addr}");

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
