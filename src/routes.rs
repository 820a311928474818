use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::Environment;
use crate::database::models::{Pitch, Product, Skill};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;
use crate::uploads::UPLOAD_URL_PREFIX;

/// Full application router. Anything not matched by the API is served from
/// the public directory.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        // Public
        .route("/", get(public::system::root))
        .route("/health", get(public::system::health))
        .merge(public_routes())
        // Protected API
        .merge(protected_routes(&state))
        // Static files
        .nest_service(UPLOAD_URL_PREFIX, ServeDir::new(state.uploads.dir()))
        .fallback_service(ServeDir::new(&config.files.public_dir))
        // Global middleware
        .layer(DefaultBodyLimit::max(config.server.max_request_size_bytes))
        .layer(cors_layer(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::{auth, listings, search};

    Router::new()
        // Token acquisition
        .route("/api/signup", post(auth::signup))
        .route("/api/login", post(auth::login))
        // Catalog browsing
        .route("/api/products", get(listings::list::<Product>))
        .route("/api/skills", get(listings::list::<Skill>))
        .route("/api/pitches", get(listings::list::<Pitch>))
        // Reference data
        .route("/search-skill", get(search::search_skill))
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    use protected::{listings, orders};

    Router::new()
        // Listing creation
        .route("/api/products", post(listings::create_product))
        .route("/api/teach", post(listings::create::<Skill>))
        .route("/api/pitches", post(listings::create::<Pitch>))
        // Listing removal (owner only)
        .route("/api/products/:id", delete(listings::delete::<Product>))
        .route("/api/skills/:id", delete(listings::delete::<Skill>))
        .route("/api/pitches/:id", delete(listings::delete::<Pitch>))
        // Orders
        .route("/api/placeorder", post(orders::place_order))
        .route("/api/orders", get(orders::seller_orders))
        .route("/api/buyer-orders", get(orders::buyer_orders))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let security = &state.config.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if state.config.environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
