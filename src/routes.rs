use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::require_auth;
use crate::state::AppState;

/// Build the full application router over `state`
pub fn app(state: AppState) -> Router {
    let media = ServeDir::new(state.media.root().to_path_buf());
    let media_prefix = state.media.url_prefix().to_string();
    let body_limit = state.config.api.max_request_size_bytes;

    let mut router = Router::new()
        // Public
        .route("/", get(public::index))
        .route("/health", get(public::health))
        .merge(user_public_routes())
        // Protected
        .merge(protected_routes(state.clone()))
        // Stored uploads
        .nest_service(&media_prefix, media)
        .layer(DefaultBodyLimit::max(body_limit));

    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config.security));
    }
    if state.config.api.enable_request_logging {
        router = router.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));
    }

    router.with_state(state)
}

fn user_public_routes() -> Router<AppState> {
    use public::user;

    Router::new()
        .route("/user/create", post(user::create_post))
        .route("/user/token", post(user::token_post))
        .route("/user/token/refresh", post(user::token_refresh_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{recipe, user};

    Router::new()
        .route(
            "/user/me",
            get(user::me_get).put(user::me_put).patch(user::me_patch),
        )
        .route(
            "/recipe/tags",
            get(recipe::tags_get).post(recipe::tags_post),
        )
        .route(
            "/recipe/ingredients",
            get(recipe::ingredients_get).post(recipe::ingredients_post),
        )
        .route(
            "/recipe/recipes",
            get(recipe::recipes_get).post(recipe::recipes_post),
        )
        .route(
            "/recipe/recipes/:id",
            get(recipe::recipe_get)
                .put(recipe::recipe_put)
                .patch(recipe::recipe_patch)
                .delete(recipe::recipe_delete),
        )
        .route(
            "/recipe/recipes/:id/upload-image",
            post(recipe::upload_image_post),
        )
        .route_layer(from_fn_with_state(state, require_auth))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if security.cors_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
