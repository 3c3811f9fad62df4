use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;

/// Build and configure the application router.
/// Trailing slashes are trimmed before routing, so the router is wrapped
/// rather than layered.
pub fn build_router(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Cart routes
        .route("/carts", post(handlers::create_cart))
        .route(
            "/carts/{id}",
            get(handlers::get_cart)
                .put(handlers::replace_cart)
                .delete(handlers::delete_cart),
        )
        .route("/carts/{id}/items", post(handlers::add_item))
        .route(
            "/carts/{id}/items/{sku_id}",
            patch(handlers::set_qty).delete(handlers::remove_item),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    NormalizePath::trim_trailing_slash(router)
}
