use crate::models::{AddItemRequest, CartResponse, HealthResponse, ReplaceCartRequest, SetQtyRequest};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use cart::domain::CartId;
use tracing::{error, info, warn};

fn internal_error(operation: &str, err: shared::Error) -> StatusCode {
    error!("{} failed: {}", operation, err);
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Cart ids in paths must be the v4 UUIDs handed out by `create_cart`
fn cart_id(raw: &str) -> Result<CartId, StatusCode> {
    CartId::parse(raw).map_err(|e| {
        warn!("Rejected request: {}", e);
        StatusCode::BAD_REQUEST
    })
}

/// GET /health
pub async fn health_check() -> Result<Json<HealthResponse>, StatusCode> {
    Ok(Json(HealthResponse {
        message: "OK".into(),
    }))
}

/// POST /carts
pub async fn create_cart(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CartResponse>), StatusCode> {
    let id = state
        .cart_store
        .create_cart()
        .await
        .map_err(|e| internal_error("create_cart", e))?;
    info!("CREATE: cart={}", id);

    Ok((
        StatusCode::CREATED,
        Json(CartResponse {
            id,
            cart: Default::default(),
        }),
    ))
}

/// GET /carts/{id}
pub async fn get_cart(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CartResponse>, StatusCode> {
    let id = cart_id(&id)?;
    let cart = state
        .cart_store
        .get_cart(&id)
        .await
        .map_err(|e| internal_error("get_cart", e))?;

    Ok(Json(CartResponse { id, cart }))
}

/// PUT /carts/{id}
pub async fn replace_cart(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReplaceCartRequest>,
) -> Result<Json<CartResponse>, StatusCode> {
    let id = cart_id(&id)?;
    let cart = req.into_cart();
    info!("REPLACE: cart={}, lines={}", id, cart.len());

    state
        .cart_store
        .set_cart(&id, cart.clone())
        .await
        .map_err(|e| internal_error("set_cart", e))?;

    Ok(Json(CartResponse { id, cart }))
}

/// DELETE /carts/{id}
pub async fn delete_cart(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let id = cart_id(&id)?;
    info!("DELETE: cart={}", id);

    state
        .cart_store
        .delete_cart(&id)
        .await
        .map_err(|e| internal_error("delete_cart", e))?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /carts/{id}/items
pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartResponse>, StatusCode> {
    if req.qty < 1 {
        return Err(StatusCode::BAD_REQUEST);
    }
    let id = cart_id(&id)?;
    info!("ADD: cart={}, sku={}, qty={}", id, req.sku.id, req.qty);

    let cart = state
        .cart_store
        .increment_qty(&id, req.sku, req.qty)
        .await
        .map_err(|e| internal_error("increment_qty", e))?;

    Ok(Json(CartResponse { id, cart }))
}

/// PATCH /carts/{id}/items/{sku_id}
pub async fn set_qty(
    State(state): State<AppState>,
    Path((id, sku_id)): Path<(String, String)>,
    Json(req): Json<SetQtyRequest>,
) -> Result<Json<CartResponse>, StatusCode> {
    let id = cart_id(&id)?;
    info!("SET QTY: cart={}, sku={}, qty={}", id, sku_id, req.qty);

    match state.cart_store.set_qty(&id, &sku_id, req.qty).await {
        Ok(Some(cart)) => Ok(Json(CartResponse { id, cart })),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(internal_error("set_qty", e)),
    }
}

/// DELETE /carts/{id}/items/{sku_id}
pub async fn remove_item(
    State(state): State<AppState>,
    Path((id, sku_id)): Path<(String, String)>,
) -> Result<Json<CartResponse>, StatusCode> {
    let id = cart_id(&id)?;
    info!("REMOVE: cart={}, sku={}", id, sku_id);

    match state.cart_store.remove_item(&id, &sku_id).await {
        Ok(Some(cart)) => Ok(Json(CartResponse { id, cart })),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(internal_error("remove_item", e)),
    }
}
