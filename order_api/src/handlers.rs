use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use metrics::{counter, histogram};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::{
    cart::{CART_COOKIE, Cart, PLACED_ORDERS_COOKIE, cart_cookie},
    error::ApiError,
    executable_utils::AppState,
    model::{
        AddToCartRequest, CartLine, MessageResponse, NewOrder, Order, OrderId, OrderStatus,
        PlaceOrderRequest, PlacedOrderResponse, StatusUpdate,
    },
    notifier::notify_admin,
};

fn observe(op: &'static str, started: Instant) {
    histogram!("cocktail_backend_request_seconds", "op" => op)
        .record(started.elapsed().as_secs_f64());
}

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Cocktail Order API"))
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK").into_response()
}

pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, ApiError> {
    let started = Instant::now();
    let orders = state.storage.list_orders().await?;
    debug!("Listing {} orders", orders.len());
    observe("list_orders", started);
    Ok(Json(orders))
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(new_order): Json<NewOrder>,
) -> Result<Json<Order>, ApiError> {
    let started = Instant::now();
    new_order.validate().map_err(ApiError::BadRequest)?;

    let items_total = new_order.items_total();
    if (items_total - new_order.total_price).abs() > 1e-6 {
        warn!(
            total_price = new_order.total_price,
            items_total, "Order total does not match its items"
        );
    }

    let order = state.storage.create_order(&new_order).await?;
    counter!("cocktail_orders_created_total").increment(1);
    info!(
        order_id = order.id,
        item_count = order.items.len(),
        "Created order for {}",
        order.customer_name
    );
    observe("create_order", started);
    Ok(Json(order))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<Order>, ApiError> {
    let started = Instant::now();
    let order = state
        .storage
        .get_order(order_id)
        .await?
        .ok_or_else(ApiError::order_not_found)?;
    observe("get_order", started);
    Ok(Json(order))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
    Query(update): Query<StatusUpdate>,
) -> Result<Json<MessageResponse>, ApiError> {
    let started = Instant::now();
    if !OrderStatus::is_known(&update.status) {
        warn!(order_id, status = %update.status, "Storing unrecognised order status");
    }

    state
        .storage
        .update_status(order_id, &update.status)
        .await?
        .ok_or_else(ApiError::order_not_found)?;
    info!(order_id, status = %update.status, "Order status updated");
    observe("update_order_status", started);
    Ok(Json(MessageResponse::new("Order status updated successfully")))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<MessageResponse>, ApiError> {
    let started = Instant::now();
    if !state.storage.delete_order(order_id).await? {
        warn!(order_id, "Delete requested for unknown order");
        return Err(ApiError::order_not_found());
    }
    info!(order_id, "Order deleted");
    observe("delete_order", started);
    Ok(Json(MessageResponse::new("Order deleted successfully")))
}

pub async fn get_cart(jar: CookieJar) -> Result<Json<Vec<CartLine>>, ApiError> {
    let cart = Cart::from_jar(&jar)?;
    if cart.is_empty() {
        info!("Cart is empty");
    } else {
        info!("Cart holds {} lines", cart.len());
    }
    Ok(Json(cart.into_lines()))
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<AddToCartRequest>,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    let started = Instant::now();
    let mut cart = Cart::from_jar(&jar)?;
    debug!("Cart had {} lines before add", cart.len());

    let line = cart.add(request).map_err(ApiError::BadRequest)?;
    if line.quantity > 1 {
        info!(
            cocktail_id = %line.id,
            quantity = line.quantity,
            "Increased quantity of {}",
            line.name
        );
    } else {
        info!(cocktail_id = %line.id, "Added {} to cart", line.name);
    }

    let jar = jar.add(cart_cookie(CART_COOKIE, cart.to_cookie_value()?, &state.cart));
    notify_admin(state.notifier.as_ref(), cart.lines()).await;

    info!("Cart now holds {} lines", cart.len());
    observe("add_to_cart", started);
    Ok((jar, Json(MessageResponse::new("Order added to cart"))))
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(cocktail_id): Path<String>,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    let started = Instant::now();
    if jar.get(CART_COOKIE).is_none() {
        warn!("No cart to remove from");
        return Err(ApiError::NotFound("No orders in cart".to_string()));
    }

    let mut cart = Cart::from_jar(&jar)?;
    if cart.remove(&cocktail_id) {
        info!(%cocktail_id, "Removed from cart");
    } else {
        warn!(%cocktail_id, "Cart line not found");
    }

    let jar = jar.add(cart_cookie(CART_COOKIE, cart.to_cookie_value()?, &state.cart));
    notify_admin(state.notifier.as_ref(), cart.lines()).await;

    observe("remove_from_cart", started);
    Ok((jar, Json(MessageResponse::new("Order removed from cart"))))
}

pub async fn place_order(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(CookieJar, Json<PlacedOrderResponse>), ApiError> {
    let started = Instant::now();
    if request.orders.is_empty() {
        return Err(ApiError::BadRequest("No order data".to_string()));
    }
    info!("Placing order with {} lines", request.orders.len());

    let new_order = request.to_new_order().map_err(ApiError::BadRequest)?;
    new_order.validate().map_err(ApiError::BadRequest)?;
    let order = state.storage.create_order(&new_order).await?;
    counter!("cocktail_orders_created_total").increment(1);

    let placed = Cart::new(request.orders);
    let jar = jar
        .add(cart_cookie(PLACED_ORDERS_COOKIE, placed.to_cookie_value()?, &state.cart))
        .add(cart_cookie(CART_COOKIE, Cart::default().to_cookie_value()?, &state.cart));
    notify_admin(state.notifier.as_ref(), placed.lines()).await;

    info!(order_id = order.id, "Order placed");
    observe("place_order", started);
    Ok((
        jar,
        Json(PlacedOrderResponse {
            message: "Order placed successfully".to_string(),
            order,
        }),
    ))
}
