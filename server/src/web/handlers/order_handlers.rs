// server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crossdock::{CheckoutItem, CheckoutRequest, OrderStatus};

use crate::errors::ApiError;
use crate::state::AppState;
use crate::web::extractors::Identity;

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
pub struct CreateOrderPayload {
  pub customer_id: Uuid,
  pub items: Vec<OrderItemPayload>,
  pub coupon_code: Option<String>,
  #[serde(default)]
  pub allow_without_coupon: bool,
  #[serde(default = "default_shipping_method")]
  pub shipping_method: String,
}

fn default_shipping_method() -> String {
  "standard".to_string()
}

/// Catalog lines carry `product_id`; external (dropship) lines carry
/// their own `name` and `unit_price` instead.
#[derive(Deserialize, Debug)]
pub struct OrderItemPayload {
  pub product_id: Option<Uuid>,
  pub quantity: u32,
  pub name: Option<String>,
  pub sku: Option<String>,
  pub unit_price: Option<Decimal>,
  pub variation: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateStatusPayload {
  pub status: String,
  pub note: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ListOrdersQuery {
  pub customer_id: Option<Uuid>,
  pub status: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct SourcingPatchPayload {
  pub sourcing_ref: Option<String>,
  pub sourcing_note: Option<String>,
}

// --- Handler Implementations ---

#[instrument(
  name = "handler::create_order",
  skip(state, payload, identity),
  fields(customer_id = %payload.customer_id)
)]
pub async fn create_order(
  state: web::Data<AppState>,
  payload: web::Json<CreateOrderPayload>,
  identity: Identity,
) -> Result<HttpResponse, ApiError> {
  let payload = payload.into_inner();
  let request = CheckoutRequest {
    customer_id: payload.customer_id,
    items: payload
      .items
      .into_iter()
      .map(|item| CheckoutItem {
        product_id: item.product_id,
        quantity: item.quantity,
        name: item.name,
        sku: item.sku,
        unit_price: item.unit_price,
        variation: item.variation,
      })
      .collect(),
    coupon_code: payload.coupon_code,
    allow_without_coupon: payload.allow_without_coupon,
    shipping_method: payload.shipping_method,
  };

  let outcome = state.assembler.create(request, identity.actor()).await?;
  info!(
    order_number = %outcome.order.order_number,
    total = %outcome.order.total_amount,
    "order created"
  );

  Ok(HttpResponse::Created().json(json!({
    "order": outcome.order,
    "items": outcome.items,
    "deal": outcome.deal,
    "coupon": outcome.coupon,
    "coupon_rejection": outcome.coupon_rejection.map(|reason| reason.to_string()),
    "currency": state.config.currency,
  })))
}

#[instrument(name = "handler::get_order", skip(state))]
pub async fn get_order(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
  let summary = state.queries.summary(path.into_inner())?;
  Ok(HttpResponse::Ok().json(summary))
}

#[instrument(name = "handler::get_order_by_number", skip(state))]
pub async fn get_order_by_number(
  state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
  let summary = state.queries.by_number(&path.into_inner())?;
  Ok(HttpResponse::Ok().json(summary))
}

#[instrument(name = "handler::list_orders", skip(state, query))]
pub async fn list_orders(
  state: web::Data<AppState>,
  query: web::Query<ListOrdersQuery>,
) -> Result<HttpResponse, ApiError> {
  let status = match query.status.as_deref() {
    Some(raw) => Some(
      raw
        .parse::<OrderStatus>()
        .map_err(|e| ApiError::Validation(e.to_string()))?,
    ),
    None => None,
  };
  let orders = state.queries.list(query.customer_id, status);
  let count = orders.len();
  Ok(HttpResponse::Ok().json(json!({ "orders": orders, "count": count })))
}

#[instrument(name = "handler::update_order_status", skip(state, payload, identity))]
pub async fn update_status(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateStatusPayload>,
  identity: Identity,
) -> Result<HttpResponse, ApiError> {
  let order_id = path.into_inner();
  let payload = payload.into_inner();
  let target = payload
    .status
    .parse::<OrderStatus>()
    .map_err(|e| ApiError::Validation(e.to_string()))?;

  // The cancellation workflow owns the stock restore, so a cancel target
  // must go through it rather than the bare transition.
  let order = if target == OrderStatus::Cancelled {
    state
      .cancellation
      .cancel(order_id, identity.actor(), payload.note)
      .await?
  } else {
    state
      .machine
      .transition(order_id, target, identity.actor(), payload.note)?
  };

  info!(order_number = %order.order_number, status = %order.status, "order status updated");
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::delete_order", skip(state, identity))]
pub async fn delete_order(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
  identity: Identity,
) -> Result<HttpResponse, ApiError> {
  let admin = identity.require_admin()?;
  state.machine.delete(path.into_inner(), admin)?;
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(name = "handler::order_history", skip(state))]
pub async fn order_history(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
  let order_id = path.into_inner();
  let history = state.queries.history(order_id)?;
  Ok(HttpResponse::Ok().json(json!({ "order_id": order_id, "history": history })))
}

#[instrument(name = "handler::patch_item_sourcing", skip(state, payload, identity))]
pub async fn patch_item_sourcing(
  state: web::Data<AppState>,
  path: web::Path<(Uuid, Uuid)>,
  payload: web::Json<SourcingPatchPayload>,
  identity: Identity,
) -> Result<HttpResponse, ApiError> {
  identity.require_admin()?;
  let (order_id, item_id) = path.into_inner();
  let payload = payload.into_inner();
  let item = state
    .machine
    .update_item_sourcing(order_id, item_id, payload.sourcing_ref, payload.sourcing_note)?;
  Ok(HttpResponse::Ok().json(item))
}
