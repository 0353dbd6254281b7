// server/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crossdock::catalog::NewProduct;
use crossdock::StockReason;

use crate::errors::ApiError;
use crate::state::AppState;
use crate::web::extractors::Identity;

/// Reason is restricted to `restock`/`manual_adjustment`; order flows
/// write their ledger rows themselves.
#[derive(Deserialize, Debug)]
pub struct StockAdjustmentPayload {
  pub delta: i64,
  pub reason: StockReason,
  pub note: Option<String>,
}

#[instrument(name = "handler::create_product", skip(state, payload, identity), fields(name = %payload.name))]
pub async fn create_product(
  state: web::Data<AppState>,
  payload: web::Json<NewProduct>,
  identity: Identity,
) -> Result<HttpResponse, ApiError> {
  let admin = identity.require_admin()?;
  let product = state.catalog.create_product(payload.into_inner(), admin)?;
  info!(product_id = %product.id, "product created");
  Ok(HttpResponse::Created().json(product))
}

#[instrument(name = "handler::list_products", skip(state))]
pub async fn list_products(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
  let products = state.catalog.products();
  let count = products.len();
  Ok(HttpResponse::Ok().json(json!({ "products": products, "count": count })))
}

#[instrument(name = "handler::get_product", skip(state))]
pub async fn get_product(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
  let product = state.catalog.product(path.into_inner())?;
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::adjust_stock", skip(state, payload, identity))]
pub async fn adjust_stock(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<StockAdjustmentPayload>,
  identity: Identity,
) -> Result<HttpResponse, ApiError> {
  let admin = identity.require_admin()?;
  let payload = payload.into_inner();
  let product = state.catalog.adjust_stock(
    path.into_inner(),
    payload.delta,
    payload.reason,
    admin,
    payload.note,
  )?;
  info!(product_id = %product.id, stock = product.stock_quantity, "stock adjusted");
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::inventory_history", skip(state))]
pub async fn inventory_history(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
  let product_id = path.into_inner();
  // 404 for ghosts; an empty history on a real product is a valid answer.
  state.catalog.product(product_id)?;
  let rows = state.ledger.history(product_id);
  Ok(HttpResponse::Ok().json(json!({ "product_id": product_id, "rows": rows })))
}
