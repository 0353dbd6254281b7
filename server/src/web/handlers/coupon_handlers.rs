// server/src/web/handlers/coupon_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crossdock::catalog::{CouponPatch, NewCoupon};

use crate::errors::ApiError;
use crate::state::AppState;
use crate::web::extractors::Identity;

#[instrument(name = "handler::create_coupon", skip(state, payload, identity), fields(code = %payload.code))]
pub async fn create_coupon(
  state: web::Data<AppState>,
  payload: web::Json<NewCoupon>,
  identity: Identity,
) -> Result<HttpResponse, ApiError> {
  identity.require_admin()?;
  let coupon = state.catalog.create_coupon(payload.into_inner())?;
  info!(coupon_id = %coupon.id, code = %coupon.code, "coupon created");
  Ok(HttpResponse::Created().json(coupon))
}

#[instrument(name = "handler::list_coupons", skip(state))]
pub async fn list_coupons(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
  let coupons = state.catalog.coupons();
  let count = coupons.len();
  Ok(HttpResponse::Ok().json(json!({ "coupons": coupons, "count": count })))
}

#[instrument(name = "handler::get_coupon", skip(state))]
pub async fn get_coupon(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
  let coupon = state.catalog.coupon(path.into_inner())?;
  Ok(HttpResponse::Ok().json(coupon))
}

#[instrument(name = "handler::get_coupon_by_code", skip(state))]
pub async fn get_coupon_by_code(
  state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
  let coupon = state.catalog.coupon_by_code(&path.into_inner())?;
  Ok(HttpResponse::Ok().json(coupon))
}

#[instrument(name = "handler::update_coupon", skip(state, payload, identity))]
pub async fn update_coupon(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<CouponPatch>,
  identity: Identity,
) -> Result<HttpResponse, ApiError> {
  identity.require_admin()?;
  let coupon = state.catalog.update_coupon(path.into_inner(), payload.into_inner())?;
  info!(coupon_id = %coupon.id, "coupon updated");
  Ok(HttpResponse::Ok().json(coupon))
}

#[instrument(name = "handler::deactivate_coupon", skip(state, identity))]
pub async fn deactivate_coupon(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
  identity: Identity,
) -> Result<HttpResponse, ApiError> {
  identity.require_admin()?;
  let coupon = state.catalog.deactivate_coupon(path.into_inner())?;
  info!(coupon_id = %coupon.id, "coupon deactivated");
  Ok(HttpResponse::Ok().json(coupon))
}
