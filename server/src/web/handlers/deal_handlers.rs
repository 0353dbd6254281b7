// server/src/web/handlers/deal_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crossdock::catalog::{DealPatch, NewDeal};

use crate::errors::ApiError;
use crate::state::AppState;
use crate::web::extractors::Identity;

#[instrument(name = "handler::create_deal", skip(state, payload, identity), fields(name = %payload.name))]
pub async fn create_deal(
  state: web::Data<AppState>,
  payload: web::Json<NewDeal>,
  identity: Identity,
) -> Result<HttpResponse, ApiError> {
  identity.require_admin()?;
  let deal = state.catalog.create_deal(payload.into_inner())?;
  info!(deal_id = %deal.id, name = %deal.name, "deal created");
  Ok(HttpResponse::Created().json(deal))
}

#[instrument(name = "handler::list_deals", skip(state))]
pub async fn list_deals(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
  let deals = state.catalog.deals();
  let count = deals.len();
  Ok(HttpResponse::Ok().json(json!({ "deals": deals, "count": count })))
}

#[instrument(name = "handler::get_deal", skip(state))]
pub async fn get_deal(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
  let deal = state.catalog.deal(path.into_inner())?;
  Ok(HttpResponse::Ok().json(deal))
}

#[instrument(name = "handler::update_deal", skip(state, payload, identity))]
pub async fn update_deal(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<DealPatch>,
  identity: Identity,
) -> Result<HttpResponse, ApiError> {
  identity.require_admin()?;
  let deal = state.catalog.update_deal(path.into_inner(), payload.into_inner())?;
  info!(deal_id = %deal.id, "deal updated");
  Ok(HttpResponse::Ok().json(deal))
}

#[instrument(name = "handler::deactivate_deal", skip(state, identity))]
pub async fn deactivate_deal(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
  identity: Identity,
) -> Result<HttpResponse, ApiError> {
  identity.require_admin()?;
  let deal = state.catalog.deactivate_deal(path.into_inner())?;
  info!(deal_id = %deal.id, "deal deactivated");
  Ok(HttpResponse::Ok().json(deal))
}
