// server/src/web/handlers/cancellation_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::state::AppState;
use crate::web::extractors::Identity;

// --- Request DTOs ---

#[derive(Deserialize, Debug, Default)]
pub struct CancellationPayload {
  pub reason: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct DecisionPayload {
  pub note: Option<String>,
}

// --- Handler Implementations ---

#[instrument(name = "handler::request_cancellation", skip(state, payload, identity))]
pub async fn request_cancellation(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<CancellationPayload>,
  identity: Identity,
) -> Result<HttpResponse, ApiError> {
  let order = state
    .cancellation
    .request(path.into_inner(), identity.actor(), payload.into_inner().reason)
    .await?;
  info!(order_number = %order.order_number, "cancellation requested");
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::approve_cancellation", skip(state, payload, identity))]
pub async fn approve_cancellation(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<DecisionPayload>,
  identity: Identity,
) -> Result<HttpResponse, ApiError> {
  let admin = identity.require_admin()?;
  let order = state
    .cancellation
    .approve(path.into_inner(), admin.id(), payload.into_inner().note)
    .await?;
  info!(order_number = %order.order_number, "cancellation approved");
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::reject_cancellation", skip(state, payload, identity))]
pub async fn reject_cancellation(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<DecisionPayload>,
  identity: Identity,
) -> Result<HttpResponse, ApiError> {
  let admin = identity.require_admin()?;
  let order = state
    .cancellation
    .reject(path.into_inner(), admin.id(), payload.into_inner().note)
    .await?;
  info!(order_number = %order.order_number, "cancellation rejected");
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::cancel_order", skip(state, payload, identity))]
pub async fn cancel_order(
  state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<CancellationPayload>,
  identity: Identity,
) -> Result<HttpResponse, ApiError> {
  let order = state
    .cancellation
    .cancel(path.into_inner(), identity.actor(), payload.into_inner().reason)
    .await?;
  info!(order_number = %order.order_number, "order cancelled");
  Ok(HttpResponse::Ok().json(order))
}
