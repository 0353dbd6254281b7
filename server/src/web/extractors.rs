// server/src/web/extractors.rs

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;
use uuid::Uuid;

use crossdock::Actor;

use crate::errors::ApiError;

/// Caller identity from the `X-Actor-Role` / `X-Actor-Id` headers. The
/// gateway in front of this service authenticates the caller and stamps
/// the headers; this extractor only parses them.
#[derive(Debug, Clone, Copy)]
pub struct Identity(pub Actor);

impl Identity {
  pub fn actor(self) -> Actor {
    self.0
  }

  /// Admin-only surfaces call this first; customers get a 403.
  pub fn require_admin(self) -> Result<Actor, ApiError> {
    if self.0.is_admin() {
      Ok(self.0)
    } else {
      Err(ApiError::Forbidden(
        "this operation requires an admin actor".to_string(),
      ))
    }
  }
}

impl FromRequest for Identity {
  type Error = ApiError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let header = |name: &str| {
      req
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
    };
    let role = header("X-Actor-Role");
    let id = header("X-Actor-Id").and_then(|raw| Uuid::parse_str(&raw).ok());
    let actor = match (role.as_deref(), id) {
      (Some("admin"), Some(id)) => Some(Actor::Admin(id)),
      (Some("customer"), Some(id)) => Some(Actor::Customer(id)),
      _ => None,
    };
    match actor {
      Some(actor) => ready(Ok(Identity(actor))),
      None => {
        warn!("Identity extractor: missing or invalid X-Actor-Role/X-Actor-Id headers.");
        ready(Err(ApiError::Auth(
          "Missing or invalid X-Actor-Role/X-Actor-Id headers.".to_string(),
        )))
      }
    }
  }
}
