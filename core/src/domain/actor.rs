// core/src/domain/actor.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Who performed a mutation. History rows persist the whole variant so the
/// audit trail never needs a join to answer "who did this".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Actor {
  Customer(Uuid),
  Admin(Uuid),
}

impl Actor {
  pub fn kind(self) -> ActorKind {
    match self {
      Actor::Customer(_) => ActorKind::Customer,
      Actor::Admin(_) => ActorKind::Admin,
    }
  }

  pub fn id(self) -> Uuid {
    match self {
      Actor::Customer(id) | Actor::Admin(id) => id,
    }
  }

  pub fn is_admin(self) -> bool {
    matches!(self, Actor::Admin(_))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
  Customer,
  Admin,
}

impl ActorKind {
  pub fn as_str(self) -> &'static str {
    match self {
      ActorKind::Customer => "customer",
      ActorKind::Admin => "admin",
    }
  }
}

impl fmt::Display for ActorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
