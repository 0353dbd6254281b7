// core/src/error.rs
use anyhow::Error as AnyhowError;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{ActorKind, OrderStatus};

/// Reasons a coupon or deal was not applied. These are business
/// outcomes, not faults: checkout surfaces them to the caller and, when
/// the caller opted in, proceeds without the discount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscountError {
  #[error("Coupon not found: {code}")]
  CouponNotFound { code: String },

  #[error("Coupon '{code}' is expired or inactive")]
  CouponExpired { code: String },

  #[error("Coupon '{code}' has reached its usage limit")]
  CouponUsageExceeded { code: String },

  #[error("Coupon '{code}' requires a minimum purchase of {minimum}")]
  MinimumPurchaseNotMet { code: String, minimum: Decimal },

  #[error("Coupon '{code}' does not apply to this order")]
  CouponNotApplicable { code: String },

  #[error("Deal '{name}' is expired or inactive")]
  DealNotValid { name: String },

  #[error("Deal '{name}' has reached its usage limit")]
  DealUsageExceeded { name: String },
}

impl DiscountError {
  /// The coupon code or deal name involved, for logging.
  pub fn subject(&self) -> &str {
    match self {
      DiscountError::CouponNotFound { code }
      | DiscountError::CouponExpired { code }
      | DiscountError::CouponUsageExceeded { code }
      | DiscountError::MinimumPurchaseNotMet { code, .. }
      | DiscountError::CouponNotApplicable { code } => code,
      DiscountError::DealNotValid { name } | DiscountError::DealUsageExceeded { name } => name,
    }
  }
}

#[derive(Debug, Error)]
pub enum CoreError {
  #[error("Validation failed: {0}")]
  Validation(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Transition from '{from}' to '{to}' is not allowed for {role}")]
  InvalidTransition {
    from: OrderStatus,
    to: OrderStatus,
    role: ActorKind,
  },

  #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
  InsufficientStock {
    product_id: Uuid,
    requested: i64,
    available: i64,
  },

  #[error(transparent)]
  Discount(#[from] DiscountError),

  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: String },

  #[error("Collaborator '{name}' failed. Source: {source}")]
  Collaborator {
    name: &'static str,
    #[source]
    source: AnyhowError,
  },

  #[error("Internal error: {0}")]
  Internal(String),
}

impl CoreError {
  pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
    CoreError::NotFound {
      entity,
      id: id.to_string(),
    }
  }
}

pub type CoreResult<T, E = CoreError> = std::result::Result<T, E>;
