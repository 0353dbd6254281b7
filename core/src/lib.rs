// core/src/lib.rs

//! Crossdock: the order-management engine behind a cross-border retail store.
//!
//! The crate owns the parts of the business that must stay consistent under
//! concurrent writes:
//!  - A 23-status order state machine (cross-border fulfillment chain plus a
//!    legacy chain, cancellation and refund branches) with a full audit log.
//!  - Discount resolution: automatic deals with priority stacking rules and
//!    customer-entered coupons with usage tracking.
//!  - A transactional inventory ledger that is the only legal write path for
//!    stock, so counts always replay from history.
//!  - The checkout assembler tying it together, and a cancellation workflow
//!    that restores stock exactly once.
//!
//! Everything the engine does not own (identity, shipping rates, outbound
//! notifications) sits behind async collaborator traits in
//! [`collaborators`]; implementations live with the application.

// Modules by layer: data model, storage, then the services over them.
pub mod domain;
pub mod error;
pub mod store;

pub mod cancellation;
pub mod catalog;
pub mod checkout;
pub mod collaborators;
pub mod discount;
pub mod ledger;
pub mod machine;
pub mod queries;
pub mod usage;

// --- Re-exports for the Public API ---

pub use crate::domain::{
  Actor, ActorKind, Coupon, CouponUsage, Deal, DealKind, DealUsage, DiscountKind, DiscountSpec,
  InventoryHistory, Order, OrderItem, OrderStatus, OrderStatusHistory, Product, StockReason,
  StockRef,
};

pub use crate::error::{CoreError, CoreResult, DiscountError};

pub use crate::store::Store;

pub use crate::cancellation::CancellationWorkflow;
pub use crate::catalog::Catalog;
pub use crate::checkout::{
  CheckoutItem, CheckoutOutcome, CheckoutRequest, OrderAssembler, StoreSettings,
};
pub use crate::collaborators::{
  CustomerDirectory, CustomerProfile, NotificationKind, NotificationSink, OrderNotification,
  ShippingRates,
};
pub use crate::ledger::InventoryLedger;
pub use crate::machine::{transition_allowed, OrderStateMachine};
pub use crate::queries::{OrderQueries, OrderSummary};
pub use crate::usage::{EligibilitySnapshot, UsageTracker};
