// core/src/domain/mod.rs

//! Data model for the order pipeline: orders and their line items, the status
//! vocabulary, coupons and deals with their usage rows, products as the live
//! stock projection, and the inventory audit trail.

pub mod actor;
pub mod coupon;
pub mod deal;
pub mod inventory;
pub mod order;
pub mod product;
pub mod status;

// Re-export the model types for convenient access
pub use actor::{Actor, ActorKind};
pub use coupon::{normalize_code, Coupon, CouponUsage, DiscountKind, DiscountSpec};
pub use deal::{Deal, DealKind, DealUsage};
pub use inventory::{InventoryHistory, StockReason, StockRef};
pub use order::{Order, OrderItem, OrderStatusHistory, OrderTotals};
pub use product::Product;
pub use status::{OrderStatus, UnknownStatus};
