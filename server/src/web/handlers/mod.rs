// server/src/web/handlers/mod.rs

// Declare handler modules
pub mod cancellation_handlers;
pub mod coupon_handlers;
pub mod deal_handlers;
pub mod order_handlers;
pub mod product_handlers;
