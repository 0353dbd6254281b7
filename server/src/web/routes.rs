// server/src/web/routes.rs

use actix_web::web;

use crate::state::AppState;
use crate::web::handlers::{
  cancellation_handlers, coupon_handlers, deal_handlers, order_handlers, product_handlers,
};

async fn health_check_handler(state: web::Data<AppState>) -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({
    "status": "ok",
    "currency": state.config.currency,
  }))
}

// Called from `main.rs` (and the HTTP tests) to configure the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      // Health Check Route
      .route("/health", web::get().to(health_check_handler))
      // Order Routes
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::create_order))
          .route("", web::get().to(order_handlers::list_orders))
          // Registered before /{order_id} so "number" never parses as an id.
          .route(
            "/number/{order_number}",
            web::get().to(order_handlers::get_order_by_number),
          )
          .route("/{order_id}", web::get().to(order_handlers::get_order))
          .route("/{order_id}", web::delete().to(order_handlers::delete_order))
          .route("/{order_id}/status", web::patch().to(order_handlers::update_status))
          .route("/{order_id}/history", web::get().to(order_handlers::order_history))
          .route(
            "/{order_id}/items/{item_id}/sourcing",
            web::patch().to(order_handlers::patch_item_sourcing),
          )
          .route(
            "/{order_id}/cancellation",
            web::post().to(cancellation_handlers::request_cancellation),
          )
          .route(
            "/{order_id}/cancellation/approve",
            web::post().to(cancellation_handlers::approve_cancellation),
          )
          .route(
            "/{order_id}/cancellation/reject",
            web::post().to(cancellation_handlers::reject_cancellation),
          )
          .route("/{order_id}/cancel", web::post().to(cancellation_handlers::cancel_order)),
      )
      // Product Routes
      .service(
        web::scope("/products")
          .route("", web::post().to(product_handlers::create_product))
          .route("", web::get().to(product_handlers::list_products))
          .route("/{product_id}", web::get().to(product_handlers::get_product))
          .route(
            "/{product_id}/stock-adjustments",
            web::post().to(product_handlers::adjust_stock),
          )
          .route(
            "/{product_id}/inventory-history",
            web::get().to(product_handlers::inventory_history),
          ),
      )
      // Coupon Routes
      .service(
        web::scope("/coupons")
          .route("", web::post().to(coupon_handlers::create_coupon))
          .route("", web::get().to(coupon_handlers::list_coupons))
          .route("/code/{code}", web::get().to(coupon_handlers::get_coupon_by_code))
          .route("/{coupon_id}", web::get().to(coupon_handlers::get_coupon))
          .route("/{coupon_id}", web::patch().to(coupon_handlers::update_coupon))
          .route("/{coupon_id}", web::delete().to(coupon_handlers::deactivate_coupon)),
      )
      // Deal Routes
      .service(
        web::scope("/deals")
          .route("", web::post().to(deal_handlers::create_deal))
          .route("", web::get().to(deal_handlers::list_deals))
          .route("/{deal_id}", web::get().to(deal_handlers::get_deal))
          .route("/{deal_id}", web::patch().to(deal_handlers::update_deal))
          .route("/{deal_id}", web::delete().to(deal_handlers::deactivate_deal)),
      ),
  );
}
