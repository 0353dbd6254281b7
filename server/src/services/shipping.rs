// server/src/services/shipping.rs

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

use crossdock::ShippingRates;

use crate::config::AppConfig;

/// Flat per-method rate table from configuration. A real rate card quotes
/// by weight and destination; the engine only needs the final number.
pub struct RateTable {
  rates: HashMap<String, Decimal>,
  default_rate: Decimal,
}

impl RateTable {
  pub fn from_config(config: &AppConfig) -> Self {
    RateTable {
      rates: config.shipping_rates.clone(),
      default_rate: config.shipping_default,
    }
  }
}

#[async_trait]
impl ShippingRates for RateTable {
  async fn quote(&self, method: &str, line_count: u32) -> anyhow::Result<Decimal> {
    let rate = self.rates.get(method).copied().unwrap_or(self.default_rate);
    debug!(method, line_count, %rate, "shipping quoted");
    Ok(rate)
  }
}
