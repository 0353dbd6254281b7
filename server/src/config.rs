// server/src/config.rs

use std::collections::HashMap;
use std::env;

use dotenvy::dotenv;
use rust_decimal::Decimal;

use crate::errors::{ApiError, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,

  /// Tax rate in percent applied at checkout.
  pub tax_rate: Decimal,
  /// Whether catalog prices already contain tax.
  pub tax_inclusive: bool,
  /// Display currency; the engine itself is currency-agnostic.
  pub currency: String,

  /// Flat shipping cost per method name.
  pub shipping_rates: HashMap<String, Decimal>,
  /// Rate for methods not in the table.
  pub shipping_default: Decimal,

  /// Seed a few products, a coupon and a deal on startup.
  pub seed_demo_data: bool,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name)
        .map_err(|e| ApiError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };
    let parse_decimal = |var_name: &str, raw: String| {
      raw
        .parse::<Decimal>()
        .map_err(|e| ApiError::Config(format!("Invalid {}: {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| ApiError::Config(format!("Invalid SERVER_PORT: {}", e)))?;

    let tax_rate = parse_decimal("TAX_RATE", get_env("TAX_RATE").unwrap_or_else(|_| "10".to_string()))?;
    let tax_inclusive = get_env("TAX_INCLUSIVE")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| ApiError::Config(format!("Invalid TAX_INCLUSIVE value: {}", e)))?;
    let currency = get_env("CURRENCY").unwrap_or_else(|_| "BDT".to_string());

    let shipping_default = parse_decimal(
      "SHIPPING_RATE_DEFAULT",
      get_env("SHIPPING_RATE_DEFAULT").unwrap_or_else(|_| "60".to_string()),
    )?;
    let mut shipping_rates = HashMap::new();
    shipping_rates.insert(
      "standard".to_string(),
      parse_decimal(
        "SHIPPING_RATE_STANDARD",
        get_env("SHIPPING_RATE_STANDARD").unwrap_or_else(|_| "60".to_string()),
      )?,
    );
    shipping_rates.insert(
      "express".to_string(),
      parse_decimal(
        "SHIPPING_RATE_EXPRESS",
        get_env("SHIPPING_RATE_EXPRESS").unwrap_or_else(|_| "120".to_string()),
      )?,
    );

    let seed_demo_data = get_env("SEED_DEMO_DATA")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| ApiError::Config(format!("Invalid SEED_DEMO_DATA value: {}", e)))?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      tax_rate,
      tax_inclusive,
      currency,
      shipping_rates,
      shipping_default,
      seed_demo_data,
    })
  }
}
