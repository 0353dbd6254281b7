// server/src/state.rs

use std::sync::Arc;

use crossdock::{
  CancellationWorkflow, Catalog, InventoryLedger, NotificationSink, OrderAssembler, OrderQueries,
  OrderStateMachine, Store, StoreSettings,
};

use crate::config::AppConfig;
use crate::services::{LogNotificationSink, OpenCustomerDirectory, RateTable};

/// Everything the handlers need; cheap to clone per worker because the
/// services share one `Arc<Store>` underneath.
#[derive(Clone)]
pub struct AppState {
  pub config: Arc<AppConfig>,
  pub store: Arc<Store>,
  pub catalog: Catalog,
  pub assembler: OrderAssembler,
  pub machine: OrderStateMachine,
  pub cancellation: CancellationWorkflow,
  pub queries: OrderQueries,
  pub ledger: InventoryLedger,
}

impl AppState {
  pub fn build(config: Arc<AppConfig>) -> Self {
    let store = Arc::new(Store::new());
    let sink: Arc<dyn NotificationSink> = Arc::new(LogNotificationSink);
    let assembler = OrderAssembler::new(
      store.clone(),
      Arc::new(OpenCustomerDirectory),
      Arc::new(RateTable::from_config(&config)),
      sink.clone(),
      StoreSettings {
        tax_rate: config.tax_rate,
        tax_inclusive: config.tax_inclusive,
      },
    );
    AppState {
      catalog: Catalog::new(store.clone()),
      machine: OrderStateMachine::new(store.clone()),
      cancellation: CancellationWorkflow::new(store.clone(), sink),
      queries: OrderQueries::new(store.clone()),
      ledger: InventoryLedger::new(store.clone()),
      assembler,
      store,
      config,
    }
  }
}
