// server/src/services/mod.rs

// In-process implementations of the engine's collaborator seams.
pub mod customers;
pub mod notify;
pub mod shipping;

pub use customers::OpenCustomerDirectory;
pub use notify::LogNotificationSink;
pub use shipping::RateTable;
