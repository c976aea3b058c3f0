//! Purchase Converter
//!
//! Converts stored USD purchases into a target currency. Purchases are
//! loaded in chunks, the historical rates for the whole batch are fetched in
//! one paginated call, and each purchase is matched to its rate on a bounded
//! pool of tasks.

pub mod batch_loader;
pub mod config;
pub mod metrics;
pub mod orchestrator;
pub mod service;
pub mod store;

pub use batch_loader::BatchLoader;
pub use config::ConverterConfig;
pub use orchestrator::ConversionOrchestrator;
pub use service::PurchaseService;
pub use store::{InMemoryTransactionStore, TransactionStore};
