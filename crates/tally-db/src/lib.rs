//! # tally-db: Database Layer and Tax Service for Tally POS
//!
//! SQLite storage for phones and receipts, plus the [`TaxService`] that
//! turns stored phones into tax calculations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Data Flow                              │
//! │                                                                         │
//! │  Caller (CLI, HTTP handler, desktop command)                            │
//! │       │  CalculateCartTaxRequest                                        │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tally-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐    │   │
//! │  │   │  TaxService   │    │  Repositories │    │  Migrations  │    │   │
//! │  │   │ (service.rs)  │───►│ ProductRepo   │    │  (embedded)  │    │   │
//! │  │   │               │    │ ReceiptRepo   │    │ 001_init.sql │    │   │
//! │  │   └───────┬───────┘    └───────┬───────┘    └──────────────┘    │   │
//! │  │           │ tally-core         │ SqlitePool (pool.rs)           │   │
//! │  │           ▼ tax arithmetic     ▼                                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/pos/tally.db (or [database] path in tally.toml)│   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and configuration error types
//! - [`repository`] - Product and receipt repositories
//! - [`source`] - The [`ProductSource`] seam the tax service reads through
//! - [`service`] - Tax operations keyed by phone id
//! - [`config`] - Store configuration (`tally.toml` + `TALLY_*` env)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_db::{Database, StoreConfig};
//!
//! let config = StoreConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//!
//! let response = db.tax_service().calculate_cart_tax(&request).await?;
//! let receipt = db.receipts().create(&cart, discount).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;
pub mod source;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::StoreConfig;
pub use error::{ConfigError, ConfigResult, DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use service::TaxService;
pub use source::{InMemoryProducts, ProductSource};

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::receipt::{Receipt, ReceiptRepository, StoredReceipt};

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// Honours `RUST_LOG`; otherwise logs `info` with debug output for this
/// workspace and quiet sqlx.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tally=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
