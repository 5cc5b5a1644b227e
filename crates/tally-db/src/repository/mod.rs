//! # Repository Module
//!
//! SQLite repositories for Tally POS.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  db.products()                       db.receipts()                      │
//! │  ProductRepository                   ReceiptRepository                  │
//! │  ├── insert / get_by_id / list       ├── create (one transaction)       │
//! │  ├── get_tax_config                  ├── get_by_id / get_by_number      │
//! │  ├── update_tax_config (partial)     └── delete                         │
//! │  └── set_status                                                         │
//! │       │                                                                 │
//! │       └── also implements ProductSource for TaxService                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries are built at runtime with `sqlx::query` / `query_as` and decoded
//! through `FromRow`, so the crate builds without a live database.

pub mod product;
pub mod receipt;
