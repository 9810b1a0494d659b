//! digger engine
//!
//! Configuration, logging and the suppliers that answer digger selectors:
//!
//! ```rust,ignore
//! use digger_engine::{Config, Engine, Supplier};
//! use digger_tree::Draft;
//!
//! let engine = Engine::new(Config::default())?;
//! let mut supplier = engine.memory_supplier();
//! supplier.append(None, vec![Draft::new("city").with_class("south")])?;
//! let found = engine.select_str(&supplier, "city.south", &[])?;
//! ```

mod config;
mod engine;
mod logging;
pub mod supplier;

pub use config::Config;
pub use engine::Engine;
pub use logging::init_logging;
pub use supplier::{MemorySupplier, NestedSetSupplier, Record, SelectRequest, Supplier};

// Re-export sub-crates for advanced usage
pub use digger_nestedset as nestedset;
pub use digger_selector as selector;
pub use digger_tree as tree;

use digger_nestedset::EncodeError;
use digger_selector::SyntaxError;
use digger_tree::StoreError;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine error
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("selector syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("position encoding failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no model with diggerid {0}")]
    UnknownTarget(String),
}
