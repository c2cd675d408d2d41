//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init, status) and shared utilities (open_db)
//! - `process` - Pipeline commands (process, classify)
//! - `entities` - Wallet, category, and transaction commands
//! - `settings` - App-settings commands (list, get, set)

pub mod core;
pub mod entities;
pub mod process;
pub mod settings;

// Re-export command functions for main.rs
pub use core::*;
pub use entities::*;
pub use process::*;
pub use settings::*;
