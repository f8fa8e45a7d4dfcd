//! Zhash Wallet Core - view state for the private transfer dashboard
//!
//! This library holds the state and orchestration behind the Zhash wallet
//! dashboard: wallet connection, tab routing, balance refresh, the private
//! transfer flow and the privacy assistant. Chain, encryption and advice
//! behavior is simulated with fixed delays and sample data.

pub mod error;
pub mod config;
pub mod scheduler;
pub mod format;
mod guard;
pub mod catalog;
pub mod balance;
pub mod wallet;
pub mod transfer;
pub mod advisory;
pub mod dashboard;
pub mod history;
pub mod assistant;
pub mod app;

// Re-export commonly used types for convenience
pub use error::{Error, Result};
pub use app::{Action, App, AppState, Tab, Theme, View};
pub use config::AppConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
