//! Portfolio API module
//!
//! Accepts portfolio snapshots from the admin panel and reports IPS compliance
//!
//! # Features
//! - Validate and acknowledge snapshots
//! - Keep the latest snapshot (memory, or a JSON file when configured)
//! - Allocation drift and security/sector/regional limit checks
//!
//! # Usage
//! ```ignore
//! let store = PortfolioStore::from_config(&config)?;
//! let state = PortfolioApiState::new(store, config.portfolio_api_key.clone());
//! let portfolio_router = create_portfolio_router(state);
//! ```

pub mod compliance;
mod error;
mod handlers;
mod middleware;
mod router;
mod store;
pub mod types;

pub use middleware::PortfolioApiState;
pub use router::create_portfolio_router;
pub use store::PortfolioStore;
