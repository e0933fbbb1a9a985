//! churndesk-core: customer snapshot analytics for the churn desk.
//!
//! Two pure units sit on top of a read-only customer snapshot:
//!   - `risk`   buckets customers by churn score and aggregates revenue
//!   - `export` filters by churn-score range and renders CSV
//!
//! `view` holds the dashboard's UI state explicitly and routes commands
//! to those units; `store` supplies snapshots from SQLite or JSON.

pub mod config;
pub mod customer;
pub mod error;
pub mod export;
pub mod name_generator;
pub mod risk;
pub mod rng;
pub mod seed;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod view;

pub use customer::{ChurnScore, CustomerRecord};
pub use error::{DeskError, DeskResult};
pub use snapshot::CustomerSnapshot;
