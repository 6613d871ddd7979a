//! Service layer
//!
//! Services sit between the HTTP handlers and the registry / icon catalog:
//!
//! - [`Aggregator`]: builds the sorted dashboard view from registered and
//!   static items, resolving icons on the way out
//! - [`Reaper`]: background task evicting sources that stopped reporting

pub mod aggregator;
pub mod reaper;

pub use aggregator::Aggregator;
pub use reaper::{Reaper, SweepStats};
