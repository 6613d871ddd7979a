//! HomeDash: a dashboard aggregator for home labs.
//!
//! Sidecars push the items they discover to the aggregator, which keeps the
//! latest report per sidecar, evicts sidecars that stop reporting, merges in
//! statically configured items and resolves each item's icon against a
//! locally cached icon catalog.

pub mod config;
pub mod errors;
pub mod icons;
pub mod models;
pub mod registry;
pub mod services;
pub mod web;
