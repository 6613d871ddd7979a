//! HTTP request handlers, one module per resource

pub mod applications;
pub mod health;
pub mod icons;
pub mod sidecars;
