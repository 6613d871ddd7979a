//! Centralized error handling for HomeDash
//!
//! Two families of errors live here:
//!
//! - [`AppError`]: everything that can surface through the HTTP layer. Each
//!   variant maps onto a single status code in `web::responses`.
//! - [`IconError`]: failures of the icon catalog ingestion stages. These never
//!   reach a client directly; the catalog logs them and keeps serving the
//!   previous index.

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for icon ingestion Results
pub type IconResult<T> = Result<T, IconError>;
