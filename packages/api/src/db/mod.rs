//! # PostgreSQL access
//!
//! Server-only. [`get_pool`] returns a lazy process-wide pool opened from
//! `DATABASE_URL` on first use, sized by `DATABASE_MAX_CONNECTIONS` (default 5).
//! [`documents`] is the owner-scoped document table that stands in for the hosted
//! document database.

#[cfg(feature = "server")]
pub mod documents;
#[cfg(feature = "server")]
mod pool;

#[cfg(feature = "server")]
pub use pool::get_pool;
