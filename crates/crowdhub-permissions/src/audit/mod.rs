//! Access audit logging
//!
//! Records resolved access checks for the admin audit screens. Recording is
//! a collaborator of the resolver's callers; the resolver itself stays
//! side-effect free.

pub mod logger;
pub mod models;
pub mod query;

pub use logger::AccessLogger;
pub use models::{AccessLogEntry, AccessOutcome, DecisionSource};
pub use query::{AccessQuery, Pagination, QueryFilter};
