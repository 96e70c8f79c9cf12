//! Shared utilities for CrowdHub crates
//!
//! Houses the pieces the rest of the workspace leans on: dependency
//! injection registration, error conversion macros, validation traits, and
//! the unified logging layer. This crate depends on no other crowdhub
//! crate, so any crate in the workspace can pull it in safely.

pub mod di;
pub mod error;
pub mod logging;
pub mod validation;

pub use error::ErrorContext;
pub use validation::{Validatable, ValidationError, Validator};
