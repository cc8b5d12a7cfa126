//! Request handlers for the relay endpoints.
//!
//! Each submodule holds the async handler functions for one resource;
//! route wiring lives in [`crate::routes`]. Handlers map domain errors
//! via [`AppError`](crate::error::AppError).

pub mod outputs;
pub mod process;
