//! # lookupd Core
//!
//! Shared error types for the lookupd gateway.
//!
//! Every other crate in the workspace propagates [`LookupError`] through the
//! [`Result`] alias defined here; the API layer translates it into HTTP status
//! codes at the edge.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod error;

pub use error::{LookupError, Result};
