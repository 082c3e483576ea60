//! libris application library
//!
//! Authors and books record store, exposed over HTTP through the libris
//! module framework.

// The OpenAPI fragments are large `json!` literals.
#![recursion_limit = "256"]

pub mod app;
pub mod modules;
pub mod store;

pub use store::{RecordStore, StoreError, StoreResult};
