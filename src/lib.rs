//! Gains: a personal fitness tracker.
//!
//! - [`store`]: the local JSON document and session keys
//! - [`tracker`]: typed mutations and read views over the document
//! - [`sync`]: HTTP client that pushes and pulls the document
//! - [`server`]: the sync server (accounts, tokens, per-user storage)

pub mod config;
pub mod models;
pub mod protocol;
pub mod server;
pub mod store;
pub mod sync;
pub mod tracker;
