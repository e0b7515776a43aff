//! Synchronisation of the local document with the sync server.
//!
//! - [`SyncClient`]: push, pull, full sync and account operations over HTTP
//! - [`try_auto_push`]: opportunistic push after write commands
//! - [`watch`]: periodic push loop with pull-on-reconnect

pub mod auto_sync;
pub mod client;
pub mod error;

pub use auto_sync::{try_auto_push, watch, WatchStats};
pub use client::{LoginOutcome, Pulled, SyncClient, SyncReport, SyncStatus};
pub use error::SyncError;
