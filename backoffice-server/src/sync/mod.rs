//! Cloud replication — outbox drain
//!
//! The lifecycle only writes outbox rows; this module owns delivery.
//! Delivery is best-effort and out-of-band: a dead cloud never blocks
//! a day close.

pub mod service;
pub mod worker;

pub use service::SyncService;
pub use worker::SyncWorker;
