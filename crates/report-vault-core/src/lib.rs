//! # Report Vault Core
//!
//! Shared, runtime-free logic for Report Vault: report models, the keyed
//! persistence abstraction, the per-user report store with its one-time
//! legacy migration, and the render dispatcher that turns loosely-typed
//! service payloads into structured views.
//!
//! This crate contains no tokio runtime, sqlx, or filesystem I/O. Durable
//! backends live in the `report-vault` crate and plug in through
//! [`store::KeyValueStore`].

pub mod listing;
pub mod markup;
pub mod migration;
pub mod models;
pub mod render;
pub mod reports;
pub mod store;
