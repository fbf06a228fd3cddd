//! thingd - Thing CRUD service with pluggable storage
//!
//! A small HTTP service exposing CRUD operations over a single resource type
//! ("thing": a name/value pair with identity and timestamps), backed by a
//! persistence backend selected at startup.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    HTTP layer (axum)                         │
//! │  GET/POST/PUT/DELETE /thing  →  Arc<dyn StorageBackend>      │
//! └─────────────────────────────────────────────────────────────┘
//!                             ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    StorageBackend Trait                      │
//! └─────────────────────────────────────────────────────────────┘
//!       ↑                    ↑                      ↑
//! ┌─────┴───────┐   ┌────────┴────────┐   ┌────────┴────────┐
//! │MemoryBackend│   │ DocumentBackend │   │ PostgresBackend │
//! │ (dev/test)  │   │     (redb)      │   │  (sqlx/Postgres)│
//! └─────────────┘   └─────────────────┘   └─────────────────┘
//! ```
//!
//! All three backends implement identical semantics: not-found signaling via
//! [`storage::StorageError::NotFound`], stable `(created, uuid)` list order,
//! and update-then-fetch consistency.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod constants;
pub mod storage;

pub use constants::*;
