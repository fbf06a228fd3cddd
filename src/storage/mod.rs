//! Storage - Backend Trait and Implementations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    StorageBackend Trait                      │
//! └─────────────────────────────────────────────────────────────┘
//!       ↑                    ↑                      ↑
//! ┌─────┴───────┐   ┌────────┴────────┐   ┌────────┴────────┐
//! │MemoryBackend│   │ DocumentBackend │   │ PostgresBackend │
//! │ (dev/test)  │   │     (redb)      │   │  (production)   │
//! └─────────────┘   └─────────────────┘   └─────────────────┘
//! ```
//!
//! The contract holds identically across implementations:
//! - absence is signaled with [`StorageError::NotFound`], never a silent no-op
//! - any other backend failure is wrapped and surfaced, never translated
//!   into not-found
//! - listing returns a page in stable `(created, uuid)` order plus the total
//!   count; the count and the page are not taken in one atomic snapshot
//! - delete is unconditional and idempotent

mod backend;
mod document;
mod error;
mod memory;
mod postgres;
mod thing;

pub use backend::StorageBackend;
pub use document::DocumentBackend;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryBackend;
pub use postgres::PostgresBackend;
pub use thing::Thing;
