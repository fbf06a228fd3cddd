//! TigerStyle Constants
//!
//! All limits use big-endian naming: CATEGORY_SPECIFICS_UNIT_LIMIT.
//! Every constant includes units in the name where applicable.

// =============================================================================
// Thing Limits
// =============================================================================

/// Maximum length of a thing name
pub const THING_NAME_BYTES_MAX: usize = 256;

/// Maximum size of a thing value
pub const THING_VALUE_BYTES_MAX: usize = 64 * 1024; // 64KB

// =============================================================================
// Listing / Pagination
// =============================================================================

/// Default page number when the query parameter is absent or invalid
pub const LIST_PAGE_DEFAULT: usize = 1;

/// Default page size when the query parameter is absent or invalid
pub const LIST_LIMIT_DEFAULT: usize = 10;

/// Maximum page size a client may request
pub const LIST_LIMIT_COUNT_MAX: usize = 100;

// =============================================================================
// Server / Backends
// =============================================================================

/// Default HTTP bind address
pub const HTTP_BIND_ADDRESS_DEFAULT: &str = "127.0.0.1:8080";

/// Per-request timeout enforced by the HTTP layer
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Maximum connections in the Postgres pool
pub const PG_POOL_CONNECTIONS_MAX: u32 = 10;

/// Filename of the embedded document store inside the data directory
pub const DOCUMENT_STORE_FILENAME: &str = "things.redb";
