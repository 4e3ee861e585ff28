//! Object types stored in the repository database.
//!
//! All durable history lives in two immutable object kinds, identified by
//! SHA-1 hashes:
//!
//! - **Blob**: the content of one file at one point in time
//! - **Commit**: a full path→blob snapshot plus parent linkage
//!
//! Both serialize to the framing `<kind> <size>\0<body>` before being
//! compressed on disk.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of an abbreviated object id accepted by lookups
pub const SHORT_ID_LENGTH: usize = 8;
