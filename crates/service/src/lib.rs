//! Service layer for the record service.
//! - `storage`: the single JSON document on disk.
//! - `records`: CRUD, pagination and dashboard rules for the three collections.
//! - `auth` / `session`: signup, login and server-side sessions.

pub mod errors;
pub mod auth;
pub mod pagination;
pub mod records;
pub mod session;
pub mod storage;
#[cfg(test)]
pub mod test_support;
