//! Storage abstractions for service layer
//!
//! The whole datastore is a single JSON document on disk; see
//! [`json_document_store::DocumentStore`].

pub mod document;
pub mod json_document_store;

pub use document::{Collection, Document, Fields, NewUser, Record, User, UserEntry};
pub use json_document_store::{CorruptPolicy, DocumentStore};
