//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Signup and login business logic lives here, independent of the HTTP layer.
//! Session bookkeeping is in [`crate::session`].

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::AuthService;
