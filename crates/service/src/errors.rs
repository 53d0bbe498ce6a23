use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    pub fn not_found() -> Self { Self::NotFound("not found".into()) }

    pub fn storage<E: std::fmt::Display>(e: E) -> Self { Self::Storage(e.to_string()) }
}
