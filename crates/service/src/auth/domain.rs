use serde::{Deserialize, Serialize};

pub use crate::session::SessionUser;

/// Login input. Missing fields deserialize as empty and fail validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Signup input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
}

/// Shape check equivalent to `^\S+@\S+\.\S+$`: no whitespace, something before
/// an `@`, and a `.` with at least one character on each side after it.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let bytes = email.as_bytes();
    let Some(at) = bytes.iter().skip(1).position(|b| *b == b'@').map(|i| i + 1) else {
        return false;
    };
    let (from, to) = (at + 2, bytes.len().saturating_sub(1));
    from < to && bytes[from..to].contains(&b'.')
}
