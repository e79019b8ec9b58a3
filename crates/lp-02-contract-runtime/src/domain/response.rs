use serde::{Deserialize, Serialize};

/// Status of a successful contract execution.
pub const STATUS_OK: i32 = 200;

/// Status of a failed contract execution.
pub const STATUS_ERROR: i32 = 500;

/// Result of executing one contract function, as seen by its caller.
///
/// Must be checked before `payload` is used: only [`STATUS_OK`] carries a
/// return value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Numeric status, 200 for success.
    pub status: i32,
    /// Return value of the function.
    pub payload: Vec<u8>,
    /// Error message for non-success statuses.
    pub message: String,
}

impl Response {
    /// A 200 response carrying `payload`.
    pub fn success(payload: Vec<u8>) -> Self {
        Self {
            status: STATUS_OK,
            payload,
            message: String::new(),
        }
    }

    /// A 500 response carrying `message`.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR,
            payload: Vec::new(),
            message: message.into(),
        }
    }

    /// Returns true for status 200.
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}
