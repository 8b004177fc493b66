use serde::{Deserialize, Serialize};

use super::errors::LedgerError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: i32,
    pub msg: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: 0,
            msg: "ok".to_string(),
            data,
        }
    }
}

impl ApiResponse<Option<()>> {
    /// Error envelope: code plus the human-readable detail, no payload.
    pub fn from_error(err: &LedgerError) -> Self {
        Self {
            status: -1,
            msg: format!("{}: {}", err.error_code(), err),
            data: None,
        }
    }
}
