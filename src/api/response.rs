//! The JSON response envelope and the error-to-status mapping shared by
//! every resource.

use crate::errors::Error;
use serde::Serialize;

/// Uniform envelope: `success` plus whichever of the optional fields apply.
/// Listings carry `count`; mutations may carry a human-readable `message`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// An envelope paired with the HTTP status it would be served with.
#[derive(Debug, Clone, Serialize)]
pub struct Reply<T: Serialize> {
    pub status: u16,
    #[serde(flatten)]
    pub body: ApiResponse<T>,
}

/// HTTP status for an error: validation 400, missing 404, duplicates 409,
/// everything else 500.
#[must_use]
pub fn status_code(err: &Error) -> u16 {
    match err {
        Error::Validation(_) => 400,
        Error::NotFound(_) => 404,
        Error::Conflict(_) => 409,
        _ => 500,
    }
}

impl<T: Serialize> Reply<T> {
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            status: 200,
            body: ApiResponse {
                success: true,
                data: Some(data),
                count: None,
                error: None,
                message: None,
            },
        }
    }

    #[must_use]
    pub fn created(data: T) -> Self {
        Self {
            status: 201,
            ..Self::ok(data)
        }
    }

    #[must_use]
    pub fn message(data: T, message: &str) -> Self {
        let mut reply = Self::ok(data);
        reply.body.message = Some(message.to_string());
        reply
    }

    #[must_use]
    pub fn error(err: &Error) -> Self {
        Self {
            status: status_code(err),
            body: ApiResponse {
                success: false,
                data: None,
                count: None,
                error: Some(err.to_string()),
                message: None,
            },
        }
    }
}

impl<T: Serialize> Reply<Vec<T>> {
    /// 200 with the item count alongside the data, as listings report it.
    #[must_use]
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        let mut reply = Self::ok(items);
        reply.body.count = Some(count);
        reply
    }
}

/// Folds a handler result into an envelope, turning errors into their
/// status-mapped failure shape.
#[must_use]
pub fn envelope<T: Serialize>(result: crate::errors::Result<Reply<T>>) -> Reply<T> {
    result.unwrap_or_else(|err| Reply::error(&err))
}
