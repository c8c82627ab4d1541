use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl ApiError {
    /// HTTP status code the error surfaces as.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ValidationError(_) => 400,
            ApiError::Unauthorized => 401,
            ApiError::NotFound(_) => 404,
            ApiError::InternalError(_) | ApiError::DatabaseError(_) => 500,
        }
    }

    /// JSON body for the error response.
    pub fn to_body(&self) -> serde_json::Value {
        #[derive(Serialize)]
        struct Body<'a> {
            status: u16,
            message: &'a str,
        }

        let message = self.to_string();
        serde_json::to_value(Body {
            status: self.status_code(),
            message: &message,
        })
        .unwrap_or(serde_json::Value::Null)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
