use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use notes_core_api::ApiError;

use crate::error::StoreError;
use crate::models::entity::FieldError;

/// Outcome of a CRUD operation that did not succeed.
#[derive(Debug, Error)]
pub enum CrudError {
    /// Id or alias does not resolve to a row of this entity.
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    /// A hook rejected the operation; nothing was written.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(StoreError),
}

impl CrudError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        CrudError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CrudError::Validation(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CrudError::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, CrudError::Validation(_))
    }
}

impl From<StoreError> for CrudError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { table, key } => CrudError::NotFound { entity: table, key },
            StoreError::Conflict { message, .. } => CrudError::Validation(message),
            other => CrudError::Store(other),
        }
    }
}

impl From<ValidationErrors> for CrudError {
    fn from(errors: ValidationErrors) -> Self {
        CrudError::Validation(errors.to_string())
    }
}

impl From<FieldError> for CrudError {
    fn from(err: FieldError) -> Self {
        CrudError::Validation(err.to_string())
    }
}

impl From<CrudError> for ApiError {
    fn from(err: CrudError) -> Self {
        match err {
            CrudError::NotFound { entity, key } => ApiError::NotFound(format!("{entity} {key}")),
            CrudError::Validation(message) => ApiError::ValidationError(message),
            CrudError::Store(err) => {
                error!(error = %err, "store failure");
                ApiError::DatabaseError("internal server error".to_string())
            }
        }
    }
}

pub type CrudResult<T> = Result<T, CrudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_crud_errors() {
        let missing: CrudError = StoreError::not_found("program", 5).into();
        assert!(missing.is_not_found());
        assert_eq!(missing.to_string(), "program 5 not found");

        let conflict: CrudError = StoreError::Conflict {
            table: "alias",
            message: "alias 'acme' is already bound".to_string(),
        }
        .into();
        assert!(conflict.is_validation());
    }

    #[test]
    fn test_api_mapping() {
        let api: ApiError = CrudError::validation("name already exists").into();
        assert_eq!(api, ApiError::ValidationError("name already exists".to_string()));

        let api: ApiError = CrudError::not_found("word", "hello").into();
        assert_eq!(api.status_code(), 404);

        let api: ApiError = CrudError::Store(StoreError::Query {
            message: "relation \"program\" does not exist".to_string(),
        })
        .into();
        assert_eq!(api.status_code(), 500);
        assert!(!api.to_string().contains("relation"));
    }
}
