// Request checks shared by the entity handlers. Each runs before any write.
use serde::Deserialize;

use crate::database::repository::{Document, Repository};
use crate::error::{ApiError, FieldErrors};

/// Query string accepted by the list endpoints.
///
/// Read as raw pairs so `sort` may repeat, e.g. `sort=name,desc&sort=id`.
/// Other keys are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(from = "Vec<(String, String)>")]
pub struct ListQuery {
    pub sort: Vec<String>,
}

impl From<Vec<(String, String)>> for ListQuery {
    fn from(pairs: Vec<(String, String)>) -> Self {
        let sort = pairs
            .into_iter()
            .filter(|(key, _)| key == "sort")
            .map(|(_, value)| value)
            .collect();
        Self { sort }
    }
}

/// A body sent to create must not carry an id.
pub fn ensure_new(body_id: Option<&str>, entity: &'static str) -> Result<(), ApiError> {
    match body_id {
        Some(_) => Err(ApiError::IdAlreadyExists { entity }),
        None => Ok(()),
    }
}

/// A body sent to `/{id}` must carry that same id.
pub fn ensure_matching_id(path_id: &str, body_id: Option<&str>, entity: &'static str) -> Result<(), ApiError> {
    match body_id {
        None => Err(ApiError::IdNull { entity }),
        Some(id) if id != path_id => Err(ApiError::IdMismatch { entity }),
        Some(_) => Ok(()),
    }
}

pub async fn ensure_exists<T: Document>(
    repository: &dyn Repository<T>,
    id: &str,
    entity: &'static str,
) -> Result<(), ApiError> {
    if repository.exists_by_id(id).await? {
        Ok(())
    } else {
        Err(ApiError::IdNotFound { entity })
    }
}

/// Take a required string, recording a field error when it is missing or empty.
pub fn required(field_errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    match value {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            field_errors.insert(field.to_string(), "must not be blank".to_string());
            None
        }
    }
}

/// A supplied patch value may not be empty; absent is fine.
pub fn not_empty_if_present(field_errors: &mut FieldErrors, field: &str, value: Option<&str>) {
    if value == Some("") {
        field_errors.insert(field.to_string(), "must not be blank".to_string());
    }
}
