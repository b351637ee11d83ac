//! Shape shared by every paginated catalog table

use serde::Deserialize;
use sqlx::{postgres::PgRow, FromRow};
use utoipa::ToSchema;
use validator::Validate;

use super::loose::{int_field, LooseInt};
use crate::error::FieldErrors;

pub const ID_NOT_INTEGER_MESSAGE: &str = "The id field must be an integer.";

/// A catalog table that can be listed, fetched and deleted generically
pub trait CatalogEntity: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static {
    /// Table name
    const TABLE: &'static str;
    /// Human label used in messages ("Author", "Book", ...)
    const LABEL: &'static str;
    /// Column matched by the `keyword` filter
    const SEARCH_COLUMN: &'static str;
    /// Columns accepted as `sort_field`
    const SORTABLE: &'static [&'static str];
    /// Page size when the caller does not send `limit`
    const DEFAULT_LIMIT: i64;

    fn id(&self) -> i64;

    fn not_found() -> crate::error::AppError {
        crate::error::AppError::NotFound(format!("Invalid {}.", Self::LABEL))
    }
}

/// Catalog records made of a name and a description (authors, genres)
pub trait NamedEntity: CatalogEntity {
    /// Whether `name` must be unique across the table
    const UNIQUE_NAME: bool;
}

/// Columns sortable on every named entity
pub const NAMED_SORTABLE: &[&str] = &["id", "name", "description", "created_at", "updated_at"];

/// Named entity fields exactly as submitted
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedForm {
    pub id: Option<LooseInt>,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Create / update request for a named entity
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(from = "NamedForm")]
pub struct NamedInput {
    /// Record to update or delete; ignored on create
    pub id: Option<i64>,
    #[validate(
        required(message = "The name field is required."),
        length(max = 255, message = "The name field must not be greater than 255 characters.")
    )]
    pub name: Option<String>,
    pub description: Option<String>,
    /// Values that could not be read as the field's type
    #[serde(skip)]
    pub rejected: FieldErrors,
}

impl From<NamedForm> for NamedInput {
    fn from(form: NamedForm) -> Self {
        let mut rejected = FieldErrors::new();
        let id = int_field(form.id, "id", ID_NOT_INTEGER_MESSAGE, &mut rejected);
        Self {
            id,
            name: form.name,
            description: form.description,
            rejected,
        }
    }
}

impl NamedInput {
    /// Rule violations plus values that could not be read; an unreadable
    /// value reports its own message instead of "required"
    pub fn field_errors(&self) -> FieldErrors {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };
        errors.merge(self.rejected.clone());
        errors
    }

    /// Blank strings count as missing
    pub fn normalized(self) -> Self {
        Self {
            name: blank_to_none(self.name),
            description: blank_to_none(self.description),
            ..self
        }
    }
}

/// Validated values written to a named entity table
#[derive(Debug, Clone)]
pub struct NamedDraft {
    pub name: String,
    pub description: Option<String>,
    pub audit: super::AuditFields,
}

pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_to_none() {
        assert_eq!(blank_to_none(None), None);
        assert_eq!(blank_to_none(Some("   ".to_string())), None);
        assert_eq!(blank_to_none(Some(" Fantasy ".to_string())), Some("Fantasy".to_string()));
    }

    #[test]
    fn test_missing_name_is_reported() {
        let input = NamedInput {
            name: Some("".to_string()),
            ..Default::default()
        }
        .normalized();

        let errors: FieldErrors = input.validate().unwrap_err().into();
        assert_eq!(errors.get("name"), Some(&["The name field is required.".to_string()][..]));
    }

    #[test]
    fn test_id_sent_as_text() {
        let input: NamedInput = serde_json::from_str(r#"{"id": "12", "name": "Fantasy"}"#).unwrap();
        assert_eq!(input.id, Some(12));
        assert!(input.rejected.is_empty());

        let input: NamedInput = serde_json::from_str(r#"{"id": "twelve"}"#).unwrap();
        assert_eq!(input.id, None);
        assert_eq!(input.rejected.get("id"), Some(&[ID_NOT_INTEGER_MESSAGE.to_string()][..]));
    }

    #[test]
    fn test_name_longer_than_255_is_rejected() {
        let input = NamedInput {
            name: Some("x".repeat(256)),
            ..Default::default()
        };
        let errors: FieldErrors = input.validate().unwrap_err().into();
        assert!(errors.contains("name"));

        let input = NamedInput {
            name: Some("x".repeat(255)),
            ..Default::default()
        };
        assert!(input.validate().is_ok());
    }
}
