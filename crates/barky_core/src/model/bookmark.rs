//! Bookmark domain model.
//!
//! # Responsibility
//! - Define the persisted `Bookmark` record and the unsaved `BookmarkDraft`.
//! - Enforce field presence and length limits before any write.
//!
//! # Invariants
//! - `id` is assigned by the store on insert and never changes afterwards.
//! - `title` and `url` are non-blank; lengths are bounded per column.
//! - Fields are never validated against each other (no URL format or
//!   uniqueness rules).

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned surrogate key of a bookmark row.
pub type BookmarkId = i64;

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 80;
/// Maximum url length in characters.
pub const URL_MAX_CHARS: usize = 200;
/// Maximum description length in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 200;

/// Validation failure for bookmark fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkValidationError {
    /// Required field is empty or whitespace-only.
    EmptyField(&'static str),
    /// Field exceeds its column bound.
    FieldTooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

impl Display for BookmarkValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "bookmark {field} cannot be empty"),
            Self::FieldTooLong { field, max, actual } => write!(
                f,
                "bookmark {field} is {actual} characters long; at most {max} allowed"
            ),
        }
    }
}

impl Error for BookmarkValidationError {}

/// Input shape for a bookmark that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkDraft {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl BookmarkDraft {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            description,
        }
    }

    /// Checks presence and length limits for every field.
    pub fn validate(&self) -> Result<(), BookmarkValidationError> {
        validate_fields(&self.title, &self.url, self.description.as_deref())
    }

    /// Attaches the identifier assigned by the store.
    pub fn into_bookmark(self, id: BookmarkId) -> Bookmark {
        Bookmark {
            id,
            title: self.title,
            url: self.url,
            description: self.description,
        }
    }
}

/// Canonical persisted bookmark record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Surrogate key; immutable once assigned.
    pub id: BookmarkId,
    pub title: String,
    pub url: String,
    /// `Some("")` is kept distinct from `None`.
    pub description: Option<String>,
}

impl Bookmark {
    /// Checks presence and length limits for every field.
    pub fn validate(&self) -> Result<(), BookmarkValidationError> {
        validate_fields(&self.title, &self.url, self.description.as_deref())
    }

    /// Replaces all mutable fields in place. `id` is left untouched.
    pub fn apply_edit(
        &mut self,
        title: impl Into<String>,
        url: impl Into<String>,
        description: Option<String>,
    ) {
        self.title = title.into();
        self.url = url.into();
        self.description = description;
    }
}

fn validate_fields(
    title: &str,
    url: &str,
    description: Option<&str>,
) -> Result<(), BookmarkValidationError> {
    require_non_blank("title", title)?;
    require_max_chars("title", title, TITLE_MAX_CHARS)?;
    require_non_blank("url", url)?;
    require_max_chars("url", url, URL_MAX_CHARS)?;
    if let Some(description) = description {
        require_max_chars("description", description, DESCRIPTION_MAX_CHARS)?;
    }
    Ok(())
}

fn require_non_blank(field: &'static str, value: &str) -> Result<(), BookmarkValidationError> {
    if value.trim().is_empty() {
        return Err(BookmarkValidationError::EmptyField(field));
    }
    Ok(())
}

fn require_max_chars(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), BookmarkValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(BookmarkValidationError::FieldTooLong { field, max, actual });
    }
    Ok(())
}
