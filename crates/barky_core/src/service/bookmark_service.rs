//! Bookmark use-case service.
//!
//! # Responsibility
//! - Provide one entry point per bookmark use-case.
//! - Wrap every entry point in exactly one unit-of-work scope.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Mutations look the record up by id first; a missing id is reported via
//!   the return value, never as an error, so delete/edit stay idempotent.
//! - Log events carry ids and counts only, never titles or urls.

use crate::model::bookmark::{Bookmark, BookmarkDraft, BookmarkId, BookmarkValidationError};
use crate::repo::bookmark_repo::RepoError;
use crate::unit_of_work::{UnitOfWork, UowError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error taxonomy exposed at the service boundary.
#[derive(Debug)]
pub enum ServiceError {
    /// Input failed field validation; nothing was written.
    Validation(BookmarkValidationError),
    /// Record disappeared between lookup and write inside one scope.
    NotFound(BookmarkId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Transaction could not be opened or committed.
    Transaction(UowError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "bookmark not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Transaction(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Repo(err) => Some(err),
            Self::Transaction(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<UowError> for ServiceError {
    fn from(value: UowError) -> Self {
        Self::Transaction(value)
    }
}

/// Bookmark service facade over a unit of work.
pub struct BookmarkService<U: UnitOfWork> {
    unit_of_work: U,
}

impl<U: UnitOfWork> BookmarkService<U> {
    pub fn new(unit_of_work: U) -> Self {
        Self { unit_of_work }
    }

    /// Creates a bookmark and returns it with its store-assigned id.
    ///
    /// The record is durable iff this returns `Ok`.
    pub fn add_bookmark(
        &mut self,
        title: impl Into<String>,
        url: impl Into<String>,
        description: Option<String>,
    ) -> ServiceResult<Bookmark> {
        let draft = BookmarkDraft::new(title, url, description);
        let created = self
            .unit_of_work
            .start(|repo| -> ServiceResult<Bookmark> { Ok(repo.add(&draft)?) })?;
        info!(
            "event=bookmark_add module=service status=ok bookmark_id={}",
            created.id
        );
        Ok(created)
    }

    /// Fetches one bookmark by id.
    pub fn get_bookmark(&mut self, id: BookmarkId) -> ServiceResult<Option<Bookmark>> {
        self.unit_of_work
            .start(|repo| -> ServiceResult<Option<Bookmark>> { Ok(repo.get(id)?) })
    }

    /// Deletes a bookmark by id.
    ///
    /// Returns `false` without error when the id does not exist.
    pub fn delete_bookmark(&mut self, id: BookmarkId) -> ServiceResult<bool> {
        let deleted = self.unit_of_work.start(|repo| -> ServiceResult<bool> {
            match repo.get(id)? {
                Some(bookmark) => {
                    repo.delete(&bookmark)?;
                    Ok(true)
                }
                None => Ok(false),
            }
        })?;
        info!(
            "event=bookmark_delete module=service status={} bookmark_id={id}",
            found_label(deleted)
        );
        Ok(deleted)
    }

    /// Replaces title, url and description of an existing bookmark.
    ///
    /// Returns the updated record, or `None` without error when the id does
    /// not exist.
    pub fn edit_bookmark(
        &mut self,
        id: BookmarkId,
        title: impl Into<String>,
        url: impl Into<String>,
        description: Option<String>,
    ) -> ServiceResult<Option<Bookmark>> {
        let title = title.into();
        let url = url.into();
        let edited = self
            .unit_of_work
            .start(|repo| -> ServiceResult<Option<Bookmark>> {
                let Some(mut bookmark) = repo.get(id)? else {
                    return Ok(None);
                };
                bookmark.apply_edit(title, url, description);
                repo.update(&bookmark)?;
                Ok(Some(bookmark))
            })?;
        info!(
            "event=bookmark_edit module=service status={} bookmark_id={id}",
            found_label(edited.is_some())
        );
        Ok(edited)
    }

    /// Lists every bookmark ordered by id.
    pub fn list_bookmarks(&mut self) -> ServiceResult<Vec<Bookmark>> {
        self.unit_of_work
            .start(|repo| -> ServiceResult<Vec<Bookmark>> { Ok(repo.list()?) })
    }

    /// Returns bookmarks whose title contains `criteria`.
    ///
    /// Empty criteria match every bookmark.
    pub fn search_bookmarks(&mut self, criteria: &str) -> ServiceResult<Vec<Bookmark>> {
        let hits = self
            .unit_of_work
            .start(|repo| -> ServiceResult<Vec<Bookmark>> {
                Ok(repo.find_by_criteria(criteria)?)
            })?;
        info!(
            "event=bookmark_search module=service status=ok hit_count={}",
            hits.len()
        );
        Ok(hits)
    }
}

fn found_label(found: bool) -> &'static str {
    if found {
        "ok"
    } else {
        "not_found"
    }
}
