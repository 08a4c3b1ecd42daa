//! Core domain logic for Barky, a minimal bookmark manager.
//! This crate is the single source of truth for bookmark invariants and
//! transactional boundaries.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod unit_of_work;

pub use logging::{default_log_level, init_logging, logging_status, LogTarget, LoggingError};
pub use model::bookmark::{Bookmark, BookmarkDraft, BookmarkId, BookmarkValidationError};
pub use repo::bookmark_repo::{
    BookmarkRepository, RepoError, RepoResult, SqliteBookmarkRepository,
};
pub use service::bookmark_service::{BookmarkService, ServiceError, ServiceResult};
pub use unit_of_work::{ScopeOutcome, SqliteUnitOfWork, UnitOfWork, UowError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
