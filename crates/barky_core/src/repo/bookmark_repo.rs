//! Bookmark repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide add/get/update/delete/list/search APIs over the `bookmarks` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `validate()` before SQL mutations.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - List and search results are ordered by `id ASC`.
//! - Search criteria are matched literally: `%`, `_` and `\` are escaped.

use crate::db::DbError;
use crate::model::bookmark::{Bookmark, BookmarkDraft, BookmarkId, BookmarkValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const BOOKMARK_SELECT_SQL: &str = "SELECT
    id,
    title,
    url,
    description
FROM bookmarks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for bookmark persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(BookmarkValidationError),
    Db(DbError),
    /// Target row does not exist (never stored, or already removed).
    NotFound(BookmarkId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "bookmark not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted bookmark data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<BookmarkValidationError> for RepoError {
    fn from(value: BookmarkValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for bookmark records.
///
/// Implementations operate inside whatever transaction their connection is
/// currently in; nothing becomes visible to other connections until the
/// owning unit of work commits.
pub trait BookmarkRepository {
    /// Stages a new bookmark and returns it with the store-assigned id.
    fn add(&self, draft: &BookmarkDraft) -> RepoResult<Bookmark>;
    fn get(&self, id: BookmarkId) -> RepoResult<Option<Bookmark>>;
    /// Persists all mutable fields of an already stored bookmark.
    fn update(&self, bookmark: &Bookmark) -> RepoResult<()>;
    /// Removes a stored bookmark. Fails with `NotFound` for detached records.
    fn delete(&self, bookmark: &Bookmark) -> RepoResult<()>;
    fn list(&self) -> RepoResult<Vec<Bookmark>>;
    /// Returns bookmarks whose title contains `criteria` as a substring.
    fn find_by_criteria(&self, criteria: &str) -> RepoResult<Vec<Bookmark>>;
}

/// SQLite-backed bookmark repository bound to one connection or transaction.
pub struct SqliteBookmarkRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookmarkRepository<'conn> {
    /// Binds the repository to a connection that passed `schema::ensure_ready`.
    ///
    /// A `rusqlite::Transaction` derefs to `Connection`, so scoped callers pass
    /// `&tx` here.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BookmarkRepository for SqliteBookmarkRepository<'_> {
    fn add(&self, draft: &BookmarkDraft) -> RepoResult<Bookmark> {
        draft.validate()?;

        self.conn.execute(
            "INSERT INTO bookmarks (title, url, description) VALUES (?1, ?2, ?3);",
            params![
                draft.title.as_str(),
                draft.url.as_str(),
                draft.description.as_deref(),
            ],
        )?;

        Ok(draft.clone().into_bookmark(self.conn.last_insert_rowid()))
    }

    fn get(&self, id: BookmarkId) -> RepoResult<Option<Bookmark>> {
        let row = self
            .conn
            .query_row(
                &format!("{BOOKMARK_SELECT_SQL} WHERE id = ?1;"),
                [id],
                read_row,
            )
            .optional()
            .map_err(row_error)?;

        row.map(check_persisted).transpose()
    }

    fn update(&self, bookmark: &Bookmark) -> RepoResult<()> {
        bookmark.validate()?;

        let changed = self.conn.execute(
            "UPDATE bookmarks
             SET
                title = ?1,
                url = ?2,
                description = ?3
             WHERE id = ?4;",
            params![
                bookmark.title.as_str(),
                bookmark.url.as_str(),
                bookmark.description.as_deref(),
                bookmark.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(bookmark.id));
        }

        Ok(())
    }

    fn delete(&self, bookmark: &Bookmark) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM bookmarks WHERE id = ?1;", [bookmark.id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(bookmark.id));
        }

        Ok(())
    }

    fn list(&self) -> RepoResult<Vec<Bookmark>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOKMARK_SELECT_SQL} ORDER BY id ASC;"))?;
        let rows = stmt.query_map([], read_row)?;
        collect_bookmarks(rows)
    }

    fn find_by_criteria(&self, criteria: &str) -> RepoResult<Vec<Bookmark>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BOOKMARK_SELECT_SQL}
             WHERE title LIKE '%' || ?1 || '%' ESCAPE '\\'
             ORDER BY id ASC;"
        ))?;
        let rows = stmt.query_map([escape_like_pattern(criteria)], read_row)?;
        collect_bookmarks(rows)
    }
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<Bookmark> {
    Ok(Bookmark {
        id: row.get("id")?,
        title: row.get("title")?,
        url: row.get("url")?,
        description: row.get("description")?,
    })
}

fn collect_bookmarks(
    rows: impl Iterator<Item = rusqlite::Result<Bookmark>>,
) -> RepoResult<Vec<Bookmark>> {
    let mut bookmarks = Vec::new();
    for row in rows {
        bookmarks.push(check_persisted(row.map_err(row_error)?)?);
    }
    Ok(bookmarks)
}

/// Column values SQLite cannot hand back as model types are data problems,
/// not store failures.
fn row_error(err: rusqlite::Error) -> RepoError {
    match err {
        rusqlite::Error::FromSqlConversionFailure(index, _, source) => {
            RepoError::InvalidData(format!("column {index} is not valid: {source}"))
        }
        rusqlite::Error::InvalidColumnType(_, name, column_type) => {
            RepoError::InvalidData(format!("column `{name}` has type {column_type}"))
        }
        other => RepoError::from(other),
    }
}

fn check_persisted(bookmark: Bookmark) -> RepoResult<Bookmark> {
    bookmark.validate().map_err(|err| {
        RepoError::InvalidData(format!("row id={} violates model: {err}", bookmark.id))
    })?;
    Ok(bookmark)
}

/// Escapes LIKE metacharacters so `criteria` matches as a literal substring.
fn escape_like_pattern(criteria: &str) -> String {
    let mut escaped = String::with_capacity(criteria.len());
    for ch in criteria.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_like_pattern;

    #[test]
    fn escape_leaves_plain_text_untouched() {
        assert_eq!(escape_like_pattern("rust lang"), "rust lang");
    }

    #[test]
    fn escape_prefixes_metacharacters() {
        assert_eq!(escape_like_pattern("100%_a\\b"), "100\\%\\_a\\\\b");
    }
}
