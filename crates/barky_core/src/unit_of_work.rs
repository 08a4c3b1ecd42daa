//! Transactional unit-of-work boundary.
//!
//! # Responsibility
//! - Run a block of repository calls inside exactly one SQLite transaction.
//! - Commit when the block succeeds, roll back when it fails.
//! - Release the transaction on every exit path, including panics.
//!
//! # Invariants
//! - Exactly one of commit/rollback runs per scope.
//! - Errors returned by the block are passed through unchanged.
//! - After `start` returns (or unwinds) the connection is back in autocommit
//!   mode and the scope lifecycle has reached `Closed`.
//! - `last_outcome` reports how the most recent scope ended.
//! - Scopes never nest: `start` takes `&mut self`, and a connection that is
//!   already inside a transaction is rejected with `UowError::NestedScope`.

use crate::db::schema::ensure_ready;
use crate::db::DbError;
use crate::repo::bookmark_repo::{BookmarkRepository, SqliteBookmarkRepository};
use log::{debug, error, warn};
use rusqlite::{Connection, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Errors raised by the scope itself, as opposed to the work inside it.
#[derive(Debug)]
pub enum UowError {
    /// `start` was called while the connection already had an open transaction.
    NestedScope,
    /// Begin/commit failed, or the connection is not ready for use.
    Db(DbError),
}

impl Display for UowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NestedScope => write!(f, "unit of work scopes cannot be nested"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NestedScope => None,
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for UowError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for UowError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Lifecycle of one scope: `Idle -> Active -> Committed|RolledBack -> Closed`.
///
/// Only `Idle` and `Closed` survive a `start` call, so the state stays
/// private and callers read `last_outcome` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeState {
    Idle,
    Active,
    Committed,
    RolledBack,
    Closed,
}

/// How the last completed scope ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeOutcome {
    Committed,
    RolledBack,
}

/// Scoped transaction boundary over bookmark repositories.
pub trait UnitOfWork {
    /// Runs `work` against a repository bound to a fresh transaction.
    ///
    /// # Contract
    /// - `Ok` from `work` commits; a failed commit is reported as `UowError`.
    /// - `Err` from `work` rolls back and is returned unchanged.
    /// - The transaction is released on every path.
    fn start<T, E, F>(&mut self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn BookmarkRepository) -> Result<T, E>,
        E: From<UowError>;
}

#[derive(Debug)]
struct ScopeTracker {
    state: ScopeState,
    last_outcome: Option<ScopeOutcome>,
}

/// Marks the scope closed when dropped, even while unwinding.
struct ScopeGuard<'t> {
    tracker: &'t mut ScopeTracker,
}

impl<'t> ScopeGuard<'t> {
    fn enter(tracker: &'t mut ScopeTracker) -> Self {
        tracker.state = ScopeState::Active;
        Self { tracker }
    }

    fn finish(&mut self, outcome: ScopeOutcome) {
        self.tracker.state = match outcome {
            ScopeOutcome::Committed => ScopeState::Committed,
            ScopeOutcome::RolledBack => ScopeState::RolledBack,
        };
        self.tracker.last_outcome = Some(outcome);
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if self.tracker.state == ScopeState::Active {
            // Unwinding out of `work`: the transaction guard rolled back.
            self.tracker.last_outcome = Some(ScopeOutcome::RolledBack);
        }
        self.tracker.state = ScopeState::Closed;
    }
}

/// SQLite unit of work owning one connection.
///
/// Each `start` call opens one `BEGIN IMMEDIATE` transaction on that
/// connection and hands the work a `SqliteBookmarkRepository` bound to it.
#[derive(Debug)]
pub struct SqliteUnitOfWork {
    conn: Connection,
    tracker: ScopeTracker,
}

impl SqliteUnitOfWork {
    /// Takes ownership of a bootstrapped connection.
    ///
    /// # Errors
    /// - `UowError::Db(DbError::UninitializedConnection)` when the schema
    ///   version does not match.
    /// - `UowError::Db(DbError::MissingRequiredTable)` when `bookmarks` is absent.
    pub fn try_new(conn: Connection) -> Result<Self, UowError> {
        ensure_ready(&conn)?;
        Ok(Self {
            conn,
            tracker: ScopeTracker {
                state: ScopeState::Idle,
                last_outcome: None,
            },
        })
    }

    /// Outcome of the most recent completed scope, `None` before the first.
    pub fn last_outcome(&self) -> Option<ScopeOutcome> {
        self.tracker.last_outcome
    }

    /// Read-only access for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl UnitOfWork for SqliteUnitOfWork {
    fn start<T, E, F>(&mut self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn BookmarkRepository) -> Result<T, E>,
        E: From<UowError>,
    {
        if !self.conn.is_autocommit() {
            warn!("event=uow_scope module=uow status=rejected error_code=nested_scope");
            return Err(UowError::NestedScope.into());
        }

        let started_at = Instant::now();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(UowError::from)?;
        let mut guard = ScopeGuard::enter(&mut self.tracker);

        let result = work(&SqliteBookmarkRepository::new(&tx));

        match result {
            Ok(value) => {
                if let Err(err) = tx.commit() {
                    guard.finish(ScopeOutcome::RolledBack);
                    error!(
                        "event=uow_scope module=uow status=error duration_ms={} error_code=commit_failed error={err}",
                        started_at.elapsed().as_millis()
                    );
                    return Err(UowError::from(err).into());
                }
                guard.finish(ScopeOutcome::Committed);
                debug!(
                    "event=uow_scope module=uow status=committed duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(work_err) => {
                if let Err(err) = tx.rollback() {
                    error!(
                        "event=uow_scope module=uow status=error error_code=rollback_failed error={err}"
                    );
                }
                guard.finish(ScopeOutcome::RolledBack);
                debug!(
                    "event=uow_scope module=uow status=rolled_back duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Err(work_err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ScopeGuard, ScopeOutcome, ScopeState, ScopeTracker};

    fn tracker() -> ScopeTracker {
        ScopeTracker {
            state: ScopeState::Idle,
            last_outcome: None,
        }
    }

    #[test]
    fn finished_scope_passes_through_outcome_state_to_closed() {
        let mut tracker = tracker();
        {
            let mut guard = ScopeGuard::enter(&mut tracker);
            assert_eq!(guard.tracker.state, ScopeState::Active);
            guard.finish(ScopeOutcome::Committed);
            assert_eq!(guard.tracker.state, ScopeState::Committed);
        }
        assert_eq!(tracker.state, ScopeState::Closed);
        assert_eq!(tracker.last_outcome, Some(ScopeOutcome::Committed));
    }

    #[test]
    fn abandoned_scope_is_recorded_as_rolled_back() {
        let mut tracker = tracker();
        drop(ScopeGuard::enter(&mut tracker));
        assert_eq!(tracker.state, ScopeState::Closed);
        assert_eq!(tracker.last_outcome, Some(ScopeOutcome::RolledBack));
    }
}
