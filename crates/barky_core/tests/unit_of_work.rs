use barky_core::db::{open_db, open_db_in_memory, DbError};
use barky_core::{
    BookmarkDraft, ScopeOutcome, ServiceError, SqliteUnitOfWork, UnitOfWork, UowError,
};
use rusqlite::{Connection, ErrorCode};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

fn unit_of_work() -> SqliteUnitOfWork {
    SqliteUnitOfWork::try_new(open_db_in_memory().unwrap()).unwrap()
}

fn draft(title: &str) -> BookmarkDraft {
    BookmarkDraft::new(title, "https://example.com", None)
}

fn row_count(uow: &SqliteUnitOfWork) -> i64 {
    uow.connection()
        .query_row("SELECT COUNT(*) FROM bookmarks;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn new_unit_of_work_has_no_outcome() {
    let uow = unit_of_work();
    assert_eq!(uow.last_outcome(), None);
}

#[test]
fn successful_scope_commits_and_closes() {
    let mut uow = unit_of_work();

    let created = uow
        .start(|repo| -> Result<_, ServiceError> {
            let first = repo.add(&draft("first"))?;
            repo.add(&draft("second"))?;
            Ok(first)
        })
        .unwrap();

    assert_eq!(created.title, "first");
    assert_eq!(row_count(&uow), 2);
    assert_eq!(uow.last_outcome(), Some(ScopeOutcome::Committed));
    assert!(uow.connection().is_autocommit());
}

#[test]
fn failing_scope_rolls_back_every_staged_write() {
    let mut uow = unit_of_work();

    let err = uow
        .start(|repo| -> Result<(), ServiceError> {
            repo.add(&draft("staged one"))?;
            repo.add(&draft("staged two"))?;
            repo.add(&draft(""))?;
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(row_count(&uow), 0);
    assert_eq!(uow.last_outcome(), Some(ScopeOutcome::RolledBack));
    assert!(uow.connection().is_autocommit());
}

#[derive(Debug, PartialEq, Eq)]
enum CustomError {
    Aborted(&'static str),
    Scope,
}

impl From<UowError> for CustomError {
    fn from(_: UowError) -> Self {
        Self::Scope
    }
}

#[test]
fn work_error_is_returned_unchanged() {
    let mut uow = unit_of_work();

    let err = uow
        .start(|repo| -> Result<(), CustomError> {
            repo.add(&draft("staged")).map_err(|_| CustomError::Scope)?;
            Err(CustomError::Aborted("caller gave up"))
        })
        .unwrap_err();

    assert_eq!(err, CustomError::Aborted("caller gave up"));
    assert_eq!(row_count(&uow), 0);
}

#[test]
fn panicking_scope_rolls_back_and_releases_the_transaction() {
    let mut uow = unit_of_work();

    let result = catch_unwind(AssertUnwindSafe(|| {
        let _ = uow.start(|repo| -> Result<(), ServiceError> {
            repo.add(&draft("staged"))?;
            panic!("work blew up");
        });
    }));

    assert!(result.is_err());
    assert!(uow.connection().is_autocommit());
    assert_eq!(row_count(&uow), 0);
    assert_eq!(uow.last_outcome(), Some(ScopeOutcome::RolledBack));

    uow.start(|repo| -> Result<(), ServiceError> {
        repo.add(&draft("after panic"))?;
        Ok(())
    })
    .unwrap();
    assert_eq!(row_count(&uow), 1);
}

#[test]
fn scope_fails_fast_when_connection_is_already_in_a_transaction() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("BEGIN;").unwrap();
    let mut uow = SqliteUnitOfWork::try_new(conn).unwrap();

    let err = uow
        .start(|repo| -> Result<(), ServiceError> {
            repo.add(&draft("never"))?;
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(err, ServiceError::Transaction(UowError::NestedScope)));
    assert_eq!(uow.last_outcome(), None);
    assert!(!uow.connection().is_autocommit());
}

#[test]
fn failed_commit_is_reported_and_rolls_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("barky.db");
    let writer = open_db(&path).unwrap();
    writer.busy_timeout(Duration::ZERO).unwrap();
    let mut uow = SqliteUnitOfWork::try_new(writer).unwrap();

    // An open read transaction keeps a SHARED lock, so COMMIT cannot escalate.
    let reader = open_db(&path).unwrap();
    reader.execute_batch("BEGIN;").unwrap();
    let _: i64 = reader
        .query_row("SELECT COUNT(*) FROM bookmarks;", [], |row| row.get(0))
        .unwrap();

    let err = uow
        .start(|repo| -> Result<(), ServiceError> {
            repo.add(&draft("blocked"))?;
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Transaction(UowError::Db(DbError::Sqlite(
            rusqlite::Error::SqliteFailure(ref failure, _)
        ))) if failure.code == ErrorCode::DatabaseBusy
    ));
    assert_eq!(uow.last_outcome(), Some(ScopeOutcome::RolledBack));
    assert!(uow.connection().is_autocommit());

    reader.execute_batch("COMMIT;").unwrap();
    assert_eq!(row_count(&uow), 0);
}

#[test]
fn consecutive_scopes_are_independent() {
    let mut uow = unit_of_work();

    uow.start(|repo| -> Result<(), ServiceError> {
        repo.add(&draft("kept"))?;
        Ok(())
    })
    .unwrap();
    let _ = uow.start(|repo| -> Result<(), ServiceError> {
        repo.add(&draft("dropped"))?;
        Err(ServiceError::NotFound(0))
    });

    let titles: Vec<_> = uow
        .start(|repo| -> Result<_, ServiceError> { Ok(repo.list()?) })
        .unwrap()
        .into_iter()
        .map(|bookmark| bookmark.title)
        .collect();
    assert_eq!(titles, vec!["kept".to_string()]);
    assert_eq!(uow.last_outcome(), Some(ScopeOutcome::Committed));
}

#[test]
fn uncommitted_writes_are_invisible_to_other_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("barky.db");
    let mut uow = SqliteUnitOfWork::try_new(open_db(&path).unwrap()).unwrap();
    let observer = open_db(&path).unwrap();

    let observed_mid_scope = uow
        .start(|repo| -> Result<i64, ServiceError> {
            repo.add(&draft("pending"))?;
            let seen: i64 = observer
                .query_row("SELECT COUNT(*) FROM bookmarks;", [], |row| row.get(0))
                .map_err(|err| ServiceError::Transaction(UowError::Db(DbError::Sqlite(err))))?;
            Ok(seen)
        })
        .unwrap();

    assert_eq!(observed_mid_scope, 0);
    let seen_after: i64 = observer
        .query_row("SELECT COUNT(*) FROM bookmarks;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(seen_after, 1);
}

#[test]
fn try_new_rejects_unbootstrapped_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteUnitOfWork::try_new(conn).unwrap_err();
    assert!(matches!(
        err,
        UowError::Db(DbError::UninitializedConnection {
            actual_version: 0,
            ..
        })
    ));
}
