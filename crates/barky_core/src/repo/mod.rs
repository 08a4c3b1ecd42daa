//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define collection-like data access contracts for bookmarks.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must enforce bookmark validation before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Repositories never begin, commit or roll back transactions; the unit of
//!   work owns those boundaries.

pub mod bookmark_repo;
