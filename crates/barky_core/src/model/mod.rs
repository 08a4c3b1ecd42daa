//! Domain model for bookmark records.
//!
//! # Responsibility
//! - Define the canonical bookmark shapes used by core business logic.
//! - Own field-level validation shared by every write path.
//!
//! # Invariants
//! - A persisted bookmark is identified by a store-assigned `BookmarkId`.
//! - Title and url are never blank for a persisted record.

pub mod bookmark;
