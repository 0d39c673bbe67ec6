//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use shelfdb::prelude::*;
use tempfile::TempDir;

/// A database on its own temporary directory, removed on drop.
pub struct TestDb {
    pub db: Shelf,
    dir: TempDir,
}

impl TestDb {
    /// Database holding its connection across operations.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = Shelf::new(dir.path().join("shelf.db"));
        Self { db, dir }
    }

    /// Database that opens and closes around every operation.
    pub fn auto_close() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = Shelf::builder()
            .path(dir.path().join("shelf.db"))
            .auto_close(true)
            .build();
        Self { db, dir }
    }

    /// Path of the database file, for reopening with a second handle.
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("shelf.db")
    }
}
