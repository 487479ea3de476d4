// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `actors`: actor id → serialized Actor
//! - `movies`: movie id → serialized Movie
//! - `sequences`: table name → last id handed out

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{de::DeserializeOwned, Serialize};

use crate::models::{Actor, Movie};

// =============================================================================
// Table Definitions
// =============================================================================

const ACTORS: TableDefinition<u64, &[u8]> = TableDefinition::new("actors");

const MOVIES: TableDefinition<u64, &[u8]> = TableDefinition::new("movies");

/// Id allocation: table name → last id handed out. Ids are never reused.
const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Records
// =============================================================================

/// A row type stored as JSON under a numeric id.
pub trait Record: Serialize + DeserializeOwned {
    const TABLE: TableDefinition<'static, u64, &'static [u8]>;
    const KIND: &'static str;

    fn id(&self) -> u64;
}

impl Record for Actor {
    const TABLE: TableDefinition<'static, u64, &'static [u8]> = ACTORS;
    const KIND: &'static str = "actor";

    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for Movie {
    const TABLE: TableDefinition<'static, u64, &'static [u8]> = MOVIES;
    const KIND: &'static str = "movie";

    fn id(&self) -> u64 {
        self.id
    }
}

// =============================================================================
// Store
// =============================================================================

/// Actors and movies store.
pub struct Store {
    db: Database,
}

impl Store {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ACTORS)?;
            let _ = write_txn.open_table(MOVIES)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// All records of a type, ordered by id.
    pub fn list<T: Record>(&self) -> StoreResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(T::TABLE)?;

        let mut records = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            records.push(serde_json::from_slice(value.value())?);
        }
        Ok(records)
    }

    /// Look up a single record by id.
    pub fn get<T: Record>(&self, id: u64) -> StoreResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(T::TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn exists<T: Record>(&self, id: u64) -> StoreResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(T::TABLE)?;
        Ok(table.get(id)?.is_some())
    }

    /// Allocate the next id and insert the record `build` makes from it.
    pub fn insert<T: Record>(&self, build: impl FnOnce(u64) -> T) -> StoreResult<T> {
        let write_txn = self.db.begin_write()?;
        let record = {
            let mut sequences = write_txn.open_table(SEQUENCES)?;
            let last = sequences.get(T::KIND)?.map(|v| v.value()).unwrap_or(0);
            let id = last + 1;
            sequences.insert(T::KIND, id)?;

            let record = build(id);
            let json = serde_json::to_vec(&record)?;
            let mut table = write_txn.open_table(T::TABLE)?;
            table.insert(record.id(), json.as_slice())?;
            record
        };
        write_txn.commit()?;
        Ok(record)
    }

    /// Read-modify-write a record in one transaction.
    pub fn update<T: Record>(&self, id: u64, apply: impl FnOnce(&mut T)) -> StoreResult<T> {
        let write_txn = self.db.begin_write()?;
        let record = {
            let mut table = write_txn.open_table(T::TABLE)?;
            let mut record: T = match table.get(id)? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => return Err(StoreError::NotFound { kind: T::KIND, id }),
            };
            apply(&mut record);
            let json = serde_json::to_vec(&record)?;
            table.insert(id, json.as_slice())?;
            record
        };
        write_txn.commit()?;
        Ok(record)
    }

    /// Delete a record. Returns whether it existed.
    pub fn delete<T: Record>(&self, id: u64) -> StoreResult<bool> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(T::TABLE)?;
            // The removed guard borrows `table`; bind before the block ends
            let removed = table.remove(id)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// Whether the database answers a read transaction.
    pub fn is_healthy(&self) -> bool {
        match self.db.begin_read() {
            Ok(txn) => txn.open_table(ACTORS).is_ok(),
            Err(_) => false,
        }
    }
}
