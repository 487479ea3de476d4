// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage for actors and movies in a single redb file
//! (`DATABASE_PATH`, default `casting.redb`).
//!
//! Records are stored as JSON under a numeric id. Ids are allocated per
//! table inside the inserting write transaction and are never reused.

pub mod database;

pub use database::{Record, Store, StoreError, StoreResult};
