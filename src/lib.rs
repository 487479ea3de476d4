// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Casting Agency - Actors and Movies API
//!
//! REST service for managing actors and movies. Every resource route is
//! guarded by an Auth0 access token carrying the route's permission.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - JWT verification and permission checks (Auth0 JWKS)
//! - `config` - Environment configuration
//! - `storage` - Embedded database (redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;

#[cfg(test)]
pub mod testing;
