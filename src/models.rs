// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the stored records and the request and response data
//! structures used by the REST API. All types derive `Serialize` and
//! `ToSchema` for JSON handling and OpenAPI documentation.
//!
//! ## Model Categories
//!
//! - **Actors**: name, age and gender
//! - **Movies**: title and release date
//!
//! Request bodies are all-optional so that a missing field becomes a 422
//! from the handler instead of a deserialization error.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Actor Models
// =============================================================================

/// Actor gender, serialized as `M` or `F`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    /// Parse `M`/`F` case-insensitively.
    pub fn parse(s: &str) -> Option<Gender> {
        match s.to_uppercase().as_str() {
            "M" => Some(Gender::Male),
            "F" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// A stored actor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Actor {
    pub id: u64,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
}

/// Request body for `POST /actors`. All fields are required.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateActorRequest {
    pub name: Option<String>,
    pub age: Option<u32>,
    /// `M` or `F`, case-insensitive
    pub gender: Option<String>,
}

/// Request body for `PATCH /actors/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateActorRequest {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActorResponse {
    pub success: bool,
    pub actor: Actor,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActorListResponse {
    pub success: bool,
    pub actors: Vec<Actor>,
}

// =============================================================================
// Movie Models
// =============================================================================

/// A stored movie. `release_date` is serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub release_date: NaiveDate,
}

/// Request body for `POST /movies`. All fields are required.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateMovieRequest {
    pub title: Option<String>,
    /// Any format accepted by [`parse_release_date`]
    #[schema(example = "March 25, 1957")]
    pub release_date: Option<String>,
}

/// Request body for `PATCH /movies/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateMovieRequest {
    pub title: Option<String>,
    pub release_date: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovieResponse {
    pub success: bool,
    pub movie: Movie,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovieListResponse {
    pub success: bool,
    pub movies: Vec<Movie>,
}

// =============================================================================
// Shared
// =============================================================================

/// Response for a successful delete. `delete` is the removed id.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub delete: u64,
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%m/%d/%Y"];

/// Parse a release date.
///
/// Accepts `1957-03-25`, `1957-03-25T00:00:00Z`, `March 25, 1957`,
/// `Mar 25, 1957` and `03/25/1957`.
pub fn parse_release_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.date_naive());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
}
