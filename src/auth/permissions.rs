// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permission checks against decoded claims.
//!
//! Permissions are opaque `action:resource` strings (e.g. `post:movies`)
//! assigned to users through Auth0 RBAC.

use super::{AuthError, Claims};

pub const GET_ACTORS: &str = "get:actors";
pub const POST_ACTORS: &str = "post:actors";
pub const PATCH_ACTORS: &str = "patch:actors";
pub const DELETE_ACTORS: &str = "delete:actors";
pub const GET_MOVIES: &str = "get:movies";
pub const POST_MOVIES: &str = "post:movies";
pub const PATCH_MOVIES: &str = "patch:movies";
pub const DELETE_MOVIES: &str = "delete:movies";

/// Check that `required` is among the permissions granted by `claims`.
pub fn check_permission(required: &str, claims: &Claims) -> Result<(), AuthError> {
    let granted = claims
        .permissions
        .as_ref()
        .ok_or(AuthError::MissingPermissions)?;

    if granted.iter().any(|permission| permission == required) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied)
    }
}
