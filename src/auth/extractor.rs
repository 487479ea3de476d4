// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token extraction and the `Authorized` handler extractor.
//!
//! Handlers behind the permission gate receive the verified claims like so:
//!
//! ```rust,ignore
//! async fn list_actors(Authorized(claims): Authorized) -> impl IntoResponse {
//!     // claims is the decoded token payload
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{AuthError, Claims};

/// Pull the raw token out of an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively. Nothing about the token itself
/// is checked here.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Err(AuthError::MissingHeader);
    };
    let value = value.to_str().map_err(|_| AuthError::InvalidScheme)?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::MissingHeader)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidScheme);
    }

    let token = parts.next().ok_or(AuthError::MissingToken)?;
    if parts.next().is_some() {
        return Err(AuthError::TooManyParts);
    }

    Ok(token)
}

/// Claims of a request that passed the permission gate.
///
/// The gate stores the claims in the request extensions; this extractor only
/// reads them back. On a route without the gate it rejects with
/// [`AuthError::PermissionDenied`].
pub struct Authorized(pub Claims);

impl<S> FromRequestParts<S> for Authorized
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(Authorized)
            .ok_or(AuthError::PermissionDenied)
    }
}
