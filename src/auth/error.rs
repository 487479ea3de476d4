// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authorization failure.
///
/// Each variant carries its own description (via `Display`), a machine code
/// and an HTTP status. Several variants share a code but differ in status,
/// e.g. a missing `kid` is a 401 while an unknown `kid` is a 400.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header, or an empty one
    #[error("Authorization header is expected.")]
    MissingHeader,
    /// Scheme is not `Bearer`
    #[error("Authorization header must start with \"Bearer\".")]
    InvalidScheme,
    /// `Bearer` with nothing after it
    #[error("Token not found.")]
    MissingToken,
    /// More than two whitespace-separated parts
    #[error("Authorization header must be bearer token.")]
    TooManyParts,
    /// Token header carries no `kid`
    #[error("Authorization malformed.")]
    MissingKeyId,
    /// No key in the JWKS matches the token's `kid`
    #[error("Unable to find the appropriate key.")]
    NoMatchingKey,
    /// Token could not be decoded or its signature did not verify
    #[error("Unable to parse authentication token.")]
    MalformedToken,
    /// Token `exp` is in the past
    #[error("Token expired.")]
    TokenExpired,
    /// Audience, issuer or algorithm mismatch
    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,
    /// Claims have no `permissions` field
    #[error("Permissions not included in JWT.")]
    MissingPermissions,
    /// Required permission is not granted
    #[error("Permission not found.")]
    PermissionDenied,
    /// JWKS could not be fetched and nothing is cached
    #[error("Unable to fetch signing keys: {0}")]
    KeySetUnavailable(String),
}

/// Coarse classification of [`AuthError`], one per machine code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    MissingHeader,
    InvalidHeader,
    TokenExpired,
    InvalidClaims,
    Unauthorized,
    KeySetUnavailable,
}

impl AuthErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            AuthErrorKind::MissingHeader => "authorization_header_missing",
            AuthErrorKind::InvalidHeader => "invalid_header",
            AuthErrorKind::TokenExpired => "token_expired",
            AuthErrorKind::InvalidClaims => "invalid_claims",
            AuthErrorKind::Unauthorized => "unauthorized",
            AuthErrorKind::KeySetUnavailable => "jwks_unavailable",
        }
    }
}

#[derive(Serialize)]
struct AuthErrorBody {
    success: bool,
    error: &'static str,
    message: String,
}

impl AuthError {
    pub fn kind(&self) -> AuthErrorKind {
        match self {
            AuthError::MissingHeader => AuthErrorKind::MissingHeader,
            AuthError::InvalidScheme
            | AuthError::MissingToken
            | AuthError::TooManyParts
            | AuthError::MissingKeyId
            | AuthError::NoMatchingKey
            | AuthError::MalformedToken => AuthErrorKind::InvalidHeader,
            AuthError::TokenExpired => AuthErrorKind::TokenExpired,
            AuthError::InvalidClaims | AuthError::MissingPermissions => {
                AuthErrorKind::InvalidClaims
            }
            AuthError::PermissionDenied => AuthErrorKind::Unauthorized,
            AuthError::KeySetUnavailable(_) => AuthErrorKind::KeySetUnavailable,
        }
    }

    /// Get the machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        self.kind().code()
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingHeader
            | AuthError::InvalidScheme
            | AuthError::MissingToken
            | AuthError::TooManyParts
            | AuthError::MissingKeyId
            | AuthError::TokenExpired
            | AuthError::InvalidClaims
            | AuthError::PermissionDenied => StatusCode::UNAUTHORIZED,
            AuthError::NoMatchingKey | AuthError::MalformedToken | AuthError::MissingPermissions => {
                StatusCode::BAD_REQUEST
            }
            AuthError::KeySetUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            success: false,
            error: self.error_code(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}
