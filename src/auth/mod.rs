// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authorization Module
//!
//! Auth0 JWT verification and permission checks for the Casting Agency API.
//!
//! ## Auth Flow
//!
//! 1. The client obtains an access token from Auth0 for the API audience
//! 2. The client sends `Authorization: Bearer <token>`
//! 3. The route's permission gate:
//!    - extracts the token from the header
//!    - fetches the tenant JWKS via HTTPS (cached with TTL)
//!    - verifies signature, algorithm, expiry, issuer and audience
//!    - checks the route's permission (e.g. `post:movies`) against the
//!      `permissions` claim
//! 4. The handler receives the claims through [`Authorized`]
//!
//! Any failure short-circuits with an [`AuthError`] response carrying its own
//! status and code.

pub mod claims;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod jwks;
pub mod permissions;
pub mod verifier;

pub use claims::{Audience, Claims};
pub use error::{AuthError, AuthErrorKind};
pub use extractor::Authorized;
pub use gate::RequirePermissionLayer;
pub use jwks::JwksManager;
pub use verifier::{AuthConfig, TokenVerifier};
