// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT verification against the identity provider's JWKS.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::Jwk;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use url::Url;

use super::jwks::{decoding_key, find_key, JwksManager};
use super::{AuthError, Claims};

/// Token validation settings, fixed at startup.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Expected `iss` (`https://{domain}/`)
    pub issuer: String,
    /// Expected `aud`
    pub audience: String,
    /// Accepted signing algorithms
    pub algorithms: Vec<Algorithm>,
    /// Clock skew tolerance in seconds
    pub leeway: u64,
    /// Where the signing keys are published
    pub jwks_url: Url,
}

impl AuthConfig {
    /// Configuration for an Auth0 tenant.
    ///
    /// # Arguments
    /// - `domain`: tenant domain without scheme (e.g., `casting.eu.auth0.com`)
    /// - `audience`: API identifier expected in `aud`
    pub fn for_domain(domain: &str, audience: impl Into<String>) -> Result<Self, url::ParseError> {
        Ok(Self {
            issuer: format!("https://{domain}/"),
            audience: audience.into(),
            algorithms: vec![Algorithm::RS256],
            leeway: 0,
            jwks_url: Url::parse(&format!("https://{domain}/.well-known/jwks.json"))?,
        })
    }

    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }

    pub fn with_leeway(mut self, leeway: u64) -> Self {
        self.leeway = leeway;
        self
    }

    pub fn with_jwks_url(mut self, jwks_url: Url) -> Self {
        self.jwks_url = jwks_url;
        self
    }
}

/// Verifies bearer tokens and returns their claims.
pub struct TokenVerifier {
    config: Arc<AuthConfig>,
    keys: JwksManager,
}

impl TokenVerifier {
    pub fn new(config: Arc<AuthConfig>, keys: JwksManager) -> Self {
        Self { config, keys }
    }

    pub fn keys(&self) -> &JwksManager {
        &self.keys
    }

    /// Verify `token` and decode its claims.
    ///
    /// Requires a `kid` matching a published key, a valid signature, an
    /// allowed algorithm, the configured audience and issuer, and an `exp`
    /// in the future.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let key_set = self.keys.key_set().await?;

        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
        let kid = header.kid.as_deref().ok_or(AuthError::MissingKeyId)?;

        let jwk = match find_key(&key_set.keys, kid) {
            Some(jwk) => jwk.clone(),
            None if key_set.just_fetched => return Err(AuthError::NoMatchingKey),
            None => self.rotated_key(kid).await?,
        };
        let key = decoding_key(&jwk)?;

        if !self.config.algorithms.contains(&header.alg) {
            return Err(AuthError::InvalidClaims);
        }

        let mut validation = Validation::new(header.alg);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);
        validation.leeway = self.config.leeway;

        let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| {
            tracing::debug!(error = %e, kid, "token rejected");
            classify(e.kind())
        })?;

        Ok(token_data.claims)
    }

    /// The `kid` is unknown to a cached key set; the provider may have rotated
    /// its keys since, so fetch once more before giving up. The manager skips
    /// the fetch when keys were fetched recently.
    async fn rotated_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        let keys = self
            .keys
            .refresh_for_unknown_kid()
            .await
            .ok_or(AuthError::NoMatchingKey)?;
        find_key(&keys, kid).cloned().ok_or(AuthError::NoMatchingKey)
    }
}

fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
        _ => AuthError::MalformedToken,
    }
}
