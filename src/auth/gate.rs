// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permission gate.
//!
//! Every protected route is wrapped in a [`RequirePermissionLayer`] naming
//! the permission it needs:
//!
//! ```rust,ignore
//! let route = get(list_actors).route_layer(RequirePermissionLayer::new(verifier, "get:actors"));
//! ```
//!
//! The gate runs token extraction, verification and the permission check in
//! order. The first failure becomes the response, with the status and code
//! of that failure. On success the [`Claims`] are stored in the request
//! extensions for the [`Authorized`](super::Authorized) extractor.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    extract::Request,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use tower::{Layer, Service};

use super::extractor::bearer_token;
use super::permissions::check_permission;
use super::{AuthError, Claims, TokenVerifier};

/// Run the full authorization chain for `permission` against `headers`.
pub async fn authorize(
    headers: &HeaderMap,
    permission: &str,
    verifier: &TokenVerifier,
) -> Result<Claims, AuthError> {
    let token = bearer_token(headers)?;
    let claims = verifier.verify(token).await?;
    check_permission(permission, &claims)?;
    Ok(claims)
}

/// Layer guarding a route with a required permission.
#[derive(Clone)]
pub struct RequirePermissionLayer {
    verifier: Arc<TokenVerifier>,
    permission: &'static str,
}

impl RequirePermissionLayer {
    pub fn new(verifier: Arc<TokenVerifier>, permission: &'static str) -> Self {
        Self {
            verifier,
            permission,
        }
    }
}

impl<S> Layer<S> for RequirePermissionLayer {
    type Service = RequirePermission<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequirePermission {
            inner,
            verifier: Arc::clone(&self.verifier),
            permission: self.permission,
        }
    }
}

/// Service produced by [`RequirePermissionLayer`].
#[derive(Clone)]
pub struct RequirePermission<S> {
    inner: S,
    verifier: Arc<TokenVerifier>,
    permission: &'static str,
}

impl<S> Service<Request> for RequirePermission<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        // The clone may not be ready yet, so call the one poll_ready was
        // invoked on and keep the clone.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let verifier = Arc::clone(&self.verifier);
        let permission = self.permission;

        Box::pin(async move {
            let (mut parts, body) = request.into_parts();
            let outcome = authorize(&parts.headers, permission, &verifier).await;
            match outcome {
                Ok(claims) => {
                    tracing::debug!(permission, subject = ?claims.sub, "request authorized");
                    parts.extensions.insert(claims);
                    inner.call(Request::from_parts(parts, body)).await
                }
                Err(err) => {
                    tracing::warn!(
                        permission,
                        code = err.error_code(),
                        status = err.status_code().as_u16(),
                        reason = %err,
                        path = %parts.uri.path(),
                        "request rejected"
                    );
                    Ok(err.into_response())
                }
            }
        })
    }
}
