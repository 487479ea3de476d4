// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post, MethodRouter},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{permissions, RequirePermissionLayer},
    error::{not_found_fallback, ErrorBody},
    models::{
        Actor, ActorListResponse, ActorResponse, CreateActorRequest, CreateMovieRequest,
        DeleteResponse, Gender, Movie, MovieListResponse, MovieResponse, UpdateActorRequest,
        UpdateMovieRequest,
    },
    state::AppState,
};

pub mod actors;
pub mod health;
pub mod movies;

/// Wrap one method route in the permission gate.
fn guarded(
    route: MethodRouter<AppState>,
    state: &AppState,
    permission: &'static str,
) -> MethodRouter<AppState> {
    route.route_layer(RequirePermissionLayer::new(
        Arc::clone(&state.verifier),
        permission,
    ))
}

pub fn router(state: AppState) -> Router {
    let actors_routes = guarded(get(actors::list_actors), &state, permissions::GET_ACTORS)
        .merge(guarded(post(actors::create_actor), &state, permissions::POST_ACTORS));
    let actor_routes = guarded(patch(actors::update_actor), &state, permissions::PATCH_ACTORS)
        .merge(guarded(delete(actors::delete_actor), &state, permissions::DELETE_ACTORS));

    let movies_routes = guarded(get(movies::list_movies), &state, permissions::GET_MOVIES)
        .merge(guarded(post(movies::create_movie), &state, permissions::POST_MOVIES));
    let movie_routes = guarded(patch(movies::update_movie), &state, permissions::PATCH_MOVIES)
        .merge(guarded(delete(movies::delete_movie), &state, permissions::DELETE_MOVIES));

    Router::new()
        .route("/actors", actors_routes)
        .route("/actors/{id}", actor_routes)
        .route("/movies", movies_routes)
        .route("/movies/{id}", movie_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .fallback(not_found_fallback)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Declares the bearer token scheme referenced by the protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        actors::list_actors,
        actors::create_actor,
        actors::update_actor,
        actors::delete_actor,
        movies::list_movies,
        movies::create_movie,
        movies::update_movie,
        movies::delete_movie,
        health::health,
        health::liveness
    ),
    components(
        schemas(
            Actor,
            Gender,
            Movie,
            CreateActorRequest,
            UpdateActorRequest,
            CreateMovieRequest,
            UpdateMovieRequest,
            ActorResponse,
            ActorListResponse,
            MovieResponse,
            MovieListResponse,
            DeleteResponse,
            ErrorBody,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Actors", description = "Actor management"),
        (name = "Movies", description = "Movie management"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
