// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};

use crate::{
    auth::Authorized,
    error::{ApiError, ErrorBody},
    models::{
        Actor, ActorListResponse, ActorResponse, CreateActorRequest, DeleteResponse, Gender,
        UpdateActorRequest,
    },
    state::AppState,
};

fn parse_gender(raw: &str) -> Result<Gender, ApiError> {
    Gender::parse(raw).ok_or_else(ApiError::unprocessable)
}

fn required_name(raw: Option<String>) -> Result<String, ApiError> {
    match raw {
        Some(name) if !name.trim().is_empty() => Ok(name),
        _ => Err(ApiError::unprocessable()),
    }
}

#[utoipa::path(
    get,
    path = "/actors",
    tag = "Actors",
    security(("bearer_auth" = ["get:actors"])),
    responses(
        (status = 200, body = ActorListResponse),
        (status = 404, description = "No actors", body = ErrorBody)
    )
)]
pub async fn list_actors(
    Authorized(_claims): Authorized,
    State(state): State<AppState>,
) -> Result<Json<ActorListResponse>, ApiError> {
    let actors = state.store.list::<Actor>()?;
    if actors.is_empty() {
        return Err(ApiError::not_found());
    }
    Ok(Json(ActorListResponse {
        success: true,
        actors,
    }))
}

#[utoipa::path(
    post,
    path = "/actors",
    request_body = CreateActorRequest,
    tag = "Actors",
    security(("bearer_auth" = ["post:actors"])),
    responses(
        (status = 200, body = ActorResponse),
        (status = 400, description = "Malformed JSON", body = ErrorBody),
        (status = 422, description = "Missing field or invalid gender", body = ErrorBody)
    )
)]
pub async fn create_actor(
    Authorized(claims): Authorized,
    State(state): State<AppState>,
    payload: Result<Json<CreateActorRequest>, JsonRejection>,
) -> Result<Json<ActorResponse>, ApiError> {
    let Json(request) = payload?;

    let name = required_name(request.name)?;
    let age = request.age.ok_or_else(ApiError::unprocessable)?;
    let gender = parse_gender(request.gender.as_deref().unwrap_or_default())?;

    let actor = state.store.insert(|id| Actor {
        id,
        name,
        age,
        gender,
    })?;
    tracing::info!(actor_id = actor.id, subject = ?claims.sub, "actor created");

    Ok(Json(ActorResponse {
        success: true,
        actor,
    }))
}

#[utoipa::path(
    patch,
    path = "/actors/{id}",
    params(("id" = u64, Path, description = "Actor id")),
    request_body = UpdateActorRequest,
    tag = "Actors",
    security(("bearer_auth" = ["patch:actors"])),
    responses(
        (status = 200, body = ActorResponse),
        (status = 404, description = "Unknown actor", body = ErrorBody),
        (status = 422, description = "Invalid gender", body = ErrorBody)
    )
)]
pub async fn update_actor(
    Authorized(claims): Authorized,
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<UpdateActorRequest>, JsonRejection>,
) -> Result<Json<ActorResponse>, ApiError> {
    let Path(id) = id?;
    if !state.store.exists::<Actor>(id)? {
        return Err(ApiError::not_found());
    }

    let Json(request) = payload?;
    let gender = request.gender.as_deref().map(parse_gender).transpose()?;
    if matches!(&request.name, Some(name) if name.trim().is_empty()) {
        return Err(ApiError::unprocessable());
    }

    let actor = state.store.update::<Actor>(id, |actor| {
        if let Some(name) = request.name {
            actor.name = name;
        }
        if let Some(age) = request.age {
            actor.age = age;
        }
        if let Some(gender) = gender {
            actor.gender = gender;
        }
    })?;
    tracing::info!(actor_id = id, subject = ?claims.sub, "actor updated");

    Ok(Json(ActorResponse {
        success: true,
        actor,
    }))
}

#[utoipa::path(
    delete,
    path = "/actors/{id}",
    params(("id" = u64, Path, description = "Actor id")),
    tag = "Actors",
    security(("bearer_auth" = ["delete:actors"])),
    responses(
        (status = 200, body = DeleteResponse),
        (status = 404, description = "Unknown actor", body = ErrorBody)
    )
)]
pub async fn delete_actor(
    Authorized(claims): Authorized,
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Path(id) = id?;
    if !state.store.delete::<Actor>(id)? {
        return Err(ApiError::not_found());
    }
    tracing::info!(actor_id = id, subject = ?claims.sub, "actor deleted");

    Ok(Json(DeleteResponse {
        success: true,
        delete: id,
    }))
}
