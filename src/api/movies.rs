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
use chrono::NaiveDate;

use crate::{
    auth::Authorized,
    error::{ApiError, ErrorBody},
    models::{
        parse_release_date, CreateMovieRequest, DeleteResponse, Movie, MovieListResponse,
        MovieResponse, UpdateMovieRequest,
    },
    state::AppState,
};

fn release_date(raw: &str) -> Result<NaiveDate, ApiError> {
    parse_release_date(raw).ok_or_else(ApiError::unprocessable)
}

#[utoipa::path(
    get,
    path = "/movies",
    tag = "Movies",
    security(("bearer_auth" = ["get:movies"])),
    responses(
        (status = 200, body = MovieListResponse),
        (status = 404, description = "No movies", body = ErrorBody)
    )
)]
pub async fn list_movies(
    Authorized(_claims): Authorized,
    State(state): State<AppState>,
) -> Result<Json<MovieListResponse>, ApiError> {
    let movies = state.store.list::<Movie>()?;
    if movies.is_empty() {
        return Err(ApiError::not_found());
    }
    Ok(Json(MovieListResponse {
        success: true,
        movies,
    }))
}

#[utoipa::path(
    post,
    path = "/movies",
    request_body = CreateMovieRequest,
    tag = "Movies",
    security(("bearer_auth" = ["post:movies"])),
    responses(
        (status = 200, body = MovieResponse),
        (status = 400, description = "Malformed JSON", body = ErrorBody),
        (status = 422, description = "Missing field or unparseable date", body = ErrorBody)
    )
)]
pub async fn create_movie(
    Authorized(claims): Authorized,
    State(state): State<AppState>,
    payload: Result<Json<CreateMovieRequest>, JsonRejection>,
) -> Result<Json<MovieResponse>, ApiError> {
    let Json(request) = payload?;

    let title = match request.title {
        Some(title) if !title.trim().is_empty() => title,
        _ => return Err(ApiError::unprocessable()),
    };
    let release_date = release_date(request.release_date.as_deref().unwrap_or_default())?;

    let movie = state.store.insert(|id| Movie {
        id,
        title,
        release_date,
    })?;
    tracing::info!(movie_id = movie.id, subject = ?claims.sub, "movie created");

    Ok(Json(MovieResponse {
        success: true,
        movie,
    }))
}

#[utoipa::path(
    patch,
    path = "/movies/{id}",
    params(("id" = u64, Path, description = "Movie id")),
    request_body = UpdateMovieRequest,
    tag = "Movies",
    security(("bearer_auth" = ["patch:movies"])),
    responses(
        (status = 200, body = MovieResponse),
        (status = 404, description = "Unknown movie", body = ErrorBody),
        (status = 422, description = "Unparseable date", body = ErrorBody)
    )
)]
pub async fn update_movie(
    Authorized(claims): Authorized,
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<UpdateMovieRequest>, JsonRejection>,
) -> Result<Json<MovieResponse>, ApiError> {
    let Path(id) = id?;
    if !state.store.exists::<Movie>(id)? {
        return Err(ApiError::not_found());
    }

    let Json(request) = payload?;
    let date = request.release_date.as_deref().map(release_date).transpose()?;
    if matches!(&request.title, Some(title) if title.trim().is_empty()) {
        return Err(ApiError::unprocessable());
    }

    let movie = state.store.update::<Movie>(id, |movie| {
        if let Some(title) = request.title {
            movie.title = title;
        }
        if let Some(date) = date {
            movie.release_date = date;
        }
    })?;
    tracing::info!(movie_id = id, subject = ?claims.sub, "movie updated");

    Ok(Json(MovieResponse {
        success: true,
        movie,
    }))
}

#[utoipa::path(
    delete,
    path = "/movies/{id}",
    params(("id" = u64, Path, description = "Movie id")),
    tag = "Movies",
    security(("bearer_auth" = ["delete:movies"])),
    responses(
        (status = 200, body = DeleteResponse),
        (status = 404, description = "Unknown movie", body = ErrorBody)
    )
)]
pub async fn delete_movie(
    Authorized(claims): Authorized,
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Path(id) = id?;
    if !state.store.delete::<Movie>(id)? {
        return Err(ApiError::not_found());
    }
    tracing::info!(movie_id = id, subject = ?claims.sub, "movie deleted");

    Ok(Json(DeleteResponse {
        success: true,
        delete: id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, ALL_PERMISSIONS};
    use axum::http::StatusCode;

    fn producer() -> Authorized {
        testing::authorized(ALL_PERMISSIONS)
    }

    fn create_request(title: &str, date: &str) -> CreateMovieRequest {
        CreateMovieRequest {
            title: Some(title.to_string()),
            release_date: Some(date.to_string()),
        }
    }

    async fn seed(state: &AppState) -> Movie {
        let Json(response) = create_movie(
            producer(),
            State(state.clone()),
            Ok(Json(create_request("12 Angry Men", "March 25, 1957"))),
        )
        .await
        .expect("movie creation succeeds");
        response.movie
    }

    #[tokio::test]
    async fn create_movie_success() {
        let (state, _dir) = testing::app_state();
        let movie = seed(&state).await;

        assert_eq!(movie.id, 1);
        assert_eq!(movie.title, "12 Angry Men");
        assert_eq!(movie.release_date, NaiveDate::from_ymd_opt(1957, 3, 25).unwrap());
        assert_eq!(state.store.list::<Movie>().unwrap(), vec![movie]);
    }

    #[tokio::test]
    async fn create_movie_missing_title_is_422() {
        let (state, _dir) = testing::app_state();
        let request = CreateMovieRequest {
            title: None,
            release_date: Some("1957-03-25".to_string()),
        };

        let err = create_movie(producer(), State(state), Ok(Json(request)))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn create_movie_bad_date_is_422() {
        let (state, _dir) = testing::app_state();

        let err = create_movie(
            producer(),
            State(state.clone()),
            Ok(Json(create_request("Everest", "sometime in 2015"))),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(state.store.list::<Movie>().unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_movies_empty_is_404() {
        let (state, _dir) = testing::app_state();
        let err = list_movies(producer(), State(state)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_movies_returns_all() {
        let (state, _dir) = testing::app_state();
        let movie = seed(&state).await;

        let Json(response) = list_movies(producer(), State(state)).await.unwrap();
        assert!(response.success);
        assert_eq!(response.movies, vec![movie]);
    }

    #[tokio::test]
    async fn update_movie_changes_date_only() {
        let (state, _dir) = testing::app_state();
        let movie = seed(&state).await;
        let request = UpdateMovieRequest {
            release_date: Some("04/10/1957".to_string()),
            ..Default::default()
        };

        let Json(response) = update_movie(
            producer(),
            State(state.clone()),
            Ok(Path(movie.id)),
            Ok(Json(request)),
        )
        .await
        .unwrap();

        assert_eq!(response.movie.title, "12 Angry Men");
        assert_eq!(
            response.movie.release_date,
            NaiveDate::from_ymd_opt(1957, 4, 10).unwrap()
        );
    }

    #[tokio::test]
    async fn update_movie_bad_date_is_422() {
        let (state, _dir) = testing::app_state();
        let movie = seed(&state).await;
        let request = UpdateMovieRequest {
            release_date: Some("yesterday".to_string()),
            ..Default::default()
        };

        let err = update_movie(
            producer(),
            State(state.clone()),
            Ok(Path(movie.id)),
            Ok(Json(request)),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(state.store.get::<Movie>(movie.id).unwrap(), Some(movie));
    }

    #[tokio::test]
    async fn update_unknown_movie_is_404() {
        let (state, _dir) = testing::app_state();
        let err = update_movie(
            producer(),
            State(state),
            Ok(Path(42)),
            Ok(Json(UpdateMovieRequest::default())),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_movie_success_then_404() {
        let (state, _dir) = testing::app_state();
        let movie = seed(&state).await;

        let Json(response) = delete_movie(producer(), State(state.clone()), Ok(Path(movie.id)))
            .await
            .unwrap();
        assert_eq!(response.delete, movie.id);

        let err = delete_movie(producer(), State(state), Ok(Path(movie.id)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
