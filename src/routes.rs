use std::sync::Arc;

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState,
    error::{AppError, AppResult},
    extract::{Json, Path, Query},
    models::{
        AddToWatchlistRequest, CreateUserRequest, SourcedMovie, UpdateWatchlistRequest, User,
        WatchlistItem,
    },
};

pub async fn ping() -> Json<Value> {
    Json(json!({ "message": "Server running" }))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

pub async fn search_movies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Value>> {
    let keyword = query.q.trim();
    if keyword.is_empty() {
        return Err(AppError::BadRequest("query parameter 'q' is required".to_string()));
    }

    let results = state.movies.search(keyword).await?;
    Ok(Json(json!({ "results": results })))
}

pub async fn movie_detail(
    State(state): State<Arc<AppState>>,
    Path(imdb_id): Path<String>,
) -> AppResult<Json<SourcedMovie>> {
    Ok(Json(state.movies.get_detail(imdb_id.trim()).await?))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let name = req.name.trim();
    let email = req.email.trim();

    if name.is_empty() || email.is_empty() {
        return Err(AppError::BadRequest("name and email are required".to_string()));
    }

    let user_id = state.store.create_user(name, email).await?;
    tracing::info!(user_id, "user created");
    Ok((StatusCode::CREATED, Json(json!({ "user_id": user_id }))))
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    #[serde(default)]
    email: String,
}

pub async fn find_user_by_email(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EmailQuery>,
) -> AppResult<Json<User>> {
    let email = query.email.trim();
    if email.is_empty() {
        return Err(AppError::BadRequest("query parameter 'email' is required".to_string()));
    }

    Ok(Json(state.store.get_user_by_email(email).await?))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<User>> {
    Ok(Json(state.store.get_user_by_id(id).await?))
}

pub async fn add_to_watchlist(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddToWatchlistRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let imdb_id = req.imdb_id.trim();
    if imdb_id.is_empty() {
        return Err(AppError::BadRequest("imdb_id is required".to_string()));
    }

    let watchlist_id = state.watchlist.add(req.user_id, imdb_id, req.status).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Added to watchlist successfully",
            "watchlist_id": watchlist_id,
        })),
    ))
}

pub async fn user_watchlist(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<WatchlistItem>>> {
    Ok(Json(state.store.list_watchlist(user_id).await?))
}

pub async fn update_watchlist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateWatchlistRequest>,
) -> AppResult<Json<Value>> {
    let rating = req.rating()?;
    let updated = state.store.update_watchlist_entry(id, req.status, rating).await?;
    Ok(Json(json!({ "message": "Updated successfully", "updated": updated })))
}

pub async fn delete_watchlist_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<Value>> {
    if state.store.delete_watchlist_entry(id).await? == 0 {
        return Err(AppError::NotFound(format!("watchlist item {id}")));
    }
    Ok(Json(json!({ "message": "Watchlist item deleted successfully" })))
}

pub async fn clear_user_watchlist(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Value>> {
    let deleted = state.store.delete_all_watchlist_entries(user_id).await?;
    tracing::info!(user_id, deleted, "watchlist cleared");
    Ok(Json(json!({ "message": "Watchlist cleared successfully", "deleted_count": deleted })))
}
