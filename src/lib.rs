pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod extract;
pub mod models;
pub mod movies;
pub mod omdb;
pub mod routes;
pub mod store;
pub mod watchlist;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config, movies::MovieService, omdb::OmdbClient, store::Store,
    watchlist::WatchlistService,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub movies: MovieService,
    pub watchlist: WatchlistService,
}

impl AppState {
    pub fn new(config: &Config, store: Store, http: reqwest::Client) -> Self {
        let omdb = OmdbClient::new(
            http,
            config.omdb_api_key.clone(),
            config.omdb_base_url.clone(),
            config.omdb_rps,
        );
        let movies = MovieService::new(store.clone(), Arc::new(omdb));
        let watchlist = WatchlistService::new(store.clone(), movies.clone());

        Self { store, movies, watchlist }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", get(routes::ping))
        .route("/movies/search", get(routes::search_movies))
        .route("/movies/{imdb_id}", get(routes::movie_detail))
        .route("/users", post(routes::create_user).get(routes::find_user_by_email))
        .route("/users/{id}", get(routes::get_user))
        .route(
            "/users/{id}/watchlist",
            get(routes::user_watchlist).delete(routes::clear_user_watchlist),
        )
        .route("/watchlist", post(routes::add_to_watchlist))
        .route(
            "/watchlist/{id}",
            put(routes::update_watchlist).delete(routes::delete_watchlist_item),
        )
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)),
        )
}
