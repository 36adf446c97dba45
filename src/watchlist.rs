use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    models::WatchStatus,
    movies::MovieService,
    store::Store,
};

#[derive(Clone)]
pub struct WatchlistService {
    store: Store,
    movies: MovieService,
}

impl WatchlistService {
    pub fn new(store: Store, movies: MovieService) -> Self {
        Self { store, movies }
    }

    /// Adds `imdb_id` to the user's watchlist, caching the movie first if it
    /// has never been fetched. The insert is retried at most once.
    ///
    /// The existence check only gives a friendlier error; the unique index on
    /// `(user_id, movie_id)` still rejects a concurrent duplicate.
    pub async fn add(&self, user_id: i32, imdb_id: &str, status: WatchStatus) -> AppResult<i32> {
        if self.store.watchlist_entry_exists(user_id, imdb_id).await? {
            return Err(AppError::DuplicateEntry { user_id, imdb_id: imdb_id.to_string() });
        }

        match self.store.add_watchlist_entry(user_id, imdb_id, status).await {
            Err(AppError::MovieNotCached(_)) => {
                debug!(user_id, imdb_id = %imdb_id, "movie not cached, fetching before insert");
                self.movies.fetch_and_cache(imdb_id).await?;
                self.store.add_watchlist_entry(user_id, imdb_id, status).await
            },
            other => other,
        }
    }
}
