use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    error::{AppError, AppResult},
    models::{MovieDetail, MovieSource, MovieSummary, SourcedMovie},
    omdb::OmdbClient,
    store::Store,
};

/// Serves movie details from the local store, falling back to OMDb and
/// caching the result on a miss. Cached rows never expire.
#[derive(Clone)]
pub struct MovieService {
    store: Store,
    omdb: Arc<OmdbClient>,
}

impl MovieService {
    pub fn new(store: Store, omdb: Arc<OmdbClient>) -> Self {
        Self { store, omdb }
    }

    pub async fn search(&self, keyword: &str) -> AppResult<Vec<MovieSummary>> {
        let results = self.omdb.search(keyword).await?;
        debug!(keyword = %keyword, result_count = results.len(), "searched provider");
        Ok(results)
    }

    pub async fn get_detail(&self, imdb_id: &str) -> AppResult<SourcedMovie> {
        if let Some(movie) = self.store.get_movie(imdb_id).await? {
            debug!(imdb_id = %imdb_id, "movie served from cache");
            return Ok(SourcedMovie { source: MovieSource::Database, movie });
        }

        debug!(imdb_id = %imdb_id, "cache miss, fetching from provider");
        let movie = self.fetch_and_cache(imdb_id).await?;
        Ok(SourcedMovie { source: MovieSource::Omdb, movie })
    }

    /// Fetches the movie from OMDb and persists it. The detail is only
    /// returned once the row is written.
    ///
    /// The row is keyed by the requested id even when OMDb answers with a
    /// differently spelled one, so the next lookup for `imdb_id` hits.
    pub async fn fetch_and_cache(&self, imdb_id: &str) -> AppResult<MovieDetail> {
        let mut movie = self.omdb.fetch_detail(imdb_id).await?;
        if movie.imdb_id != imdb_id {
            warn!(
                requested = %imdb_id,
                returned = %movie.imdb_id,
                "provider returned a different imdb id, caching under the requested one"
            );
            movie.imdb_id = imdb_id.to_string();
        }

        self.store.upsert_movie(&movie).await.map_err(|err| AppError::CacheWrite {
            imdb_id: imdb_id.to_string(),
            source: Box::new(err),
        })?;

        debug!(imdb_id = %imdb_id, title = %movie.title, "movie cached");
        Ok(movie)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectionTrait, EntityTrait, Statement};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, query_param},
    };

    use super::*;
    use crate::{entities::movie, test_support};

    async fn service(server: &MockServer) -> MovieService {
        let store = test_support::memory_store().await;
        MovieService::new(store, Arc::new(test_support::omdb_client(server)))
    }

    #[tokio::test]
    async fn miss_fetches_once_then_serves_locally() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("i", "tt0111161"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(test_support::omdb_detail_json("tt0111161")),
            )
            .expect(1)
            .mount(&server)
            .await;
        let movies = service(&server).await;

        let first = movies.get_detail("tt0111161").await.unwrap();
        let second = movies.get_detail("tt0111161").await.unwrap();

        assert_eq!(first.source, MovieSource::Omdb);
        assert_eq!(second.source, MovieSource::Database);
        assert_eq!(
            serde_json::to_vec(&first.movie).unwrap(),
            serde_json::to_vec(&second.movie).unwrap()
        );
    }

    #[tokio::test]
    async fn provider_failure_caches_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Response": "False",
                "Error": "Incorrect IMDb ID."
            })))
            .mount(&server)
            .await;
        let movies = service(&server).await;

        let err = movies.get_detail("tt9999999").await.unwrap_err();

        assert!(matches!(err, AppError::Provider(_)));
        let rows = movie::Entity::find().all(movies.store.db()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn persistence_failure_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(test_support::omdb_detail_json("tt0111161")),
            )
            .mount(&server)
            .await;
        let movies = service(&server).await;
        movies
            .store
            .db()
            .execute(Statement::from_string(
                movies.store.db().get_database_backend(),
                "CREATE TRIGGER reject_movies BEFORE INSERT ON movies \
                 BEGIN SELECT RAISE(ABORT, 'read only'); END"
                    .to_string(),
            ))
            .await
            .unwrap();

        let err = movies.get_detail("tt0111161").await.unwrap_err();

        assert!(matches!(err, AppError::CacheWrite { ref imdb_id, .. } if imdb_id == "tt0111161"));
    }

    #[tokio::test]
    async fn lookup_failure_is_not_treated_as_a_miss() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(test_support::omdb_detail_json("tt0111161")),
            )
            .expect(0)
            .mount(&server)
            .await;
        let movies = service(&server).await;
        let db = movies.store.db();
        for sql in ["PRAGMA foreign_keys = OFF", "DROP TABLE movies"] {
            db.execute(Statement::from_string(db.get_database_backend(), sql.to_string()))
                .await
                .unwrap();
        }

        let err = movies.get_detail("tt0111161").await.unwrap_err();

        assert!(matches!(err, AppError::Database(_)), "{err:?}");
    }

    #[tokio::test]
    async fn canonicalized_id_is_cached_under_the_requested_one() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("i", "TT0111161"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(test_support::omdb_detail_json("tt0111161")),
            )
            .expect(1)
            .mount(&server)
            .await;
        let movies = service(&server).await;

        let first = movies.get_detail("TT0111161").await.unwrap();
        let second = movies.get_detail("TT0111161").await.unwrap();

        assert_eq!(first.source, MovieSource::Omdb);
        assert_eq!(first.movie.imdb_id, "TT0111161");
        assert_eq!(second.source, MovieSource::Database);
    }
}
