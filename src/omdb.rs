use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    error::{AppError, AppResult},
    models::{MovieDetail, MovieSummary},
};

pub struct OmdbClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl OmdbClient {
    pub fn new(
        client: reqwest::Client,
        api_key: Option<String>,
        base_url: String,
        rps: u32,
    ) -> Self {
        if api_key.is_none() {
            tracing::warn!("no OMDB_API_KEY provided, movie detail lookups will fail");
        }

        let quota = Quota::per_second(NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN));
        let limiter = Arc::new(RateLimiter::direct(quota));
        Self { client, api_key, base_url, limiter }
    }

    pub async fn search(&self, keyword: &str) -> AppResult<Vec<MovieSummary>> {
        let api_key = self.api_key.as_deref().unwrap_or_default();
        let resp: SearchResponse = self.get(&[("apikey", api_key), ("s", keyword)]).await?;
        Ok(resp.search.into_iter().map(MovieSummary::from).collect())
    }

    pub async fn fetch_detail(&self, imdb_id: &str) -> AppResult<MovieDetail> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(AppError::Configuration("OMDb API key not configured".to_string()));
        };

        let resp: DetailResponse =
            self.get(&[("apikey", api_key), ("i", imdb_id), ("plot", "full")]).await?;
        Ok(resp.into())
    }

    /// Sends one request and unwraps the `Response`/`Error` envelope. Error
    /// statuses are not rejected up front because OMDb reports a bad key as a
    /// 401 that still carries the envelope.
    async fn get<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> AppResult<T> {
        self.limiter.until_ready().await;

        let resp = self.client.get(&self.base_url).query(params).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        let value: serde_json::Value = serde_json::from_str(&body).map_err(|err| {
            AppError::Provider(format!("malformed response (HTTP {status}): {err}"))
        })?;

        if value.get("Response").and_then(|v| v.as_str()) == Some("False") {
            let message = value
                .get("Error")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown provider error")
                .to_string();
            tracing::debug!(%status, %message, "provider signalled failure");
            return Err(AppError::Provider(message));
        }

        serde_json::from_value(value)
            .map_err(|err| AppError::Provider(format!("malformed response: {err}")))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "Search", default)]
    search: Vec<SearchMovie>,
}

#[derive(Debug, Deserialize)]
struct SearchMovie {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Type", default)]
    type_: String,
    #[serde(rename = "Poster", default)]
    poster: String,
}

impl From<SearchMovie> for MovieSummary {
    fn from(m: SearchMovie) -> Self {
        Self {
            title: m.title,
            year: m.year,
            imdb_id: m.imdb_id,
            media_type: m.type_,
            poster: m.poster,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DetailResponse {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    title: String,
    #[serde(default)]
    year: String,
    #[serde(default)]
    rated: String,
    #[serde(default)]
    released: String,
    #[serde(default)]
    runtime: String,
    #[serde(default)]
    genre: String,
    #[serde(default)]
    director: String,
    #[serde(default)]
    writer: String,
    #[serde(default)]
    actors: String,
    #[serde(default)]
    plot: String,
    #[serde(default)]
    language: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    awards: String,
    #[serde(default)]
    poster: String,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: String,
    #[serde(rename = "imdbVotes", default)]
    imdb_votes: String,
    #[serde(rename = "Type", default)]
    type_: String,
}

impl From<DetailResponse> for MovieDetail {
    fn from(d: DetailResponse) -> Self {
        Self {
            imdb_id: d.imdb_id,
            title: d.title,
            year: d.year,
            rated: d.rated,
            released: d.released,
            runtime: d.runtime,
            genre: d.genre,
            director: d.director,
            writer: d.writer,
            actors: d.actors,
            plot: d.plot,
            language: d.language,
            country: d.country,
            awards: d.awards,
            poster: d.poster,
            imdb_rating: d.imdb_rating,
            imdb_votes: d.imdb_votes,
            media_type: d.type_,
        }
    }
}
