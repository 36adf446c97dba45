//! Shared harness for HTTP-level tests.
//!
//! Starts the real router on a random port against an in-memory database,
//! with OMDb pointed at a `wiremock` server owned by the harness.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc};

use reelshelf::{AppState, config::Config, db, router, store::Store};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, query_param},
};

pub struct TestHarness {
    pub addr: SocketAddr,
    pub omdb: MockServer,
    pub client: reqwest::Client,
}

impl TestHarness {
    pub async fn start() -> Self {
        let omdb = MockServer::start().await;
        let config = Config {
            addr: "127.0.0.1:0".parse().expect("valid addr"),
            omdb_api_key: Some("test-key".to_string()),
            omdb_base_url: omdb.uri(),
            omdb_rps: 100,
            database_url: "sqlite::memory:".to_string(),
            http_timeout_secs: 5,
        };

        let db = db::connect_and_migrate(&config.database_url)
            .await
            .expect("failed to create in-memory database");
        let state = AppState::new(&config, Store::new(db), reqwest::Client::new());
        let app = router(Arc::new(state));

        let listener =
            tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { addr, omdb, client: reqwest::Client::new() }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Serves an OMDb detail record for `imdb_id`, expecting exactly `calls`
    /// requests for it over the harness lifetime.
    pub async fn mock_detail(&self, imdb_id: &str, title: &str, calls: u64) {
        Mock::given(method("GET"))
            .and(query_param("i", imdb_id))
            .and(query_param("plot", "full"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Title": title,
                "Year": "1994",
                "Rated": "R",
                "Released": "14 Oct 1994",
                "Runtime": "142 min",
                "Genre": "Drama",
                "Director": "Frank Darabont",
                "Writer": "Stephen King, Frank Darabont",
                "Actors": "Tim Robbins, Morgan Freeman, Bob Gunton",
                "Plot": "Over the course of several years, two convicts form a friendship.",
                "Language": "English",
                "Country": "United States",
                "Awards": "Nominated for 7 Oscars",
                "Poster": "https://example.com/shawshank.jpg",
                "imdbRating": "9.3",
                "imdbVotes": "2,900,000",
                "imdbID": imdb_id,
                "Type": "movie",
                "Response": "True"
            })))
            .expect(calls)
            .mount(&self.omdb)
            .await;
    }

    pub async fn create_user(&self, name: &str, email: &str) -> i64 {
        let resp = self
            .client
            .post(self.url("/users"))
            .json(&serde_json::json!({ "name": name, "email": email }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let json: serde_json::Value = resp.json().await.unwrap();
        json["user_id"].as_i64().unwrap()
    }
}
