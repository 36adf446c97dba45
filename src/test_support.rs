use wiremock::MockServer;

use crate::{db, models::MovieDetail, omdb::OmdbClient, store::Store};

pub async fn memory_store() -> Store {
    let db = db::connect_and_migrate("sqlite::memory:").await.expect("in-memory database");
    Store::new(db)
}

pub fn omdb_client(server: &MockServer) -> OmdbClient {
    OmdbClient::new(reqwest::Client::new(), Some("test-key".to_string()), server.uri(), 100)
}

pub fn sample_detail(imdb_id: &str) -> MovieDetail {
    MovieDetail {
        imdb_id: imdb_id.to_string(),
        title: format!("Movie {imdb_id}"),
        year: "1994".to_string(),
        rated: "R".to_string(),
        released: "14 Oct 1994".to_string(),
        runtime: "142 min".to_string(),
        genre: "Drama".to_string(),
        director: "Frank Darabont".to_string(),
        writer: "Stephen King, Frank Darabont".to_string(),
        actors: "Tim Robbins, Morgan Freeman, Bob Gunton".to_string(),
        plot: "Two imprisoned men bond over a number of years.".to_string(),
        language: "English".to_string(),
        country: "United States".to_string(),
        awards: "Nominated for 7 Oscars".to_string(),
        poster: "https://example.com/poster.jpg".to_string(),
        imdb_rating: "9.3".to_string(),
        imdb_votes: "2,900,000".to_string(),
        media_type: "movie".to_string(),
    }
}

/// The OMDb wire form of [`sample_detail`].
pub fn omdb_detail_json(imdb_id: &str) -> serde_json::Value {
    let d = sample_detail(imdb_id);
    serde_json::json!({
        "Title": d.title,
        "Year": d.year,
        "Rated": d.rated,
        "Released": d.released,
        "Runtime": d.runtime,
        "Genre": d.genre,
        "Director": d.director,
        "Writer": d.writer,
        "Actors": d.actors,
        "Plot": d.plot,
        "Language": d.language,
        "Country": d.country,
        "Awards": d.awards,
        "Poster": d.poster,
        "Ratings": [{"Source": "Internet Movie Database", "Value": "9.3/10"}],
        "Metascore": "82",
        "imdbRating": d.imdb_rating,
        "imdbVotes": d.imdb_votes,
        "imdbID": d.imdb_id,
        "Type": d.media_type,
        "Response": "True"
    })
}
