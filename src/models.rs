use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    entities::{movie, user},
    error::AppError,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MovieSummary {
    pub title: String,
    pub year: String,
    pub imdb_id: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub poster: String,
}

/// Full provider record for one movie, as cached in the `movies` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MovieDetail {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub rated: String,
    pub released: String,
    pub runtime: String,
    pub genre: String,
    pub director: String,
    pub writer: String,
    pub actors: String,
    pub plot: String,
    pub language: String,
    pub country: String,
    pub awards: String,
    pub poster: String,
    pub imdb_rating: String,
    pub imdb_votes: String,
    #[serde(rename = "type")]
    pub media_type: String,
}

impl From<movie::Model> for MovieDetail {
    fn from(m: movie::Model) -> Self {
        Self {
            imdb_id: m.imdb_id,
            title: m.title,
            year: m.year,
            rated: m.rated,
            released: m.released,
            runtime: m.runtime,
            genre: m.genre,
            director: m.director,
            writer: m.writer,
            actors: m.actors,
            plot: m.plot,
            language: m.language,
            country: m.country,
            awards: m.awards,
            poster: m.poster,
            imdb_rating: m.imdb_rating,
            imdb_votes: m.imdb_votes,
            media_type: m.media_type,
        }
    }
}

/// Where a movie detail was served from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MovieSource {
    Database,
    Omdb,
}

#[derive(Clone, Debug, Serialize)]
pub struct SourcedMovie {
    pub source: MovieSource,
    pub movie: MovieDetail,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WatchStatus {
    #[default]
    Watchlist,
    Watched,
}

impl WatchStatus {
    pub fn as_db_str(self) -> &'static str {
        match self {
            WatchStatus::Watchlist => "WATCHLIST",
            WatchStatus::Watched => "WATCHED",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "WATCHLIST" => Some(WatchStatus::Watchlist),
            "WATCHED" => Some(WatchStatus::Watched),
            _ => None,
        }
    }
}

/// A user rating, always within 1..=5.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Rating(i32);

impl Rating {
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 5;

    pub fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Rating {
    type Error = AppError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(AppError::ConstraintViolation(format!(
                "rating must be between {} and {}, got {value}",
                Self::MIN,
                Self::MAX
            )))
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: Timestamp,
}

impl TryFrom<user::Model> for User {
    type Error = AppError;

    fn try_from(m: user::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            name: m.name,
            email: m.email,
            created_at: Timestamp::from_second(m.created_at)?,
        })
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct WatchlistItem {
    pub watchlist_id: i32,
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
    pub status: WatchStatus,
    pub user_rating: Option<i32>,
    pub added_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct AddToWatchlistRequest {
    pub user_id: i32,
    pub imdb_id: String,
    #[serde(default)]
    pub status: WatchStatus,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWatchlistRequest {
    pub status: WatchStatus,
    pub rating: Option<i32>,
    pub user_rating: Option<i32>,
}

impl UpdateWatchlistRequest {
    /// `user_rating` wins over `rating`; a `user_rating` of 0 counts as unset.
    pub fn rating(&self) -> Result<Option<Rating>, AppError> {
        self.user_rating
            .filter(|r| *r != 0)
            .or(self.rating)
            .map(Rating::try_from)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(body: serde_json::Value) -> UpdateWatchlistRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn user_rating_takes_precedence() {
        let req = update(serde_json::json!({ "status": "WATCHED", "rating": 3, "user_rating": 1 }));
        assert_eq!(req.rating().unwrap().map(Rating::get), Some(1));
    }

    #[test]
    fn zero_user_rating_is_unset() {
        let req = update(serde_json::json!({ "status": "WATCHED", "rating": 5, "user_rating": 0 }));
        assert_eq!(req.rating().unwrap().map(Rating::get), Some(5));

        let req = update(serde_json::json!({ "status": "WATCHED", "user_rating": 0 }));
        assert!(req.rating().unwrap().is_none());
    }

    #[test]
    fn out_of_range_rating_is_a_constraint_violation() {
        let req = update(serde_json::json!({ "status": "WATCHED", "rating": 0 }));
        assert!(matches!(req.rating(), Err(AppError::ConstraintViolation(_))));

        let req = update(serde_json::json!({ "status": "WATCHED", "user_rating": 6 }));
        assert!(matches!(req.rating(), Err(AppError::ConstraintViolation(_))));
    }
}
