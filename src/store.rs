use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    sea_query::{Expr, OnConflict},
};

use crate::{
    entities::{movie, user, watchlist},
    error::{AppError, AppResult},
    models::{MovieDetail, Rating, User, WatchStatus, WatchlistItem},
};

#[derive(Clone)]
pub struct Store {
    db: DatabaseConnection,
}

impl Store {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn get_movie(&self, imdb_id: &str) -> AppResult<Option<MovieDetail>> {
        let movie = movie::Entity::find()
            .filter(movie::Column::ImdbId.eq(imdb_id))
            .one(&self.db)
            .await?;
        Ok(movie.map(MovieDetail::from))
    }

    /// Inserts the movie or overwrites every column of the existing row with
    /// the same IMDb id. The internal id is kept so watchlist rows stay valid.
    pub async fn upsert_movie(&self, detail: &MovieDetail) -> AppResult<()> {
        let model = movie::ActiveModel {
            id: Default::default(),
            imdb_id: Set(detail.imdb_id.clone()),
            title: Set(detail.title.clone()),
            year: Set(detail.year.clone()),
            rated: Set(detail.rated.clone()),
            released: Set(detail.released.clone()),
            runtime: Set(detail.runtime.clone()),
            genre: Set(detail.genre.clone()),
            director: Set(detail.director.clone()),
            writer: Set(detail.writer.clone()),
            actors: Set(detail.actors.clone()),
            plot: Set(detail.plot.clone()),
            language: Set(detail.language.clone()),
            country: Set(detail.country.clone()),
            awards: Set(detail.awards.clone()),
            poster: Set(detail.poster.clone()),
            imdb_rating: Set(detail.imdb_rating.clone()),
            imdb_votes: Set(detail.imdb_votes.clone()),
            media_type: Set(detail.media_type.clone()),
            cached_at: Set(now_sec()),
        };

        movie::Entity::insert(model)
            .on_conflict(
                OnConflict::column(movie::Column::ImdbId)
                    .update_columns([
                        movie::Column::Title,
                        movie::Column::Year,
                        movie::Column::Rated,
                        movie::Column::Released,
                        movie::Column::Runtime,
                        movie::Column::Genre,
                        movie::Column::Director,
                        movie::Column::Writer,
                        movie::Column::Actors,
                        movie::Column::Plot,
                        movie::Column::Language,
                        movie::Column::Country,
                        movie::Column::Awards,
                        movie::Column::Poster,
                        movie::Column::ImdbRating,
                        movie::Column::ImdbVotes,
                        movie::Column::MediaType,
                        movie::Column::CachedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    pub async fn create_user(&self, name: &str, email: &str) -> AppResult<i32> {
        let model = user::ActiveModel {
            id: Default::default(),
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            created_at: Set(now_sec()),
        };

        let res = user::Entity::insert(model).exec(&self.db).await?;
        Ok(res.last_insert_id)
    }

    pub async fn get_user_by_id(&self, id: i32) -> AppResult<User> {
        let user = user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;
        user.try_into()
    }

    pub async fn get_user_by_email(&self, email: &str) -> AppResult<User> {
        let user = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user with email {email}")))?;
        user.try_into()
    }

    pub async fn watchlist_entry_exists(&self, user_id: i32, imdb_id: &str) -> AppResult<bool> {
        let count = watchlist::Entity::find()
            .inner_join(movie::Entity)
            .filter(watchlist::Column::UserId.eq(user_id))
            .filter(movie::Column::ImdbId.eq(imdb_id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// Fails with [`AppError::MovieNotCached`] when `imdb_id` has no row in
    /// `movies` yet.
    pub async fn add_watchlist_entry(
        &self,
        user_id: i32,
        imdb_id: &str,
        status: WatchStatus,
    ) -> AppResult<i32> {
        let movie_id: Option<i32> = movie::Entity::find()
            .select_only()
            .column(movie::Column::Id)
            .filter(movie::Column::ImdbId.eq(imdb_id))
            .into_tuple()
            .one(&self.db)
            .await?;

        let Some(movie_id) = movie_id else {
            return Err(AppError::MovieNotCached(imdb_id.to_string()));
        };

        let model = watchlist::ActiveModel {
            id: Default::default(),
            user_id: Set(user_id),
            movie_id: Set(movie_id),
            status: Set(status.as_db_str().to_string()),
            user_rating: Set(None),
            added_at: Set(now_sec()),
        };

        let res = watchlist::Entity::insert(model).exec(&self.db).await?;
        Ok(res.last_insert_id)
    }

    pub async fn list_watchlist(&self, user_id: i32) -> AppResult<Vec<WatchlistItem>> {
        let rows = watchlist::Entity::find()
            .select_only()
            .column_as(watchlist::Column::Id, "watchlist_id")
            .column_as(movie::Column::ImdbId, "imdb_id")
            .column_as(movie::Column::Title, "title")
            .column_as(movie::Column::Year, "year")
            .column_as(movie::Column::Poster, "poster")
            .column_as(watchlist::Column::Status, "status")
            .column_as(watchlist::Column::UserRating, "user_rating")
            .column_as(watchlist::Column::AddedAt, "added_at")
            .join(JoinType::InnerJoin, watchlist::Relation::Movie.def())
            .filter(watchlist::Column::UserId.eq(user_id))
            .order_by_asc(watchlist::Column::Id)
            .into_model::<WatchlistRow>()
            .all(&self.db)
            .await?;

        rows.into_iter().map(WatchlistItem::try_from).collect()
    }

    /// Overwrites status and rating. A missing entry updates nothing and is
    /// not an error; the affected row count is returned.
    pub async fn update_watchlist_entry(
        &self,
        entry_id: i32,
        status: WatchStatus,
        rating: Option<Rating>,
    ) -> AppResult<u64> {
        let res = watchlist::Entity::update_many()
            .col_expr(watchlist::Column::Status, Expr::value(status.as_db_str()))
            .col_expr(watchlist::Column::UserRating, Expr::value(rating.map(Rating::get)))
            .filter(watchlist::Column::Id.eq(entry_id))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected)
    }

    pub async fn delete_watchlist_entry(&self, entry_id: i32) -> AppResult<u64> {
        let res = watchlist::Entity::delete_by_id(entry_id).exec(&self.db).await?;
        Ok(res.rows_affected)
    }

    pub async fn delete_all_watchlist_entries(&self, user_id: i32) -> AppResult<u64> {
        let res = watchlist::Entity::delete_many()
            .filter(watchlist::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected)
    }
}

#[derive(Debug, FromQueryResult)]
struct WatchlistRow {
    watchlist_id: i32,
    imdb_id: String,
    title: String,
    year: String,
    poster: String,
    status: String,
    user_rating: Option<i32>,
    added_at: i64,
}

impl TryFrom<WatchlistRow> for WatchlistItem {
    type Error = AppError;

    fn try_from(row: WatchlistRow) -> Result<Self, Self::Error> {
        let status = WatchStatus::from_db_str(&row.status).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "watchlist entry {} has unknown status {:?}",
                row.watchlist_id,
                row.status
            ))
        })?;

        Ok(Self {
            watchlist_id: row.watchlist_id,
            imdb_id: row.imdb_id,
            title: row.title,
            year: row.year,
            poster: row.poster,
            status,
            user_rating: row.user_rating,
            added_at: jiff::Timestamp::from_second(row.added_at)?,
        })
    }
}

fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}
