use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Name))
                    .col(string_uniq(Users::Email))
                    .col(big_integer(Users::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(pk_auto(Movies::Id))
                    .col(string_uniq(Movies::ImdbId))
                    .col(string(Movies::Title))
                    .col(string(Movies::Year))
                    .col(string(Movies::Rated))
                    .col(string(Movies::Released))
                    .col(string(Movies::Runtime))
                    .col(string(Movies::Genre))
                    .col(string(Movies::Director))
                    .col(string(Movies::Writer))
                    .col(string(Movies::Actors))
                    .col(text(Movies::Plot))
                    .col(string(Movies::Language))
                    .col(string(Movies::Country))
                    .col(string(Movies::Awards))
                    .col(string(Movies::Poster))
                    .col(string(Movies::ImdbRating))
                    .col(string(Movies::ImdbVotes))
                    .col(string(Movies::Type))
                    .col(big_integer(Movies::CachedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    ImdbId,
    Title,
    Year,
    Rated,
    Released,
    Runtime,
    Genre,
    Director,
    Writer,
    Actors,
    Plot,
    Language,
    Country,
    Awards,
    Poster,
    ImdbRating,
    ImdbVotes,
    Type,
    CachedAt,
}
