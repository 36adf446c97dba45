use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Watchlist::Table)
                    .if_not_exists()
                    .col(pk_auto(Watchlist::Id))
                    .col(integer(Watchlist::UserId))
                    .col(integer(Watchlist::MovieId))
                    .col(
                        string(Watchlist::Status)
                            .check(Expr::col(Watchlist::Status).is_in(["WATCHLIST", "WATCHED"])),
                    )
                    .col(
                        integer_null(Watchlist::UserRating)
                            .check(Expr::col(Watchlist::UserRating).between(1, 5)),
                    )
                    .col(big_integer(Watchlist::AddedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watchlist_user")
                            .from(Watchlist::Table, Watchlist::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watchlist_movie")
                            .from(Watchlist::Table, Watchlist::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_watchlist_user_movie")
                    .table(Watchlist::Table)
                    .col(Watchlist::UserId)
                    .col(Watchlist::MovieId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Watchlist::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Watchlist {
    Table,
    Id,
    UserId,
    MovieId,
    Status,
    UserRating,
    AddedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
}
