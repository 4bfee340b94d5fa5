use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(pk_auto(Movies::Id))
                    .col(big_integer(Movies::DbId).unique_key())
                    .col(string(Movies::Title))
                    .col(string_null(Movies::ReleaseDate))
                    .col(double(Movies::VoteAverage))
                    .col(string_null(Movies::Plot))
                    .col(string_null(Movies::Poster))
                    .col(string_null(Movies::Backdrop))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(pk_auto(Reviews::Id))
                    .col(big_integer(Reviews::MovieId))
                    .col(string(Reviews::Author))
                    .col(string(Reviews::Content))
                    .col(string_null(Reviews::Url))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_movie_id")
                            .from(Reviews::Table, Reviews::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_movie_id")
                    .table(Reviews::Table)
                    .col(Reviews::MovieId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Videos::Table)
                    .if_not_exists()
                    .col(pk_auto(Videos::Id))
                    .col(big_integer(Videos::MovieId))
                    .col(string(Videos::Name))
                    .col(string(Videos::Key))
                    .col(string(Videos::Site))
                    .col(integer(Videos::Size))
                    .col(string(Videos::Type))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_videos_movie_id")
                            .from(Videos::Table, Videos::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_videos_movie_id")
                    .table(Videos::Table)
                    .col(Videos::MovieId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Videos::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Reviews::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    DbId,
    Title,
    ReleaseDate,
    VoteAverage,
    Plot,
    Poster,
    Backdrop,
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    MovieId,
    Author,
    Content,
    Url,
}

#[derive(DeriveIden)]
enum Videos {
    Table,
    Id,
    MovieId,
    Name,
    Key,
    Site,
    Size,
    Type,
}
