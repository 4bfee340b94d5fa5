use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Prefs::Table)
                    .if_not_exists()
                    .col(string(Prefs::Key).primary_key())
                    .col(string(Prefs::Value))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Prefs::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Prefs {
    Table,
    Key,
    Value,
}
