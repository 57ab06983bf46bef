use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SearchHistory::Table)
                    .col(
                        ColumnDef::new(SearchHistory::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key()
                            .to_owned(),
                    )
                    .col(
                        ColumnDef::new(SearchHistory::CveId)
                            .string()
                            .not_null()
                            .to_owned(),
                    )
                    .col(ColumnDef::new(SearchHistory::Description).string().to_owned())
                    .col(
                        ColumnDef::new(SearchHistory::SearchTime)
                            .timestamp_with_time_zone()
                            .not_null()
                            .to_owned(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(SearchHistory::Table)
                    .col(SearchHistory::CveId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(SearchHistory::Table)
                    .col(SearchHistory::SearchTime)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(SearchHistory::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum SearchHistory {
    Table,
    Id,
    CveId,
    Description,
    SearchTime,
}
