use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(crate) enum Currencies {
    Table,
    Id,
    Position,
    Title,
    ExchangeRate,
    CreateTime,
    UpdateTime,
    DeleteTime,
    CreatedBy,
    UpdatedBy,
    DeletedBy,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Currencies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Currencies::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Currencies::Position).integer().not_null())
                    .col(ColumnDef::new(Currencies::Title).string().not_null())
                    .col(
                        ColumnDef::new(Currencies::ExchangeRate)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Currencies::CreateTime)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Currencies::UpdateTime).timestamp())
                    .col(ColumnDef::new(Currencies::DeleteTime).timestamp())
                    .col(ColumnDef::new(Currencies::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Currencies::UpdatedBy).string())
                    .col(ColumnDef::new(Currencies::DeletedBy).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-currencies-position")
                    .table(Currencies::Table)
                    .col(Currencies::Position)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-currencies-title")
                    .table(Currencies::Table)
                    .col(Currencies::Title)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Currencies::Table).to_owned())
            .await
    }
}
