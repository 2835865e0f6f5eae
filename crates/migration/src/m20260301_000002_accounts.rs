use sea_orm_migration::prelude::*;

use crate::m20260301_000001_currencies::Currencies;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(crate) enum Accounts {
    Table,
    Id,
    Position,
    Title,
    Kind,
    Amount,
    CurrencyId,
    Closed,
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
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::Position).integer().not_null())
                    .col(ColumnDef::new(Accounts::Title).string().not_null())
                    .col(ColumnDef::new(Accounts::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::Amount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Accounts::CurrencyId).integer().not_null())
                    .col(
                        ColumnDef::new(Accounts::Closed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Accounts::CreateTime)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Accounts::UpdateTime).timestamp())
                    .col(ColumnDef::new(Accounts::DeleteTime).timestamp())
                    .col(ColumnDef::new(Accounts::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Accounts::UpdatedBy).string())
                    .col(ColumnDef::new(Accounts::DeletedBy).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-currency_id")
                            .from(Accounts::Table, Accounts::CurrencyId)
                            .to(Currencies::Table, Currencies::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-kind-position")
                    .table(Accounts::Table)
                    .col(Accounts::Kind)
                    .col(Accounts::Position)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-currency_id")
                    .table(Accounts::Table)
                    .col(Accounts::CurrencyId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await
    }
}
