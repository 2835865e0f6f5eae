use sea_orm_migration::prelude::*;

use crate::m20260301_000001_currencies::Currencies;
use crate::m20260301_000002_accounts::Accounts;
use crate::m20260301_000003_categories::Categories;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(crate) enum Operations {
    Table,
    Id,
    Position,
    Kind,
    OccurredAt,
    Amount,
    Note,
    CategoryId,
    AccountId,
    CurrencyId,
    ToAccountId,
    ToCurrencyId,
    ToAmount,
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
                    .table(Operations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Operations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Operations::Position).integer().not_null())
                    .col(ColumnDef::new(Operations::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Operations::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Operations::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Operations::Note).string())
                    .col(ColumnDef::new(Operations::CategoryId).integer().not_null())
                    .col(ColumnDef::new(Operations::AccountId).integer().not_null())
                    .col(ColumnDef::new(Operations::CurrencyId).integer().not_null())
                    .col(ColumnDef::new(Operations::ToAccountId).integer())
                    .col(ColumnDef::new(Operations::ToCurrencyId).integer())
                    .col(ColumnDef::new(Operations::ToAmount).big_integer())
                    .col(
                        ColumnDef::new(Operations::CreateTime)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Operations::UpdateTime).timestamp())
                    .col(ColumnDef::new(Operations::DeleteTime).timestamp())
                    .col(ColumnDef::new(Operations::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Operations::UpdatedBy).string())
                    .col(ColumnDef::new(Operations::DeletedBy).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-operations-account_id")
                            .from(Operations::Table, Operations::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-operations-category_id")
                            .from(Operations::Table, Operations::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-operations-currency_id")
                            .from(Operations::Table, Operations::CurrencyId)
                            .to(Currencies::Table, Currencies::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-operations-position")
                    .table(Operations::Table)
                    .col(Operations::Position)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-operations-account_id-occurred_at")
                    .table(Operations::Table)
                    .col(Operations::AccountId)
                    .col(Operations::OccurredAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Operations::Table).to_owned())
            .await
    }
}
