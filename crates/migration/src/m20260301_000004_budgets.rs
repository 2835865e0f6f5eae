use sea_orm_migration::prelude::*;

use crate::m20260301_000001_currencies::Currencies;
use crate::m20260301_000003_categories::Categories;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(crate) enum Budgets {
    Table,
    Id,
    Position,
    CategoryId,
    Amount,
    CurrencyId,
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
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Budgets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Budgets::Position).integer().not_null())
                    .col(ColumnDef::new(Budgets::CategoryId).integer())
                    .col(
                        ColumnDef::new(Budgets::Amount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Budgets::CurrencyId).integer().not_null())
                    .col(ColumnDef::new(Budgets::CreateTime).timestamp().not_null())
                    .col(ColumnDef::new(Budgets::UpdateTime).timestamp())
                    .col(ColumnDef::new(Budgets::DeleteTime).timestamp())
                    .col(ColumnDef::new(Budgets::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Budgets::UpdatedBy).string())
                    .col(ColumnDef::new(Budgets::DeletedBy).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budgets-category_id")
                            .from(Budgets::Table, Budgets::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budgets-currency_id")
                            .from(Budgets::Table, Budgets::CurrencyId)
                            .to(Currencies::Table, Currencies::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budgets-position")
                    .table(Budgets::Table)
                    .col(Budgets::Position)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await
    }
}
