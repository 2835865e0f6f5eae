use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(crate) enum Categories {
    Table,
    Id,
    Position,
    Title,
    OperationKind,
    Kind,
    ParentId,
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
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Position).integer().not_null())
                    .col(ColumnDef::new(Categories::Title).string().not_null())
                    .col(
                        ColumnDef::new(Categories::OperationKind)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Categories::Kind).string().not_null())
                    .col(ColumnDef::new(Categories::ParentId).integer())
                    .col(
                        ColumnDef::new(Categories::CreateTime)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Categories::UpdateTime).timestamp())
                    .col(ColumnDef::new(Categories::DeleteTime).timestamp())
                    .col(ColumnDef::new(Categories::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Categories::UpdatedBy).string())
                    .col(ColumnDef::new(Categories::DeletedBy).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-parent_id")
                            .from(Categories::Table, Categories::ParentId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-position")
                    .table(Categories::Table)
                    .col(Categories::Position)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-parent_id")
                    .table(Categories::Table)
                    .col(Categories::ParentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await
    }
}
