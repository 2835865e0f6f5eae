//! The module contains the budget record and its entity mapping.
//!
//! A budget caps spending in a currency, either globally or for one
//! category when `category_id` is set.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};

use crate::record::Record;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub position: i32,
    pub category_id: Option<i32>,
    pub amount: i64,
    pub currency_id: i32,
    pub create_time: DateTimeUtc,
    pub update_time: Option<DateTimeUtc>,
    pub delete_time: Option<DateTimeUtc>,
    pub created_by: String,
    pub updated_by: Option<String>,
    pub deleted_by: Option<String>,
}

impl Model {
    pub fn is_deleted(&self) -> bool {
        self.delete_time.is_some()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Categories,
    #[sea_orm(
        belongs_to = "super::currencies::Entity",
        from = "Column::CurrencyId",
        to = "super::currencies::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Currencies,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::currencies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Currencies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Record for Entity {
    const KIND: &'static str = "budget";

    fn id_column() -> Self::Column {
        Column::Id
    }

    fn position_column() -> Self::Column {
        Column::Position
    }

    fn title_column() -> Option<Self::Column> {
        None
    }

    fn update_time_column() -> Self::Column {
        Column::UpdateTime
    }

    fn updated_by_column() -> Self::Column {
        Column::UpdatedBy
    }

    fn delete_time_column() -> Self::Column {
        Column::DeleteTime
    }

    fn deleted_by_column() -> Self::Column {
        Column::DeletedBy
    }

    fn id_of(model: &Self::Model) -> i32 {
        model.id
    }

    fn position_of(model: &Self::Model) -> i32 {
        model.position
    }

    fn is_deleted(model: &Self::Model) -> bool {
        model.is_deleted()
    }

    fn stamp_create(model: &mut Self::ActiveModel, position: i32, now: DateTime<Utc>, actor: &str) {
        model.position = ActiveValue::Set(position);
        model.create_time = ActiveValue::Set(now);
        model.created_by = ActiveValue::Set(actor.to_string());
    }

    fn stamp_update(model: &mut Self::ActiveModel, now: DateTime<Utc>, actor: &str) {
        model.update_time = ActiveValue::Set(Some(now));
        model.updated_by = ActiveValue::Set(Some(actor.to_string()));
    }
}
