//! The module contains the currency record and its entity mapping.
//!
//! Exchange rates are expressed against the main currency: a currency's
//! `exchange_rate` is the number of main-currency units bought by one unit of
//! this currency. The main currency itself is the one whose rate is exactly
//! `1.0`; conversion and rebasing math lives in [`crate::rates`].

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};

use crate::record::Record;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "currencies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub position: i32,
    pub title: String,
    pub exchange_rate: f64,
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

    /// Whether this currency is the pivot all rates are expressed against.
    pub fn is_main(&self) -> bool {
        !self.is_deleted() && self.exchange_rate == 1.0
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Record for Entity {
    const KIND: &'static str = "currency";

    fn id_column() -> Self::Column {
        Column::Id
    }

    fn position_column() -> Self::Column {
        Column::Position
    }

    fn title_column() -> Option<Self::Column> {
        Some(Column::Title)
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
