//! The module contains the account record and its entity mapping.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, record::Record};

/// The kind of an account.
///
/// Accounts of the same kind share one dense ordering sequence; the kind is
/// stored as a string in the database.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Current,
    Savings,
    Credit,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Savings => "savings",
            Self::Credit => "credit",
        }
    }
}

impl TryFrom<&str> for AccountKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "current" => Ok(Self::Current),
            "savings" => Ok(Self::Savings),
            "credit" => Ok(Self::Credit),
            other => Err(EngineError::Validation(format!(
                "unknown account kind '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub position: i32,
    pub title: String,
    pub kind: String,
    pub amount: i64,
    pub currency_id: i32,
    pub closed: bool,
    pub create_time: DateTimeUtc,
    pub update_time: Option<DateTimeUtc>,
    pub delete_time: Option<DateTimeUtc>,
    pub created_by: String,
    pub updated_by: Option<String>,
    pub deleted_by: Option<String>,
}

impl Model {
    pub fn kind(&self) -> ResultEngine<AccountKind> {
        AccountKind::try_from(self.kind.as_str())
    }

    pub fn is_deleted(&self) -> bool {
        self.delete_time.is_some()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::currencies::Entity",
        from = "Column::CurrencyId",
        to = "super::currencies::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Currencies,
}

impl Related<super::currencies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Currencies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Record for Entity {
    const KIND: &'static str = "account";

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
