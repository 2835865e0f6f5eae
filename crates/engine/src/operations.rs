//! The module contains the operation record and its entity mapping.
//!
//! An operation is a single ledger movement: money coming into an account,
//! leaving it, or moving between two accounts. Transfers carry a second leg
//! in the `to_*` columns; the three are set together or not at all.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, record::Record};

/// The kind of a ledger operation.
///
/// Categories only use the income and expense sides; `Transfer` is valid for
/// operations alone.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Income,
    Expense,
    Transfer,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl TryFrom<&str> for OperationKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            other => Err(EngineError::Validation(format!(
                "unknown operation kind '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "operations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub position: i32,
    pub kind: String,
    pub occurred_at: DateTimeUtc,
    pub amount: i64,
    pub note: Option<String>,
    pub category_id: i32,
    pub account_id: i32,
    pub currency_id: i32,
    pub to_account_id: Option<i32>,
    pub to_currency_id: Option<i32>,
    pub to_amount: Option<i64>,
    pub create_time: DateTimeUtc,
    pub update_time: Option<DateTimeUtc>,
    pub delete_time: Option<DateTimeUtc>,
    pub created_by: String,
    pub updated_by: Option<String>,
    pub deleted_by: Option<String>,
}

impl Model {
    pub fn kind(&self) -> ResultEngine<OperationKind> {
        OperationKind::try_from(self.kind.as_str())
    }

    pub fn is_deleted(&self) -> bool {
        self.delete_time.is_some()
    }

    pub fn is_transfer(&self) -> bool {
        self.kind == OperationKind::Transfer.as_str()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
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

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
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
    const KIND: &'static str = "operation";

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
