use sea_orm::{
    Condition, ConnectionTrait, DatabaseConnection, PaginatorTrait, QueryFilter, QueryOrder,
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, record::Record};

mod accounts;
mod budgets;
mod categories;
mod currencies;
mod lifecycle;
mod operations;
mod positions;

pub use accounts::{AccountChanges, AccountFilter, NewAccount};
pub use budgets::{BudgetChanges, BudgetFilter, NewBudget};
pub use categories::{CategoryChanges, CategoryFilter, NewCategory};
pub use currencies::{CurrencyChanges, CurrencyFilter, NewCurrency};
pub use operations::{NewOperation, OperationChanges, OperationFilter, TransferLeg};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Which lifecycle states a listing or count should include.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityState {
    #[default]
    Active,
    Deleted,
    All,
}

impl EntityState {
    fn condition<E: Record>(self) -> Condition {
        match self {
            Self::Active => Condition::all().add(E::delete_time_column().is_null()),
            Self::Deleted => Condition::all().add(E::delete_time_column().is_not_null()),
            Self::All => Condition::all(),
        }
    }
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

async fn find_record<E: Record>(
    db: &impl ConnectionTrait,
    id: i32,
) -> ResultEngine<Option<E::Model>> {
    Ok(E::find().filter(E::id_column().eq(id)).one(db).await?)
}

async fn require_record<E: Record>(db: &impl ConnectionTrait, id: i32) -> ResultEngine<E::Model> {
    find_record::<E>(db, id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("{} not exists", E::KIND)))
}

/// Like [`require_record`] but soft-deleted records count as missing.
async fn require_active_record<E: Record>(
    db: &impl ConnectionTrait,
    id: i32,
) -> ResultEngine<E::Model> {
    let model = require_record::<E>(db, id).await?;
    if E::is_deleted(&model) {
        return Err(EngineError::NotFound(format!("{} not exists", E::KIND)));
    }
    Ok(model)
}

async fn list_records<E: Record>(
    db: &impl ConnectionTrait,
    condition: Condition,
) -> ResultEngine<Vec<E::Model>> {
    Ok(E::find()
        .filter(condition)
        .order_by_asc(E::position_column())
        .all(db)
        .await?)
}

async fn count_records<E: Record>(
    db: &impl ConnectionTrait,
    condition: Condition,
) -> ResultEngine<u64>
where
    E::Model: Send + Sync + 'static,
{
    Ok(E::find().filter(condition).count(db).await?)
}

fn normalize_required_title(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!(
            "{label} title must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
