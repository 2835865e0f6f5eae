use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, Condition, ConnectionTrait, TransactionTrait, prelude::*};

use crate::{
    EngineError, ResultEngine, accounts, categories, currencies,
    operations::{self, OperationKind},
    rates,
    record::Scope,
};

use super::{
    Engine, EntityState, count_records, lifecycle, list_records, normalize_optional_text,
    positions, require_active_record, require_record, with_tx,
};

/// The second leg of a transfer.
///
/// `to_amount` may be left out; it is then computed from the operation
/// amount via the exchange-rate table.
#[derive(Clone, Copy, Debug)]
pub struct TransferLeg {
    pub to_account_id: i32,
    pub to_currency_id: i32,
    pub to_amount: Option<i64>,
}

/// Fields required to create an operation.
#[derive(Clone, Debug)]
pub struct NewOperation {
    pub kind: OperationKind,
    pub occurred_at: DateTime<Utc>,
    pub amount: i64,
    pub note: Option<String>,
    pub category_id: i32,
    pub account_id: i32,
    pub currency_id: i32,
    pub transfer: Option<TransferLeg>,
}

/// Field updates for an operation.
///
/// `note` is doubly optional: `None` keeps the current note, `Some(None)`
/// clears it.
#[derive(Clone, Debug, Default)]
pub struct OperationChanges {
    pub occurred_at: Option<DateTime<Utc>>,
    pub amount: Option<i64>,
    pub note: Option<Option<String>>,
    pub category_id: Option<i32>,
}

/// Listing filter for operations.
#[derive(Clone, Copy, Debug, Default)]
pub struct OperationFilter {
    pub state: EntityState,
    pub kind: Option<OperationKind>,
    pub account_id: Option<i32>,
    pub category_id: Option<i32>,
    pub currency_id: Option<i32>,
    pub occurred_from: Option<DateTime<Utc>>,
    pub occurred_until: Option<DateTime<Utc>>,
}

impl OperationFilter {
    fn condition(&self) -> Condition {
        let mut condition = self.state.condition::<operations::Entity>();
        if let Some(kind) = self.kind {
            condition = condition.add(operations::Column::Kind.eq(kind.as_str()));
        }
        if let Some(account_id) = self.account_id {
            condition = condition.add(operations::Column::AccountId.eq(account_id));
        }
        if let Some(category_id) = self.category_id {
            condition = condition.add(operations::Column::CategoryId.eq(category_id));
        }
        if let Some(currency_id) = self.currency_id {
            condition = condition.add(operations::Column::CurrencyId.eq(currency_id));
        }
        if let Some(from) = self.occurred_from {
            condition = condition.add(operations::Column::OccurredAt.gte(from));
        }
        if let Some(until) = self.occurred_until {
            condition = condition.add(operations::Column::OccurredAt.lt(until));
        }
        condition
    }
}

fn require_positive_amount(amount: i64) -> ResultEngine<i64> {
    if amount <= 0 {
        return Err(EngineError::Validation(format!(
            "operation amount must be positive, got {amount}"
        )));
    }
    Ok(amount)
}

/// Resolve and validate the transfer leg, filling `to_amount` from the
/// rate table when the caller left it out.
async fn resolve_transfer_leg(
    db: &impl ConnectionTrait,
    leg: TransferLeg,
    account_id: i32,
    amount: i64,
    currency: &currencies::Model,
) -> ResultEngine<(i32, i32, i64)> {
    if leg.to_account_id == account_id {
        return Err(EngineError::Validation(
            "transfer target account must differ from the source".to_string(),
        ));
    }
    require_active_record::<accounts::Entity>(db, leg.to_account_id).await?;
    let to_currency = require_active_record::<currencies::Entity>(db, leg.to_currency_id).await?;

    let to_amount = match leg.to_amount {
        Some(amount) => require_positive_amount(amount)?,
        None => rates::convert(amount, currency, &to_currency)?,
    };
    Ok((leg.to_account_id, leg.to_currency_id, to_amount))
}

impl Engine {
    /// Record a new operation at the end of the ordering.
    pub async fn new_operation(
        &self,
        new: NewOperation,
        actor: &str,
    ) -> ResultEngine<operations::Model> {
        let amount = require_positive_amount(new.amount)?;
        let note = normalize_optional_text(new.note.as_deref());
        with_tx!(self, |db_tx| {
            require_active_record::<accounts::Entity>(&db_tx, new.account_id).await?;
            require_active_record::<categories::Entity>(&db_tx, new.category_id).await?;
            let currency =
                require_active_record::<currencies::Entity>(&db_tx, new.currency_id).await?;

            let leg = match (new.kind, new.transfer) {
                (OperationKind::Transfer, Some(leg)) => Some(
                    resolve_transfer_leg(&db_tx, leg, new.account_id, amount, &currency).await?,
                ),
                (OperationKind::Transfer, None) => {
                    return Err(EngineError::Validation(
                        "a transfer needs a target account and currency".to_string(),
                    ));
                }
                (_, Some(_)) => {
                    return Err(EngineError::Validation(
                        "only transfers may carry a target leg".to_string(),
                    ));
                }
                (_, None) => None,
            };

            let model = operations::ActiveModel {
                kind: ActiveValue::Set(new.kind.as_str().to_string()),
                occurred_at: ActiveValue::Set(new.occurred_at),
                amount: ActiveValue::Set(amount),
                note: ActiveValue::Set(note.clone()),
                category_id: ActiveValue::Set(new.category_id),
                account_id: ActiveValue::Set(new.account_id),
                currency_id: ActiveValue::Set(new.currency_id),
                to_account_id: ActiveValue::Set(leg.map(|l| l.0)),
                to_currency_id: ActiveValue::Set(leg.map(|l| l.1)),
                to_amount: ActiveValue::Set(leg.map(|l| l.2)),
                ..Default::default()
            };
            let model =
                lifecycle::create(&db_tx, &Scope::<operations::Entity>::all(), model, actor)
                    .await?;
            tracing::debug!(operation_id = model.id, kind = %model.kind, "operation recorded");
            Ok(model)
        })
    }

    /// Return an operation regardless of its lifecycle state.
    pub async fn operation(&self, operation_id: i32) -> ResultEngine<operations::Model> {
        require_record::<operations::Entity>(&self.database, operation_id).await
    }

    /// List operations ordered by position.
    pub async fn operations(
        &self,
        filter: OperationFilter,
    ) -> ResultEngine<Vec<operations::Model>> {
        list_records::<operations::Entity>(&self.database, filter.condition()).await
    }

    pub async fn operation_count(&self, filter: OperationFilter) -> ResultEngine<u64> {
        count_records::<operations::Entity>(&self.database, filter.condition()).await
    }

    /// Apply field changes to an active operation.
    pub async fn update_operation(
        &self,
        operation_id: i32,
        changes: OperationChanges,
        actor: &str,
    ) -> ResultEngine<operations::Model> {
        if let Some(amount) = changes.amount {
            require_positive_amount(amount)?;
        }
        with_tx!(self, |db_tx| {
            require_active_record::<operations::Entity>(&db_tx, operation_id).await?;
            if let Some(category_id) = changes.category_id {
                require_active_record::<categories::Entity>(&db_tx, category_id).await?;
            }

            let mut model = operations::ActiveModel {
                id: ActiveValue::Set(operation_id),
                ..Default::default()
            };
            if let Some(occurred_at) = changes.occurred_at {
                model.occurred_at = ActiveValue::Set(occurred_at);
            }
            if let Some(amount) = changes.amount {
                model.amount = ActiveValue::Set(amount);
            }
            if let Some(note) = changes.note {
                model.note = ActiveValue::Set(normalize_optional_text(note.as_deref()));
            }
            if let Some(category_id) = changes.category_id {
                model.category_id = ActiveValue::Set(category_id);
            }
            let model = lifecycle::update::<operations::Entity>(&db_tx, model, actor).await?;
            Ok(model)
        })
    }

    /// Delete an operation, softly by default or permanently.
    pub async fn delete_operation(
        &self,
        operation_id: i32,
        soft: bool,
        actor: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            if soft {
                let model =
                    require_active_record::<operations::Entity>(&db_tx, operation_id).await?;
                lifecycle::soft_delete(&db_tx, &Scope::<operations::Entity>::all(), &model, actor)
                    .await?;
            } else {
                let model = require_record::<operations::Entity>(&db_tx, operation_id).await?;
                lifecycle::hard_delete(&db_tx, &Scope::<operations::Entity>::all(), &model).await?;
            }
            tracing::debug!(operation_id, soft, "operation deleted");
            Ok(())
        })
    }

    /// Bring a soft-deleted operation back at the end of the ordering.
    pub async fn restore_operation(
        &self,
        operation_id: i32,
        actor: &str,
    ) -> ResultEngine<operations::Model> {
        with_tx!(self, |db_tx| {
            let model = require_record::<operations::Entity>(&db_tx, operation_id).await?;
            lifecycle::restore(&db_tx, &Scope::<operations::Entity>::all(), &model, actor).await?;
            require_record::<operations::Entity>(&db_tx, operation_id).await
        })
    }

    /// Move an operation to `new_position` in the ordering.
    pub async fn change_operation_position(
        &self,
        operation_id: i32,
        new_position: i32,
        actor: &str,
    ) -> ResultEngine<operations::Model> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let model = require_active_record::<operations::Entity>(&db_tx, operation_id).await?;
            positions::move_to(
                &db_tx,
                &Scope::<operations::Entity>::all(),
                model.position,
                new_position,
                now,
                actor,
            )
            .await
        })
    }

    /// Move the operation currently at `old_position`.
    pub async fn change_operation_position_at(
        &self,
        old_position: i32,
        new_position: i32,
        actor: &str,
    ) -> ResultEngine<operations::Model> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            positions::move_to(
                &db_tx,
                &Scope::<operations::Entity>::all(),
                old_position,
                new_position,
                now,
                actor,
            )
            .await
        })
    }
}
