use chrono::Utc;
use sea_orm::{ActiveValue, Condition, TransactionTrait, prelude::*};

use crate::{ResultEngine, budgets, categories, currencies, record::Scope};

use super::{
    Engine, EntityState, count_records, lifecycle, list_records, positions, require_active_record,
    require_record, with_tx,
};

/// Fields required to create a budget.
#[derive(Clone, Debug)]
pub struct NewBudget {
    pub category_id: Option<i32>,
    pub amount: i64,
    pub currency_id: i32,
}

/// Field updates for a budget.
///
/// `category_id` is doubly optional: `None` keeps the current category,
/// `Some(None)` makes the budget global, `Some(Some(id))` binds it.
#[derive(Clone, Debug, Default)]
pub struct BudgetChanges {
    pub category_id: Option<Option<i32>>,
    pub amount: Option<i64>,
    pub currency_id: Option<i32>,
}

/// Listing filter for budgets.
#[derive(Clone, Copy, Debug, Default)]
pub struct BudgetFilter {
    pub state: EntityState,
    pub currency_id: Option<i32>,
    pub category_id: Option<i32>,
}

impl BudgetFilter {
    fn condition(&self) -> Condition {
        let mut condition = self.state.condition::<budgets::Entity>();
        if let Some(currency_id) = self.currency_id {
            condition = condition.add(budgets::Column::CurrencyId.eq(currency_id));
        }
        if let Some(category_id) = self.category_id {
            condition = condition.add(budgets::Column::CategoryId.eq(category_id));
        }
        condition
    }
}

impl Engine {
    /// Add a new budget at the end of the ordering.
    pub async fn new_budget(&self, new: NewBudget, actor: &str) -> ResultEngine<budgets::Model> {
        with_tx!(self, |db_tx| {
            require_active_record::<currencies::Entity>(&db_tx, new.currency_id).await?;
            if let Some(category_id) = new.category_id {
                require_active_record::<categories::Entity>(&db_tx, category_id).await?;
            }

            let model = budgets::ActiveModel {
                category_id: ActiveValue::Set(new.category_id),
                amount: ActiveValue::Set(new.amount),
                currency_id: ActiveValue::Set(new.currency_id),
                ..Default::default()
            };
            let model =
                lifecycle::create(&db_tx, &Scope::<budgets::Entity>::all(), model, actor).await?;
            tracing::debug!(budget_id = model.id, "budget created");
            Ok(model)
        })
    }

    /// Return a budget regardless of its lifecycle state.
    pub async fn budget(&self, budget_id: i32) -> ResultEngine<budgets::Model> {
        require_record::<budgets::Entity>(&self.database, budget_id).await
    }

    /// List budgets ordered by position.
    pub async fn budgets(&self, filter: BudgetFilter) -> ResultEngine<Vec<budgets::Model>> {
        list_records::<budgets::Entity>(&self.database, filter.condition()).await
    }

    pub async fn budget_count(&self, filter: BudgetFilter) -> ResultEngine<u64> {
        count_records::<budgets::Entity>(&self.database, filter.condition()).await
    }

    /// Apply field changes to an active budget.
    pub async fn update_budget(
        &self,
        budget_id: i32,
        changes: BudgetChanges,
        actor: &str,
    ) -> ResultEngine<budgets::Model> {
        with_tx!(self, |db_tx| {
            require_active_record::<budgets::Entity>(&db_tx, budget_id).await?;
            if let Some(currency_id) = changes.currency_id {
                require_active_record::<currencies::Entity>(&db_tx, currency_id).await?;
            }
            if let Some(Some(category_id)) = changes.category_id {
                require_active_record::<categories::Entity>(&db_tx, category_id).await?;
            }

            let mut model = budgets::ActiveModel {
                id: ActiveValue::Set(budget_id),
                ..Default::default()
            };
            if let Some(category_id) = changes.category_id {
                model.category_id = ActiveValue::Set(category_id);
            }
            if let Some(amount) = changes.amount {
                model.amount = ActiveValue::Set(amount);
            }
            if let Some(currency_id) = changes.currency_id {
                model.currency_id = ActiveValue::Set(currency_id);
            }
            let model = lifecycle::update::<budgets::Entity>(&db_tx, model, actor).await?;
            Ok(model)
        })
    }

    /// Delete a budget, softly by default or permanently.
    pub async fn delete_budget(&self, budget_id: i32, soft: bool, actor: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            if soft {
                let model = require_active_record::<budgets::Entity>(&db_tx, budget_id).await?;
                lifecycle::soft_delete(&db_tx, &Scope::<budgets::Entity>::all(), &model, actor)
                    .await?;
            } else {
                let model = require_record::<budgets::Entity>(&db_tx, budget_id).await?;
                lifecycle::hard_delete(&db_tx, &Scope::<budgets::Entity>::all(), &model).await?;
            }
            tracing::debug!(budget_id, soft, "budget deleted");
            Ok(())
        })
    }

    /// Bring a soft-deleted budget back at the end of the ordering.
    pub async fn restore_budget(&self, budget_id: i32, actor: &str) -> ResultEngine<budgets::Model> {
        with_tx!(self, |db_tx| {
            let model = require_record::<budgets::Entity>(&db_tx, budget_id).await?;
            lifecycle::restore(&db_tx, &Scope::<budgets::Entity>::all(), &model, actor).await?;
            require_record::<budgets::Entity>(&db_tx, budget_id).await
        })
    }

    /// Move a budget to `new_position` in the ordering.
    pub async fn change_budget_position(
        &self,
        budget_id: i32,
        new_position: i32,
        actor: &str,
    ) -> ResultEngine<budgets::Model> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let model = require_active_record::<budgets::Entity>(&db_tx, budget_id).await?;
            positions::move_to(
                &db_tx,
                &Scope::<budgets::Entity>::all(),
                model.position,
                new_position,
                now,
                actor,
            )
            .await
        })
    }

    /// Move the budget currently at `old_position`.
    pub async fn change_budget_position_at(
        &self,
        old_position: i32,
        new_position: i32,
        actor: &str,
    ) -> ResultEngine<budgets::Model> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            positions::move_to(
                &db_tx,
                &Scope::<budgets::Entity>::all(),
                old_position,
                new_position,
                now,
                actor,
            )
            .await
        })
    }
}
