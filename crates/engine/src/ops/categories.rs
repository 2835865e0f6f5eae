use chrono::Utc;
use sea_orm::{ActiveValue, Condition, ConnectionTrait, TransactionTrait, prelude::*};

use crate::{
    EngineError, OperationKind, ResultEngine,
    categories::{self, CategoryKind},
    record::Scope,
};

use super::{
    Engine, EntityState, count_records, lifecycle, list_records, normalize_required_title,
    positions, require_active_record, require_record, with_tx,
};

/// Fields required to create a category.
#[derive(Clone, Debug)]
pub struct NewCategory {
    pub title: String,
    pub operation_kind: OperationKind,
    pub kind: CategoryKind,
    pub parent_id: Option<i32>,
}

/// Field updates for a category.
///
/// `parent_id` is doubly optional: `None` keeps the current parent,
/// `Some(None)` detaches the category, `Some(Some(id))` re-parents it.
#[derive(Clone, Debug, Default)]
pub struct CategoryChanges {
    pub title: Option<String>,
    pub parent_id: Option<Option<i32>>,
}

/// Listing filter for categories.
#[derive(Clone, Copy, Debug, Default)]
pub struct CategoryFilter {
    pub state: EntityState,
    pub operation_kind: Option<OperationKind>,
    pub kind: Option<CategoryKind>,
    pub parent_id: Option<i32>,
}

impl CategoryFilter {
    fn condition(&self) -> Condition {
        let mut condition = self.state.condition::<categories::Entity>();
        if let Some(operation_kind) = self.operation_kind {
            condition = condition.add(categories::Column::OperationKind.eq(operation_kind.as_str()));
        }
        if let Some(kind) = self.kind {
            condition = condition.add(categories::Column::Kind.eq(kind.as_str()));
        }
        if let Some(parent_id) = self.parent_id {
            condition = condition.add(categories::Column::ParentId.eq(parent_id));
        }
        condition
    }
}

fn require_category_operation_kind(kind: OperationKind) -> ResultEngine<OperationKind> {
    if kind == OperationKind::Transfer {
        return Err(EngineError::Validation(
            "category operation kind must be income or expense".to_string(),
        ));
    }
    Ok(kind)
}

/// A parent link must point at an active parent-kind category on the same
/// side of the ledger.
async fn require_parent(
    db: &impl ConnectionTrait,
    parent_id: i32,
    operation_kind: &str,
) -> ResultEngine<()> {
    let parent = require_active_record::<categories::Entity>(db, parent_id).await?;
    if parent.kind()? != CategoryKind::Parent {
        return Err(EngineError::Validation(
            "parent category must be of parent kind".to_string(),
        ));
    }
    if parent.operation_kind != operation_kind {
        return Err(EngineError::Validation(
            "parent category must share the operation kind".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    /// Add a new category at the end of the ordering.
    pub async fn new_category(
        &self,
        new: NewCategory,
        actor: &str,
    ) -> ResultEngine<categories::Model> {
        let title = normalize_required_title(&new.title, "category")?;
        let operation_kind = require_category_operation_kind(new.operation_kind)?;
        with_tx!(self, |db_tx| {
            if let Some(parent_id) = new.parent_id {
                require_parent(&db_tx, parent_id, operation_kind.as_str()).await?;
            }

            let model = categories::ActiveModel {
                title: ActiveValue::Set(title),
                operation_kind: ActiveValue::Set(operation_kind.as_str().to_string()),
                kind: ActiveValue::Set(new.kind.as_str().to_string()),
                parent_id: ActiveValue::Set(new.parent_id),
                ..Default::default()
            };
            let model =
                lifecycle::create(&db_tx, &Scope::<categories::Entity>::all(), model, actor)
                    .await?;
            tracing::debug!(category_id = model.id, "category created");
            Ok(model)
        })
    }

    /// Return a category regardless of its lifecycle state.
    pub async fn category(&self, category_id: i32) -> ResultEngine<categories::Model> {
        require_record::<categories::Entity>(&self.database, category_id).await
    }

    /// Return the active category with the given title.
    pub async fn category_by_title(&self, title: &str) -> ResultEngine<categories::Model> {
        positions::find_by_title(&self.database, &Scope::<categories::Entity>::all(), title).await
    }

    /// List categories ordered by position.
    pub async fn categories(&self, filter: CategoryFilter) -> ResultEngine<Vec<categories::Model>> {
        list_records::<categories::Entity>(&self.database, filter.condition()).await
    }

    pub async fn category_count(&self, filter: CategoryFilter) -> ResultEngine<u64> {
        count_records::<categories::Entity>(&self.database, filter.condition()).await
    }

    /// Apply field changes to an active category.
    pub async fn update_category(
        &self,
        category_id: i32,
        changes: CategoryChanges,
        actor: &str,
    ) -> ResultEngine<categories::Model> {
        let title = changes
            .title
            .as_deref()
            .map(|t| normalize_required_title(t, "category"))
            .transpose()?;
        with_tx!(self, |db_tx| {
            let current = require_active_record::<categories::Entity>(&db_tx, category_id).await?;

            if let Some(Some(parent_id)) = changes.parent_id {
                if parent_id == category_id {
                    return Err(EngineError::Validation(
                        "category cannot be its own parent".to_string(),
                    ));
                }
                require_parent(&db_tx, parent_id, &current.operation_kind).await?;
            }

            let mut model = categories::ActiveModel {
                id: ActiveValue::Set(category_id),
                ..Default::default()
            };
            if let Some(title) = title {
                model.title = ActiveValue::Set(title);
            }
            if let Some(parent_id) = changes.parent_id {
                model.parent_id = ActiveValue::Set(parent_id);
            }
            let model = lifecycle::update::<categories::Entity>(&db_tx, model, actor).await?;
            Ok(model)
        })
    }

    /// Delete a category, softly by default or permanently.
    pub async fn delete_category(
        &self,
        category_id: i32,
        soft: bool,
        actor: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            if soft {
                let model = require_active_record::<categories::Entity>(&db_tx, category_id).await?;
                lifecycle::soft_delete(&db_tx, &Scope::<categories::Entity>::all(), &model, actor)
                    .await?;
            } else {
                let model = require_record::<categories::Entity>(&db_tx, category_id).await?;
                lifecycle::hard_delete(&db_tx, &Scope::<categories::Entity>::all(), &model).await?;
            }
            tracing::debug!(category_id, soft, "category deleted");
            Ok(())
        })
    }

    /// Bring a soft-deleted category back at the end of the ordering.
    pub async fn restore_category(
        &self,
        category_id: i32,
        actor: &str,
    ) -> ResultEngine<categories::Model> {
        with_tx!(self, |db_tx| {
            let model = require_record::<categories::Entity>(&db_tx, category_id).await?;
            lifecycle::restore(&db_tx, &Scope::<categories::Entity>::all(), &model, actor).await?;
            require_record::<categories::Entity>(&db_tx, category_id).await
        })
    }

    /// Move a category to `new_position` in the ordering.
    pub async fn change_category_position(
        &self,
        category_id: i32,
        new_position: i32,
        actor: &str,
    ) -> ResultEngine<categories::Model> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let model = require_active_record::<categories::Entity>(&db_tx, category_id).await?;
            positions::move_to(
                &db_tx,
                &Scope::<categories::Entity>::all(),
                model.position,
                new_position,
                now,
                actor,
            )
            .await
        })
    }

    /// Move the category currently at `old_position`.
    pub async fn change_category_position_at(
        &self,
        old_position: i32,
        new_position: i32,
        actor: &str,
    ) -> ResultEngine<categories::Model> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            positions::move_to(
                &db_tx,
                &Scope::<categories::Entity>::all(),
                old_position,
                new_position,
                now,
                actor,
            )
            .await
        })
    }

    /// Move the active category with the given title.
    pub async fn change_category_position_by_title(
        &self,
        title: &str,
        new_position: i32,
        actor: &str,
    ) -> ResultEngine<categories::Model> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let scope = Scope::<categories::Entity>::all();
            let model = positions::find_by_title(&db_tx, &scope, title).await?;
            positions::move_to(&db_tx, &scope, model.position, new_position, now, actor).await
        })
    }
}
