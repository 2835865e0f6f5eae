//! Shared behavior for ordered, soft-deletable records.
//!
//! Every persisted record kind keeps a dense 1-based `position` inside its
//! ordering scope and carries create/update/delete audit stamps. The [`Record`]
//! trait exposes the columns and stamping hooks the generic lifecycle and
//! ordering helpers need, so the per-kind facades stay thin.

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{Condition, sea_query::SimpleExpr};

pub(crate) trait Record: EntityTrait {
    /// Record kind used in error messages, e.g. `"account"`.
    const KIND: &'static str;

    fn id_column() -> Self::Column;
    fn position_column() -> Self::Column;
    /// `None` for record kinds without a user-facing title.
    fn title_column() -> Option<Self::Column>;
    fn update_time_column() -> Self::Column;
    fn updated_by_column() -> Self::Column;
    fn delete_time_column() -> Self::Column;
    fn deleted_by_column() -> Self::Column;

    fn id_of(model: &Self::Model) -> i32;
    fn position_of(model: &Self::Model) -> i32;
    fn is_deleted(model: &Self::Model) -> bool;

    /// Fill the position and creation stamps on a new record.
    fn stamp_create(model: &mut Self::ActiveModel, position: i32, now: DateTime<Utc>, actor: &str);
    /// Fill the update stamps on a changed record.
    fn stamp_update(model: &mut Self::ActiveModel, now: DateTime<Utc>, actor: &str);
}

/// An ordering scope: the set of active records that share one dense
/// 1-based position sequence.
///
/// Most record kinds order globally. Accounts order per account kind, so
/// their scope carries a narrowing expression on top of the soft-delete
/// filter.
pub(crate) struct Scope<E: Record> {
    narrow: Option<SimpleExpr>,
    _entity: PhantomData<E>,
}

impl<E: Record> Scope<E> {
    pub(crate) fn all() -> Self {
        Self {
            narrow: None,
            _entity: PhantomData,
        }
    }

    pub(crate) fn narrowed(expr: SimpleExpr) -> Self {
        Self {
            narrow: Some(expr),
            _entity: PhantomData,
        }
    }

    /// Condition matching the active records of this scope.
    pub(crate) fn active(&self) -> Condition {
        let mut condition = Condition::all().add(E::delete_time_column().is_null());
        if let Some(expr) = &self.narrow {
            condition = condition.add(expr.clone());
        }
        condition
    }
}
