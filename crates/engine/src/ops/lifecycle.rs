//! Generic record lifecycle: create at the end of the scope, stamp updates,
//! soft delete with gap closing, restore at the end, hard delete.

use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, IntoActiveModel, QueryFilter, prelude::*, sea_query::Expr};

use crate::{
    EngineError, ResultEngine,
    record::{Record, Scope},
};

use super::positions;

/// Insert a new record at the end of its scope with creation stamps filled.
pub(super) async fn create<E>(
    db: &impl ConnectionTrait,
    scope: &Scope<E>,
    mut model: E::ActiveModel,
    actor: &str,
) -> ResultEngine<E::Model>
where
    E: Record,
    E::Model: IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelBehavior + Send,
{
    let position = positions::max_position(db, scope).await? + 1;
    E::stamp_create(&mut model, position, Utc::now(), actor);
    Ok(model.insert(db).await?)
}

/// Persist field changes with update stamps filled.
pub(super) async fn update<E>(
    db: &impl ConnectionTrait,
    mut model: E::ActiveModel,
    actor: &str,
) -> ResultEngine<E::Model>
where
    E: Record,
    E::Model: IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelBehavior + Send,
{
    E::stamp_update(&mut model, Utc::now(), actor);
    Ok(model.update(db).await?)
}

/// Mark the record deleted and close the gap it leaves in its scope.
pub(super) async fn soft_delete<E: Record>(
    db: &impl ConnectionTrait,
    scope: &Scope<E>,
    model: &E::Model,
    actor: &str,
) -> ResultEngine<()> {
    E::update_many()
        .filter(E::id_column().eq(E::id_of(model)))
        .col_expr(E::delete_time_column(), Expr::value(Utc::now()))
        .col_expr(E::deleted_by_column(), Expr::value(actor.to_string()))
        .exec(db)
        .await?;
    positions::close_gap(db, scope, E::position_of(model)).await
}

/// Remove the row permanently. Only active records leave a gap to close.
pub(super) async fn hard_delete<E: Record>(
    db: &impl ConnectionTrait,
    scope: &Scope<E>,
    model: &E::Model,
) -> ResultEngine<()> {
    E::delete_many()
        .filter(E::id_column().eq(E::id_of(model)))
        .exec(db)
        .await?;
    if !E::is_deleted(model) {
        positions::close_gap(db, scope, E::position_of(model)).await?;
    }
    Ok(())
}

/// Bring a soft-deleted record back, appended at the end of its scope.
/// Returns the position it was restored to.
pub(super) async fn restore<E: Record>(
    db: &impl ConnectionTrait,
    scope: &Scope<E>,
    model: &E::Model,
    actor: &str,
) -> ResultEngine<i32> {
    if !E::is_deleted(model) {
        return Err(EngineError::InvalidState(format!(
            "{} is not deleted",
            E::KIND
        )));
    }
    let position = positions::max_position(db, scope).await? + 1;
    E::update_many()
        .filter(E::id_column().eq(E::id_of(model)))
        .col_expr(E::position_column(), Expr::value(position))
        .col_expr(E::delete_time_column(), Expr::value(None::<DateTime<Utc>>))
        .col_expr(E::deleted_by_column(), Expr::value(None::<String>))
        .col_expr(E::update_time_column(), Expr::value(Utc::now()))
        .col_expr(E::updated_by_column(), Expr::value(actor.to_string()))
        .exec(db)
        .await?;
    Ok(position)
}
