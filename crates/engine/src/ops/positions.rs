//! Dense 1-based ordering inside a [`Scope`]: max lookup, gap closing and
//! position moves. All shifts run as bulk `UPDATE`s so a move touches each
//! affected row exactly once.

use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, QueryFilter, QuerySelect, prelude::*, sea_query::Expr};

use crate::{
    EngineError, ResultEngine,
    record::{Record, Scope},
};

use super::require_record;

/// Highest occupied position in the scope, `0` when the scope is empty.
pub(super) async fn max_position<E: Record>(
    db: &impl ConnectionTrait,
    scope: &Scope<E>,
) -> ResultEngine<i32> {
    let max = E::find()
        .filter(scope.active())
        .select_only()
        .column_as(E::position_column().max(), "max_position")
        .into_tuple::<Option<i32>>()
        .one(db)
        .await?;
    Ok(max.flatten().unwrap_or(0))
}

pub(super) async fn find_at<E: Record>(
    db: &impl ConnectionTrait,
    scope: &Scope<E>,
    position: i32,
) -> ResultEngine<E::Model> {
    E::find()
        .filter(scope.active().add(E::position_column().eq(position)))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::OutOfRange(format!("no {} at position {position}", E::KIND)))
}

pub(super) async fn find_by_title<E: Record>(
    db: &impl ConnectionTrait,
    scope: &Scope<E>,
    title: &str,
) -> ResultEngine<E::Model> {
    let Some(title_column) = E::title_column() else {
        return Err(EngineError::Validation(format!(
            "{} records have no title",
            E::KIND
        )));
    };
    // Ambiguous titles do not resolve; the caller has to fall back to ids.
    let mut matches = E::find()
        .filter(scope.active().add(title_column.eq(title)))
        .limit(2)
        .all(db)
        .await?;
    if matches.len() > 1 {
        return Err(EngineError::NotFound(format!(
            "{} title '{title}' is ambiguous",
            E::KIND
        )));
    }
    matches
        .pop()
        .ok_or_else(|| EngineError::NotFound(format!("{} not exists", E::KIND)))
}

/// Pull every active record behind `removed_position` one step forward, so
/// the sequence stays dense after a removal.
pub(super) async fn close_gap<E: Record>(
    db: &impl ConnectionTrait,
    scope: &Scope<E>,
    removed_position: i32,
) -> ResultEngine<()> {
    E::update_many()
        .filter(scope.active().add(E::position_column().gt(removed_position)))
        .col_expr(E::position_column(), Expr::col(E::position_column()).sub(1))
        .exec(db)
        .await?;
    Ok(())
}

/// Move the record at `old_position` to `new_position`, shifting everything
/// in between by one. The moved record and every shifted neighbour get their
/// update stamps refreshed.
pub(super) async fn move_to<E: Record>(
    db: &impl ConnectionTrait,
    scope: &Scope<E>,
    old_position: i32,
    new_position: i32,
    now: DateTime<Utc>,
    actor: &str,
) -> ResultEngine<E::Model> {
    let upper = max_position(db, scope).await?;
    if new_position < 1 || new_position > upper {
        return Err(EngineError::OutOfRange(format!(
            "position {new_position} is outside 1..={upper}"
        )));
    }
    let moved = find_at(db, scope, old_position).await?;
    if new_position == old_position {
        return Ok(moved);
    }

    if new_position > old_position {
        E::update_many()
            .filter(
                scope
                    .active()
                    .add(E::position_column().gt(old_position))
                    .add(E::position_column().lte(new_position)),
            )
            .col_expr(E::position_column(), Expr::col(E::position_column()).sub(1))
            .col_expr(E::update_time_column(), Expr::value(now))
            .col_expr(E::updated_by_column(), Expr::value(actor.to_string()))
            .exec(db)
            .await?;
    } else {
        E::update_many()
            .filter(
                scope
                    .active()
                    .add(E::position_column().gte(new_position))
                    .add(E::position_column().lt(old_position)),
            )
            .col_expr(E::position_column(), Expr::col(E::position_column()).add(1))
            .col_expr(E::update_time_column(), Expr::value(now))
            .col_expr(E::updated_by_column(), Expr::value(actor.to_string()))
            .exec(db)
            .await?;
    }

    E::update_many()
        .filter(E::id_column().eq(E::id_of(&moved)))
        .col_expr(E::position_column(), Expr::value(new_position))
        .col_expr(E::update_time_column(), Expr::value(now))
        .col_expr(E::updated_by_column(), Expr::value(actor.to_string()))
        .exec(db)
        .await?;

    require_record::<E>(db, E::id_of(&moved)).await
}
