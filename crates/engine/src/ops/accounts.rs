use chrono::Utc;
use sea_orm::{ActiveValue, Condition, TransactionTrait, prelude::*};

use crate::{
    ResultEngine,
    accounts::{self, AccountKind},
    currencies,
    record::Scope,
};

use super::{
    Engine, EntityState, count_records, lifecycle, list_records, normalize_required_title,
    positions, require_active_record, require_record, with_tx,
};

/// Accounts order per kind, so each kind keeps its own dense sequence.
fn account_scope(kind: AccountKind) -> Scope<accounts::Entity> {
    Scope::narrowed(accounts::Column::Kind.eq(kind.as_str()))
}

/// Fields required to create an account.
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub title: String,
    pub kind: AccountKind,
    pub amount: i64,
    pub currency_id: i32,
    pub closed: bool,
}

/// Field updates for an account; `None` leaves the stored value unchanged.
#[derive(Clone, Debug, Default)]
pub struct AccountChanges {
    pub title: Option<String>,
    pub kind: Option<AccountKind>,
    pub amount: Option<i64>,
    pub currency_id: Option<i32>,
    pub closed: Option<bool>,
}

/// Listing filter for accounts.
#[derive(Clone, Copy, Debug, Default)]
pub struct AccountFilter {
    pub state: EntityState,
    pub kind: Option<AccountKind>,
    pub currency_id: Option<i32>,
    pub closed: Option<bool>,
}

impl AccountFilter {
    fn condition(&self) -> Condition {
        let mut condition = self.state.condition::<accounts::Entity>();
        if let Some(kind) = self.kind {
            condition = condition.add(accounts::Column::Kind.eq(kind.as_str()));
        }
        if let Some(currency_id) = self.currency_id {
            condition = condition.add(accounts::Column::CurrencyId.eq(currency_id));
        }
        if let Some(closed) = self.closed {
            condition = condition.add(accounts::Column::Closed.eq(closed));
        }
        condition
    }
}

impl Engine {
    /// Add a new account at the end of its kind's ordering.
    pub async fn new_account(&self, new: NewAccount, actor: &str) -> ResultEngine<accounts::Model> {
        let title = normalize_required_title(&new.title, "account")?;
        with_tx!(self, |db_tx| {
            require_active_record::<currencies::Entity>(&db_tx, new.currency_id).await?;

            let model = accounts::ActiveModel {
                title: ActiveValue::Set(title),
                kind: ActiveValue::Set(new.kind.as_str().to_string()),
                amount: ActiveValue::Set(new.amount),
                currency_id: ActiveValue::Set(new.currency_id),
                closed: ActiveValue::Set(new.closed),
                ..Default::default()
            };
            let model = lifecycle::create(&db_tx, &account_scope(new.kind), model, actor).await?;
            tracing::debug!(account_id = model.id, "account created");
            Ok(model)
        })
    }

    /// Return an account regardless of its lifecycle state.
    pub async fn account(&self, account_id: i32) -> ResultEngine<accounts::Model> {
        require_record::<accounts::Entity>(&self.database, account_id).await
    }

    /// Return the active account with the given title.
    pub async fn account_by_title(&self, title: &str) -> ResultEngine<accounts::Model> {
        positions::find_by_title(&self.database, &Scope::<accounts::Entity>::all(), title).await
    }

    /// List accounts ordered by position.
    pub async fn accounts(&self, filter: AccountFilter) -> ResultEngine<Vec<accounts::Model>> {
        list_records::<accounts::Entity>(&self.database, filter.condition()).await
    }

    pub async fn account_count(&self, filter: AccountFilter) -> ResultEngine<u64> {
        count_records::<accounts::Entity>(&self.database, filter.condition()).await
    }

    /// Apply field changes to an active account.
    ///
    /// Changing the kind re-seats the account at the end of the target
    /// kind's ordering and closes the gap it leaves behind.
    pub async fn update_account(
        &self,
        account_id: i32,
        changes: AccountChanges,
        actor: &str,
    ) -> ResultEngine<accounts::Model> {
        let title = changes
            .title
            .as_deref()
            .map(|t| normalize_required_title(t, "account"))
            .transpose()?;
        with_tx!(self, |db_tx| {
            let current = require_active_record::<accounts::Entity>(&db_tx, account_id).await?;
            if let Some(currency_id) = changes.currency_id {
                require_active_record::<currencies::Entity>(&db_tx, currency_id).await?;
            }

            let mut model = accounts::ActiveModel {
                id: ActiveValue::Set(account_id),
                ..Default::default()
            };
            if let Some(title) = title {
                model.title = ActiveValue::Set(title);
            }
            if let Some(amount) = changes.amount {
                model.amount = ActiveValue::Set(amount);
            }
            if let Some(currency_id) = changes.currency_id {
                model.currency_id = ActiveValue::Set(currency_id);
            }
            if let Some(closed) = changes.closed {
                model.closed = ActiveValue::Set(closed);
            }
            if let Some(kind) = changes.kind
                && kind.as_str() != current.kind
            {
                let old_kind = current.kind()?;
                positions::close_gap(&db_tx, &account_scope(old_kind), current.position).await?;
                let position = positions::max_position(&db_tx, &account_scope(kind)).await? + 1;
                model.kind = ActiveValue::Set(kind.as_str().to_string());
                model.position = ActiveValue::Set(position);
            }

            let model = lifecycle::update::<accounts::Entity>(&db_tx, model, actor).await?;
            Ok(model)
        })
    }

    /// Delete an account, softly by default or permanently.
    pub async fn delete_account(&self, account_id: i32, soft: bool, actor: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            if soft {
                let model = require_active_record::<accounts::Entity>(&db_tx, account_id).await?;
                let scope = account_scope(model.kind()?);
                lifecycle::soft_delete(&db_tx, &scope, &model, actor).await?;
            } else {
                let model = require_record::<accounts::Entity>(&db_tx, account_id).await?;
                let scope = account_scope(model.kind()?);
                lifecycle::hard_delete(&db_tx, &scope, &model).await?;
            }
            tracing::debug!(account_id, soft, "account deleted");
            Ok(())
        })
    }

    /// Bring a soft-deleted account back at the end of its kind's ordering.
    pub async fn restore_account(
        &self,
        account_id: i32,
        actor: &str,
    ) -> ResultEngine<accounts::Model> {
        with_tx!(self, |db_tx| {
            let model = require_record::<accounts::Entity>(&db_tx, account_id).await?;
            let scope = account_scope(model.kind()?);
            lifecycle::restore(&db_tx, &scope, &model, actor).await?;
            require_record::<accounts::Entity>(&db_tx, account_id).await
        })
    }

    /// Move an account to `new_position` inside its kind's ordering.
    pub async fn change_account_position(
        &self,
        account_id: i32,
        new_position: i32,
        actor: &str,
    ) -> ResultEngine<accounts::Model> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let model = require_active_record::<accounts::Entity>(&db_tx, account_id).await?;
            let scope = account_scope(model.kind()?);
            positions::move_to(&db_tx, &scope, model.position, new_position, now, actor).await
        })
    }

    /// Move the account currently at `old_position` of the given kind.
    pub async fn change_account_position_at(
        &self,
        kind: AccountKind,
        old_position: i32,
        new_position: i32,
        actor: &str,
    ) -> ResultEngine<accounts::Model> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            positions::move_to(
                &db_tx,
                &account_scope(kind),
                old_position,
                new_position,
                now,
                actor,
            )
            .await
        })
    }

    /// Move the active account with the given title.
    pub async fn change_account_position_by_title(
        &self,
        title: &str,
        new_position: i32,
        actor: &str,
    ) -> ResultEngine<accounts::Model> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let model =
                positions::find_by_title(&db_tx, &Scope::<accounts::Entity>::all(), title).await?;
            let scope = account_scope(model.kind()?);
            positions::move_to(&db_tx, &scope, model.position, new_position, now, actor).await
        })
    }
}
