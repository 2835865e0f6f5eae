use chrono::Utc;
use sea_orm::{ActiveValue, Condition, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, currencies, rates, record::Scope};

use super::{
    Engine, EntityState, count_records, lifecycle, list_records, normalize_required_title,
    positions, require_active_record, require_record, with_tx,
};

/// Fields required to create a currency.
#[derive(Clone, Debug)]
pub struct NewCurrency {
    pub title: String,
    pub exchange_rate: f64,
}

/// Field updates for a currency; `None` leaves the stored value unchanged.
#[derive(Clone, Debug, Default)]
pub struct CurrencyChanges {
    pub title: Option<String>,
    pub exchange_rate: Option<f64>,
}

/// Listing filter for currencies.
#[derive(Clone, Copy, Debug, Default)]
pub struct CurrencyFilter {
    pub state: EntityState,
}

impl CurrencyFilter {
    fn condition(&self) -> Condition {
        self.state.condition::<currencies::Entity>()
    }
}

fn require_valid_rate(rate: f64) -> ResultEngine<f64> {
    if !rates::is_valid_rate(rate) {
        return Err(EngineError::Validation(format!(
            "exchange rate {rate} must be positive and finite"
        )));
    }
    Ok(rate)
}

async fn require_unused_title(
    db: &impl ConnectionTrait,
    title: &str,
    exclude_id: Option<i32>,
) -> ResultEngine<()> {
    let mut query = currencies::Entity::find()
        .filter(currencies::Column::Title.eq(title))
        .filter(currencies::Column::DeleteTime.is_null());
    if let Some(id) = exclude_id {
        query = query.filter(currencies::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(EngineError::Validation(format!(
            "currency '{title}' already exists"
        )));
    }
    Ok(())
}

impl Engine {
    /// Add a new currency at the end of the ordering.
    ///
    /// A rate of `1.0` designates the currency as main; creating a second
    /// one with rate `1.0` is not rejected here, but [`Engine::main_currency`]
    /// will report the corrupt table.
    pub async fn new_currency(
        &self,
        new: NewCurrency,
        actor: &str,
    ) -> ResultEngine<currencies::Model> {
        let title = normalize_required_title(&new.title, "currency")?;
        require_valid_rate(new.exchange_rate)?;
        with_tx!(self, |db_tx| {
            require_unused_title(&db_tx, &title, None).await?;

            let model = currencies::ActiveModel {
                title: ActiveValue::Set(title),
                exchange_rate: ActiveValue::Set(new.exchange_rate),
                ..Default::default()
            };
            let model =
                lifecycle::create(&db_tx, &Scope::<currencies::Entity>::all(), model, actor)
                    .await?;
            tracing::debug!(currency_id = model.id, "currency created");
            Ok(model)
        })
    }

    /// Return a currency regardless of its lifecycle state.
    pub async fn currency(&self, currency_id: i32) -> ResultEngine<currencies::Model> {
        require_record::<currencies::Entity>(&self.database, currency_id).await
    }

    /// Return the active currency with the given title.
    pub async fn currency_by_title(&self, title: &str) -> ResultEngine<currencies::Model> {
        positions::find_by_title(&self.database, &Scope::<currencies::Entity>::all(), title).await
    }

    /// Return the currency with the given title, restoring a soft-deleted
    /// one or creating a missing one on the way.
    pub async fn currency_or_create(
        &self,
        title: &str,
        exchange_rate: f64,
        actor: &str,
    ) -> ResultEngine<currencies::Model> {
        let title = normalize_required_title(title, "currency")?;
        with_tx!(self, |db_tx| {
            let active = currencies::Entity::find()
                .filter(currencies::Column::Title.eq(title.clone()))
                .filter(currencies::Column::DeleteTime.is_null())
                .one(&db_tx)
                .await?;
            let deleted = currencies::Entity::find()
                .filter(currencies::Column::Title.eq(title.clone()))
                .filter(currencies::Column::DeleteTime.is_not_null())
                .one(&db_tx)
                .await?;

            if let Some(model) = active {
                Ok(model)
            } else if let Some(model) = deleted {
                lifecycle::restore(&db_tx, &Scope::<currencies::Entity>::all(), &model, actor)
                    .await?;
                require_record::<currencies::Entity>(&db_tx, model.id).await
            } else {
                require_valid_rate(exchange_rate)?;
                let model = currencies::ActiveModel {
                    title: ActiveValue::Set(title.clone()),
                    exchange_rate: ActiveValue::Set(exchange_rate),
                    ..Default::default()
                };
                lifecycle::create(&db_tx, &Scope::<currencies::Entity>::all(), model, actor).await
            }
        })
    }

    /// List currencies ordered by position.
    pub async fn currencies(&self, filter: CurrencyFilter) -> ResultEngine<Vec<currencies::Model>> {
        list_records::<currencies::Entity>(&self.database, filter.condition()).await
    }

    pub async fn currency_count(&self, filter: CurrencyFilter) -> ResultEngine<u64> {
        count_records::<currencies::Entity>(&self.database, filter.condition()).await
    }

    /// Apply field changes to an active currency.
    pub async fn update_currency(
        &self,
        currency_id: i32,
        changes: CurrencyChanges,
        actor: &str,
    ) -> ResultEngine<currencies::Model> {
        let title = changes
            .title
            .as_deref()
            .map(|t| normalize_required_title(t, "currency"))
            .transpose()?;
        if let Some(rate) = changes.exchange_rate {
            require_valid_rate(rate)?;
        }
        with_tx!(self, |db_tx| {
            require_active_record::<currencies::Entity>(&db_tx, currency_id).await?;

            let mut model = currencies::ActiveModel {
                id: ActiveValue::Set(currency_id),
                ..Default::default()
            };
            if let Some(title) = title {
                require_unused_title(&db_tx, &title, Some(currency_id)).await?;
                model.title = ActiveValue::Set(title);
            }
            if let Some(rate) = changes.exchange_rate {
                model.exchange_rate = ActiveValue::Set(rate);
            }
            let model = lifecycle::update::<currencies::Entity>(&db_tx, model, actor).await?;
            Ok(model)
        })
    }

    /// Delete a currency, softly by default or permanently.
    ///
    /// Deleting the main currency is allowed; conversions relative to main
    /// are undefined until a new main is designated.
    pub async fn delete_currency(
        &self,
        currency_id: i32,
        soft: bool,
        actor: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            if soft {
                let model = require_active_record::<currencies::Entity>(&db_tx, currency_id).await?;
                lifecycle::soft_delete(&db_tx, &Scope::<currencies::Entity>::all(), &model, actor)
                    .await?;
            } else {
                let model = require_record::<currencies::Entity>(&db_tx, currency_id).await?;
                lifecycle::hard_delete(&db_tx, &Scope::<currencies::Entity>::all(), &model).await?;
            }
            tracing::debug!(currency_id, soft, "currency deleted");
            Ok(())
        })
    }

    /// Bring a soft-deleted currency back at the end of the ordering.
    pub async fn restore_currency(
        &self,
        currency_id: i32,
        actor: &str,
    ) -> ResultEngine<currencies::Model> {
        with_tx!(self, |db_tx| {
            let model = require_record::<currencies::Entity>(&db_tx, currency_id).await?;
            lifecycle::restore(&db_tx, &Scope::<currencies::Entity>::all(), &model, actor).await?;
            require_record::<currencies::Entity>(&db_tx, currency_id).await
        })
    }

    /// Move a currency to `new_position` in the ordering.
    pub async fn change_currency_position(
        &self,
        currency_id: i32,
        new_position: i32,
        actor: &str,
    ) -> ResultEngine<currencies::Model> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let model = require_active_record::<currencies::Entity>(&db_tx, currency_id).await?;
            positions::move_to(
                &db_tx,
                &Scope::<currencies::Entity>::all(),
                model.position,
                new_position,
                now,
                actor,
            )
            .await
        })
    }

    /// Move the currency currently at `old_position`.
    pub async fn change_currency_position_at(
        &self,
        old_position: i32,
        new_position: i32,
        actor: &str,
    ) -> ResultEngine<currencies::Model> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            positions::move_to(
                &db_tx,
                &Scope::<currencies::Entity>::all(),
                old_position,
                new_position,
                now,
                actor,
            )
            .await
        })
    }

    /// Move the active currency with the given title.
    pub async fn change_currency_position_by_title(
        &self,
        title: &str,
        new_position: i32,
        actor: &str,
    ) -> ResultEngine<currencies::Model> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let scope = Scope::<currencies::Entity>::all();
            let model = positions::find_by_title(&db_tx, &scope, title).await?;
            positions::move_to(&db_tx, &scope, model.position, new_position, now, actor).await
        })
    }

    /// Return the main currency, if one is designated.
    pub async fn main_currency(&self) -> ResultEngine<Option<currencies::Model>> {
        let records = list_records::<currencies::Entity>(
            &self.database,
            EntityState::Active.condition::<currencies::Entity>(),
        )
        .await?;
        Ok(rates::find_main(&records)?.cloned())
    }

    /// Designate a new main currency and rebase every active rate onto it.
    ///
    /// Returns the active currencies with their rewritten rates; every
    /// changed row is stamped.
    pub async fn set_main_currency(
        &self,
        currency_id: i32,
        actor: &str,
    ) -> ResultEngine<Vec<currencies::Model>> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let mut records = list_records::<currencies::Entity>(
                &db_tx,
                EntityState::Active.condition::<currencies::Entity>(),
            )
            .await?;
            let before: Vec<f64> = records.iter().map(|c| c.exchange_rate).collect();

            if rates::rebase(&mut records, currency_id)? {
                for (record, old_rate) in records.iter_mut().zip(before) {
                    if record.exchange_rate == old_rate {
                        continue;
                    }
                    let model = currencies::ActiveModel {
                        id: ActiveValue::Set(record.id),
                        exchange_rate: ActiveValue::Set(record.exchange_rate),
                        update_time: ActiveValue::Set(Some(now)),
                        updated_by: ActiveValue::Set(Some(actor.to_string())),
                        ..Default::default()
                    };
                    model.update(&db_tx).await?;
                    record.update_time = Some(now);
                    record.updated_by = Some(actor.to_string());
                }
                tracing::debug!(currency_id, "main currency changed");
            }
            Ok(records)
        })
    }

    /// Convert an amount between two active currencies.
    pub async fn convert(&self, amount: i64, from_id: i32, to_id: i32) -> ResultEngine<i64> {
        with_tx!(self, |db_tx| {
            let from = require_active_record::<currencies::Entity>(&db_tx, from_id).await?;
            let to = require_active_record::<currencies::Entity>(&db_tx, to_id).await?;
            rates::convert(amount, &from, &to)
        })
    }

    /// Convert an amount of the given currency into main-currency units.
    pub async fn convert_to_main(&self, amount: i64, currency_id: i32) -> ResultEngine<i64> {
        let currency =
            require_active_record::<currencies::Entity>(&self.database, currency_id).await?;
        rates::convert_to_main(amount, &currency)
    }

    /// Convert an amount of main-currency units into the given currency.
    pub async fn convert_from_main(&self, amount: i64, currency_id: i32) -> ResultEngine<i64> {
        let currency =
            require_active_record::<currencies::Entity>(&self.database, currency_id).await?;
        rates::convert_from_main(amount, &currency)
    }
}
