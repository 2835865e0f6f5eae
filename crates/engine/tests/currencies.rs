use engine::{CurrencyChanges, CurrencyFilter, Engine, EngineError, EntityState, NewCurrency};
use migration::MigratorTrait;
use sea_orm::Database;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn new_currency(engine: &Engine, title: &str, rate: f64) -> i32 {
    engine
        .new_currency(
            NewCurrency {
                title: title.to_string(),
                exchange_rate: rate,
            },
            "alice",
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn convert_through_the_main_pivot() {
    let engine = engine_with_db().await;
    let rub = new_currency(&engine, "RUB", 1.0).await;
    let usd = new_currency(&engine, "USD", 90.0).await;

    assert_eq!(engine.convert(90_0000, rub, usd).await.unwrap(), 1_0000);
    assert_eq!(engine.convert(1_0000, usd, rub).await.unwrap(), 90_0000);
    assert_eq!(engine.convert(1234, usd, usd).await.unwrap(), 1234);
}

#[tokio::test]
async fn convert_to_and_from_main() {
    let engine = engine_with_db().await;
    let _rub = new_currency(&engine, "RUB", 1.0).await;
    let usd = new_currency(&engine, "USD", 90.0).await;

    assert_eq!(engine.convert_to_main(1_0000, usd).await.unwrap(), 90_0000);
    assert_eq!(engine.convert_from_main(90_0000, usd).await.unwrap(), 1_0000);
}

#[tokio::test]
async fn convert_with_unknown_currency_fails() {
    let engine = engine_with_db().await;
    let rub = new_currency(&engine, "RUB", 1.0).await;

    let err = engine.convert(100, rub, 99).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("currency not exists".to_string()));
}

#[tokio::test]
async fn invalid_rates_are_rejected() {
    let engine = engine_with_db().await;

    for rate in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = engine
            .new_currency(
                NewCurrency {
                    title: "BAD".to_string(),
                    exchange_rate: rate,
                },
                "alice",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}

#[tokio::test]
async fn duplicate_titles_are_rejected() {
    let engine = engine_with_db().await;
    new_currency(&engine, "EUR", 1.0).await;

    let err = engine
        .new_currency(
            NewCurrency {
                title: "EUR".to_string(),
                exchange_rate: 2.0,
            },
            "alice",
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("currency 'EUR' already exists".to_string())
    );
}

#[tokio::test]
async fn main_currency_lookup() {
    let engine = engine_with_db().await;
    assert_eq!(engine.main_currency().await.unwrap(), None);

    let usd = new_currency(&engine, "USD", 90.0).await;
    assert_eq!(engine.main_currency().await.unwrap(), None);

    let rub = new_currency(&engine, "RUB", 1.0).await;
    let main = engine.main_currency().await.unwrap().unwrap();
    assert_eq!(main.id, rub);

    // A second rate-1.0 currency corrupts the table and the lookup says so.
    engine
        .update_currency(
            usd,
            CurrencyChanges {
                exchange_rate: Some(1.0),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();
    let err = engine.main_currency().await.unwrap_err();
    assert!(matches!(err, EngineError::DataIntegrity(_)));
}

#[tokio::test]
async fn set_main_currency_rebases_all_rates() {
    let engine = engine_with_db().await;
    let rub = new_currency(&engine, "RUB", 1.0).await;
    let usd = new_currency(&engine, "USD", 90.0).await;
    let eur = new_currency(&engine, "EUR", 100.0).await;

    let rebased = engine.set_main_currency(usd, "bob").await.unwrap();

    let rate_of = |id: i32| {
        rebased
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.exchange_rate)
            .unwrap()
    };
    assert_eq!(rate_of(usd), 1.0);
    assert!((rate_of(rub) - 1.0 / 90.0).abs() < 1e-12);
    assert!((rate_of(eur) - 100.0 / 90.0).abs() < 1e-12);

    let stored = engine.currency(rub).await.unwrap();
    assert!((stored.exchange_rate - 1.0 / 90.0).abs() < 1e-12);
    assert_eq!(stored.updated_by, Some("bob".to_string()));
}

#[tokio::test]
async fn set_main_currency_on_current_main_changes_nothing() {
    let engine = engine_with_db().await;
    let rub = new_currency(&engine, "RUB", 1.0).await;
    let usd = new_currency(&engine, "USD", 90.0).await;

    engine.set_main_currency(rub, "bob").await.unwrap();

    let stored = engine.currency(usd).await.unwrap();
    assert_eq!(stored.exchange_rate, 90.0);
    assert_eq!(stored.updated_by, None);
}

#[tokio::test]
async fn currency_or_create_returns_restores_or_creates() {
    let engine = engine_with_db().await;
    let eur = new_currency(&engine, "EUR", 1.0).await;

    let existing = engine.currency_or_create("EUR", 5.0, "alice").await.unwrap();
    assert_eq!(existing.id, eur);
    assert_eq!(existing.exchange_rate, 1.0);

    engine.delete_currency(eur, true, "alice").await.unwrap();
    let restored = engine.currency_or_create("EUR", 5.0, "alice").await.unwrap();
    assert_eq!(restored.id, eur);
    assert_eq!(restored.delete_time, None);

    let created = engine.currency_or_create("USD", 90.0, "alice").await.unwrap();
    assert_ne!(created.id, eur);
    assert_eq!(created.exchange_rate, 90.0);
}

#[tokio::test]
async fn deleting_the_main_currency_is_allowed() {
    let engine = engine_with_db().await;
    let rub = new_currency(&engine, "RUB", 1.0).await;
    new_currency(&engine, "USD", 90.0).await;

    engine.delete_currency(rub, true, "alice").await.unwrap();

    assert_eq!(engine.main_currency().await.unwrap(), None);
    let active = engine
        .currency_count(CurrencyFilter {
            state: EntityState::Active,
        })
        .await
        .unwrap();
    assert_eq!(active, 1);
}

#[tokio::test]
async fn currency_ordering_supports_all_reorder_forms() {
    let engine = engine_with_db().await;
    new_currency(&engine, "RUB", 1.0).await;
    let usd = new_currency(&engine, "USD", 90.0).await;
    new_currency(&engine, "EUR", 100.0).await;

    engine.change_currency_position(usd, 3, "alice").await.unwrap();
    engine.change_currency_position_at(1, 2, "alice").await.unwrap();
    engine
        .change_currency_position_by_title("USD", 1, "alice")
        .await
        .unwrap();

    let titles: Vec<String> = engine
        .currencies(CurrencyFilter::default())
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.title)
        .collect();
    assert_eq!(titles, ["USD", "EUR", "RUB"]);
}
