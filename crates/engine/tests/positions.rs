use engine::{AccountFilter, AccountKind, Engine, EngineError, NewAccount, NewCurrency};
use migration::MigratorTrait;
use sea_orm::Database;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn seed_currency(engine: &Engine) -> i32 {
    engine
        .new_currency(
            NewCurrency {
                title: "EUR".to_string(),
                exchange_rate: 1.0,
            },
            "alice",
        )
        .await
        .unwrap()
        .id
}

async fn seed_accounts(engine: &Engine, currency_id: i32, titles: &[&str]) -> Vec<i32> {
    let mut ids = Vec::new();
    for title in titles {
        let account = engine
            .new_account(
                NewAccount {
                    title: title.to_string(),
                    kind: AccountKind::Current,
                    amount: 0,
                    currency_id,
                    closed: false,
                },
                "alice",
            )
            .await
            .unwrap();
        ids.push(account.id);
    }
    ids
}

async fn active_titles(engine: &Engine) -> Vec<String> {
    engine
        .accounts(AccountFilter {
            kind: Some(AccountKind::Current),
            ..Default::default()
        })
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.title)
        .collect()
}

async fn active_positions(engine: &Engine) -> Vec<i32> {
    engine
        .accounts(AccountFilter {
            kind: Some(AccountKind::Current),
            ..Default::default()
        })
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.position)
        .collect()
}

#[tokio::test]
async fn move_to_same_position_is_a_noop() {
    let engine = engine_with_db().await;
    let currency_id = seed_currency(&engine).await;
    let ids = seed_accounts(&engine, currency_id, &["A", "B", "C"]).await;

    let moved = engine.change_account_position(ids[1], 2, "bob").await.unwrap();

    assert_eq!(moved.position, 2);
    assert_eq!(moved.updated_by, None);
    assert_eq!(active_titles(&engine).await, ["A", "B", "C"]);
}

#[tokio::test]
async fn move_head_to_tail_shifts_everything_down() {
    let engine = engine_with_db().await;
    let currency_id = seed_currency(&engine).await;
    let ids = seed_accounts(&engine, currency_id, &["A", "B", "C"]).await;

    let moved = engine.change_account_position(ids[0], 3, "bob").await.unwrap();

    assert_eq!(moved.position, 3);
    assert_eq!(active_titles(&engine).await, ["B", "C", "A"]);
    assert_eq!(active_positions(&engine).await, [1, 2, 3]);
}

#[tokio::test]
async fn move_tail_to_head_shifts_everything_up() {
    let engine = engine_with_db().await;
    let currency_id = seed_currency(&engine).await;
    let ids = seed_accounts(&engine, currency_id, &["A", "B", "C"]).await;

    engine.change_account_position(ids[2], 1, "bob").await.unwrap();

    assert_eq!(active_titles(&engine).await, ["C", "A", "B"]);
    assert_eq!(active_positions(&engine).await, [1, 2, 3]);
}

#[tokio::test]
async fn moves_stamp_the_shifted_neighbours() {
    let engine = engine_with_db().await;
    let currency_id = seed_currency(&engine).await;
    let ids = seed_accounts(&engine, currency_id, &["A", "B", "C"]).await;

    engine.change_account_position(ids[0], 2, "bob").await.unwrap();

    let shifted = engine.account(ids[1]).await.unwrap();
    let untouched = engine.account(ids[2]).await.unwrap();
    assert_eq!(shifted.updated_by, Some("bob".to_string()));
    assert_eq!(untouched.updated_by, None);
}

#[tokio::test]
async fn out_of_range_targets_are_rejected() {
    let engine = engine_with_db().await;
    let currency_id = seed_currency(&engine).await;
    let ids = seed_accounts(&engine, currency_id, &["A", "B", "C"]).await;

    let low = engine.change_account_position(ids[0], 0, "bob").await.unwrap_err();
    assert!(matches!(low, EngineError::OutOfRange(_)));

    let high = engine.change_account_position(ids[0], 4, "bob").await.unwrap_err();
    assert!(matches!(high, EngineError::OutOfRange(_)));
}

#[tokio::test]
async fn positions_stay_dense_through_mixed_changes() {
    let engine = engine_with_db().await;
    let currency_id = seed_currency(&engine).await;
    let ids = seed_accounts(&engine, currency_id, &["A", "B", "C", "D"]).await;

    engine.delete_account(ids[1], true, "alice").await.unwrap();
    seed_accounts(&engine, currency_id, &["E"]).await;
    engine.change_account_position(ids[0], 3, "alice").await.unwrap();

    assert_eq!(active_positions(&engine).await, [1, 2, 3, 4]);
    assert_eq!(active_titles(&engine).await, ["C", "D", "A", "E"]);
}

#[tokio::test]
async fn account_kinds_keep_independent_orderings() {
    let engine = engine_with_db().await;
    let currency_id = seed_currency(&engine).await;
    seed_accounts(&engine, currency_id, &["A", "B"]).await;
    let savings = engine
        .new_account(
            NewAccount {
                title: "Nest egg".to_string(),
                kind: AccountKind::Savings,
                amount: 0,
                currency_id,
                closed: false,
            },
            "alice",
        )
        .await
        .unwrap();

    // The savings ordering starts at 1 even though two current accounts exist.
    assert_eq!(savings.position, 1);

    engine
        .change_account_position_at(AccountKind::Current, 1, 2, "alice")
        .await
        .unwrap();
    let unchanged = engine.account(savings.id).await.unwrap();
    assert_eq!(unchanged.position, 1);
}

#[tokio::test]
async fn reorder_by_old_position_and_by_title() {
    let engine = engine_with_db().await;
    let currency_id = seed_currency(&engine).await;
    seed_accounts(&engine, currency_id, &["A", "B", "C"]).await;

    engine
        .change_account_position_at(AccountKind::Current, 3, 1, "alice")
        .await
        .unwrap();
    assert_eq!(active_titles(&engine).await, ["C", "A", "B"]);

    engine
        .change_account_position_by_title("B", 1, "alice")
        .await
        .unwrap();
    assert_eq!(active_titles(&engine).await, ["B", "C", "A"]);
}

#[tokio::test]
async fn ambiguous_title_does_not_resolve() {
    let engine = engine_with_db().await;
    let currency_id = seed_currency(&engine).await;
    seed_accounts(&engine, currency_id, &["Dup", "Dup"]).await;

    let err = engine
        .change_account_position_by_title("Dup", 1, "alice")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::NotFound("account title 'Dup' is ambiguous".to_string())
    );
}

#[tokio::test]
async fn missing_old_position_is_out_of_range() {
    let engine = engine_with_db().await;
    let currency_id = seed_currency(&engine).await;
    seed_accounts(&engine, currency_id, &["A", "B"]).await;

    // Position 2 is a valid target, but nothing sits at position 5.
    let err = engine
        .change_account_position_at(AccountKind::Current, 5, 2, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::OutOfRange(_)));
}
