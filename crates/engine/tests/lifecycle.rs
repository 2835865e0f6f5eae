use engine::{
    AccountChanges, AccountFilter, AccountKind, Engine, EngineError, EntityState, NewAccount,
    NewCurrency,
};
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

fn current_account(title: &str, currency_id: i32) -> NewAccount {
    NewAccount {
        title: title.to_string(),
        kind: AccountKind::Current,
        amount: 0,
        currency_id,
        closed: false,
    }
}

#[tokio::test]
async fn create_stamps_audit_fields_and_appends() {
    let engine = engine_with_db().await;
    let currency_id = seed_currency(&engine).await;

    let first = engine
        .new_account(current_account("Cash", currency_id), "alice")
        .await
        .unwrap();
    let second = engine
        .new_account(current_account("Bank", currency_id), "alice")
        .await
        .unwrap();

    assert_eq!(first.position, 1);
    assert_eq!(second.position, 2);
    assert_eq!(first.created_by, "alice");
    assert_eq!(first.update_time, None);
    assert_eq!(first.updated_by, None);
    assert_eq!(first.delete_time, None);
}

#[tokio::test]
async fn update_stamps_and_keeps_position() {
    let engine = engine_with_db().await;
    let currency_id = seed_currency(&engine).await;
    let account = engine
        .new_account(current_account("Cash", currency_id), "alice")
        .await
        .unwrap();

    let updated = engine
        .update_account(
            account.id,
            AccountChanges {
                title: Some("Wallet".to_string()),
                ..Default::default()
            },
            "bob",
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Wallet");
    assert_eq!(updated.position, account.position);
    assert_eq!(updated.created_by, "alice");
    assert_eq!(updated.updated_by, Some("bob".to_string()));
    assert!(updated.update_time.is_some());
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let engine = engine_with_db().await;
    let currency_id = seed_currency(&engine).await;

    let err = engine
        .new_account(current_account("   ", currency_id), "alice")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("account title must not be empty".to_string())
    );
}

#[tokio::test]
async fn create_requires_active_currency() {
    let engine = engine_with_db().await;

    let err = engine
        .new_account(current_account("Cash", 99), "alice")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("currency not exists".to_string()));
}

#[tokio::test]
async fn soft_delete_closes_gap_and_restore_appends() {
    let engine = engine_with_db().await;
    let currency_id = seed_currency(&engine).await;
    let _a = engine
        .new_account(current_account("A", currency_id), "alice")
        .await
        .unwrap();
    let b = engine
        .new_account(current_account("B", currency_id), "alice")
        .await
        .unwrap();
    let _c = engine
        .new_account(current_account("C", currency_id), "alice")
        .await
        .unwrap();

    engine.delete_account(b.id, true, "alice").await.unwrap();

    let active = engine.accounts(AccountFilter::default()).await.unwrap();
    let titles: Vec<&str> = active.iter().map(|a| a.title.as_str()).collect();
    let positions: Vec<i32> = active.iter().map(|a| a.position).collect();
    assert_eq!(titles, ["A", "C"]);
    assert_eq!(positions, [1, 2]);

    let stored = engine.account(b.id).await.unwrap();
    assert!(stored.delete_time.is_some());
    assert_eq!(stored.deleted_by, Some("alice".to_string()));

    let restored = engine.restore_account(b.id, "bob").await.unwrap();
    assert_eq!(restored.position, 3);
    assert_eq!(restored.title, "B");
    assert_eq!(restored.delete_time, None);
    assert_eq!(restored.deleted_by, None);
    assert_eq!(restored.updated_by, Some("bob".to_string()));
}

#[tokio::test]
async fn restore_of_active_record_is_invalid() {
    let engine = engine_with_db().await;
    let currency_id = seed_currency(&engine).await;
    let account = engine
        .new_account(current_account("Cash", currency_id), "alice")
        .await
        .unwrap();

    let err = engine.restore_account(account.id, "alice").await.unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidState("account is not deleted".to_string())
    );
}

#[tokio::test]
async fn hard_delete_removes_the_row() {
    let engine = engine_with_db().await;
    let currency_id = seed_currency(&engine).await;
    let account = engine
        .new_account(current_account("Cash", currency_id), "alice")
        .await
        .unwrap();

    engine.delete_account(account.id, false, "alice").await.unwrap();

    let err = engine.account(account.id).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("account not exists".to_string()));
}

#[tokio::test]
async fn updating_a_deleted_record_reports_not_found() {
    let engine = engine_with_db().await;
    let currency_id = seed_currency(&engine).await;
    let account = engine
        .new_account(current_account("Cash", currency_id), "alice")
        .await
        .unwrap();
    engine.delete_account(account.id, true, "alice").await.unwrap();

    let err = engine
        .update_account(
            account.id,
            AccountChanges {
                amount: Some(100),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("account not exists".to_string()));
}

#[tokio::test]
async fn state_filter_splits_active_and_deleted() {
    let engine = engine_with_db().await;
    let currency_id = seed_currency(&engine).await;
    let a = engine
        .new_account(current_account("A", currency_id), "alice")
        .await
        .unwrap();
    let _b = engine
        .new_account(current_account("B", currency_id), "alice")
        .await
        .unwrap();
    engine.delete_account(a.id, true, "alice").await.unwrap();

    let deleted = engine
        .accounts(AccountFilter {
            state: EntityState::Deleted,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0].title, "A");

    let all_count = engine
        .account_count(AccountFilter {
            state: EntityState::All,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(all_count, 2);
}

#[tokio::test]
async fn kind_change_reseats_account_in_target_ordering() {
    let engine = engine_with_db().await;
    let currency_id = seed_currency(&engine).await;
    let current = engine
        .new_account(current_account("Everyday", currency_id), "alice")
        .await
        .unwrap();
    engine
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

    let moved = engine
        .update_account(
            current.id,
            AccountChanges {
                kind: Some(AccountKind::Savings),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();

    assert_eq!(moved.kind, "savings");
    assert_eq!(moved.position, 2);
}
