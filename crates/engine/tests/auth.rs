mod common;

use common::{engine_with_db, register, ymd};
use engine::{CategoryKind, EngineError, RegisterCmd};

#[tokio::test]
async fn register_seeds_default_categories() {
    let (engine, _db) = engine_with_db().await;

    let profile = engine
        .register(RegisterCmd::new("Alice Liddell", " alice ", "wonderland").email("alice@example.com"))
        .await
        .unwrap();
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.email.as_deref(), Some("alice@example.com"));

    for kind in [CategoryKind::Income, CategoryKind::Expense, CategoryKind::Asset] {
        let names: Vec<_> = engine
            .list_categories(profile.id, kind)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names.len(), kind.defaults().len(), "{kind:?}");
        assert!(names.iter().any(|n| n == "Other"));
    }
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    register(&engine, "alice").await;

    let err = engine
        .register(RegisterCmd::new("Other Alice", "alice", "pw"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("alice".to_string()));
}

#[tokio::test]
async fn credentials_are_verified() {
    let (engine, _db) = engine_with_db().await;
    let user_id = register(&engine, "alice").await;

    let profile = engine
        .verify_credentials("alice", "correct horse battery")
        .await
        .unwrap();
    assert_eq!(profile.id, user_id);

    assert_eq!(
        engine.verify_credentials("alice", "wrong").await.unwrap_err(),
        EngineError::InvalidCredentials
    );
    assert_eq!(
        engine.verify_credentials("nobody", "wrong").await.unwrap_err(),
        EngineError::InvalidCredentials
    );
}

#[tokio::test]
async fn categories_are_unique_per_normalized_name() {
    let (engine, _db) = engine_with_db().await;
    let user_id = register(&engine, "alice").await;

    let created = engine
        .new_category(user_id, CategoryKind::Expense, "  Pet   care ")
        .await
        .unwrap();
    assert_eq!(created.name, "Pet care");

    let err = engine
        .new_category(user_id, CategoryKind::Expense, "PET CARE")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("Pet care".to_string()));

    // same name, different kind
    engine
        .new_category(user_id, CategoryKind::Income, "Pet care")
        .await
        .unwrap();
}

#[tokio::test]
async fn period_day_is_stored_per_user() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;

    assert_eq!(engine.period_settings(alice).await.unwrap().day_of_month, 1);

    let settings = engine.set_period_day(alice, 27).await.unwrap();
    assert_eq!(settings.day_of_month, 27);
    assert_eq!(settings.period_code(ymd(2024, 1, 3)), "2023-12");
    engine.set_period_day(alice, 15).await.unwrap();
    assert_eq!(engine.period_settings(alice).await.unwrap().day_of_month, 15);
    assert_eq!(engine.period_settings(bob).await.unwrap().day_of_month, 1);

    assert!(matches!(
        engine.set_period_day(alice, 31).await,
        Err(EngineError::InvalidPeriod(_))
    ));
}
