mod common;

use sea_orm::{ConnectionTrait, Statement};

use common::{category_id, engine_with_db, register, ymd};
use engine::{
    CategoryKind, EngineError, ExpenseCmd, ExpenseItem, LiabilityItem, Money, RecordQuery,
};

const PERIOD: &str = "2024-05";

async fn liability_value(engine: &engine::Engine, user_id: i64, id: i64) -> Money {
    engine.liability(user_id, id).await.unwrap().value
}

async fn single_liability(engine: &engine::Engine, user_id: i64, value: i64) -> i64 {
    engine
        .replace_liabilities_for_period(
            user_id,
            PERIOD,
            vec![LiabilityItem::new("Car loan", Money::new(value), 1).installment(Money::new(50_000))],
        )
        .await
        .unwrap()[0]
}

#[tokio::test]
async fn linked_expense_round_trip_restores_balance() {
    let (engine, _db) = engine_with_db().await;
    let user_id = register(&engine, "alice").await;
    let loan = single_liability(&engine, user_id, 1_000_000).await;

    let outcome = engine
        .replace_expenses_for_period(
            user_id,
            PERIOD,
            vec![ExpenseItem::new("Car payment", Money::new(200_000), 1).liability(loan)],
        )
        .await
        .unwrap();
    assert!(outcome.refetch_liability);
    assert_eq!(liability_value(&engine, user_id, loan).await, Money::new(800_000));

    let outcome = engine
        .replace_expenses_for_period(user_id, PERIOD, Vec::new())
        .await
        .unwrap();
    assert!(outcome.refetch_liability);
    assert_eq!(liability_value(&engine, user_id, loan).await, Money::new(1_000_000));
}

#[tokio::test]
async fn replacing_with_same_items_is_idempotent() {
    let (engine, _db) = engine_with_db().await;
    let user_id = register(&engine, "alice").await;
    let loan = single_liability(&engine, user_id, 1_000_000).await;
    let items = || {
        vec![
            ExpenseItem::new("Car payment", Money::new(150_000), 1).liability(loan),
            ExpenseItem::new("Extra", Money::new(50_000), 2).liability(loan),
        ]
    };

    engine
        .replace_expenses_for_period(user_id, PERIOD, items())
        .await
        .unwrap();
    engine
        .replace_expenses_for_period(user_id, PERIOD, items())
        .await
        .unwrap();

    assert_eq!(liability_value(&engine, user_id, loan).await, Money::new(800_000));
    let page = engine
        .list_expenses(user_id, &RecordQuery::new().period_code(PERIOD))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].name, "Car payment");
}

#[tokio::test]
async fn unlinked_expenses_do_not_touch_liabilities() {
    let (engine, _db) = engine_with_db().await;
    let user_id = register(&engine, "alice").await;
    let loan = single_liability(&engine, user_id, 1_000_000).await;
    let food = category_id(&engine, user_id, CategoryKind::Expense, "Food").await;

    let outcome = engine
        .replace_expenses_for_period(
            user_id,
            PERIOD,
            vec![ExpenseItem::new("Groceries", Money::new(30_000), 1).category(food)],
        )
        .await
        .unwrap();

    assert!(!outcome.refetch_liability);
    assert_eq!(liability_value(&engine, user_id, loan).await, Money::new(1_000_000));
}

#[tokio::test]
async fn foreign_liability_is_rejected_and_nothing_is_written() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;
    let bobs_loan = single_liability(&engine, bob, 500_000).await;

    let err = engine
        .replace_expenses_for_period(
            alice,
            PERIOD,
            vec![ExpenseItem::new("Sneaky", Money::new(100_000), 1).liability(bobs_loan)],
        )
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::KeyNotFound("liability not exists".to_string()));
    assert_eq!(liability_value(&engine, bob, bobs_loan).await, Money::new(500_000));
    let page = engine
        .list_expenses(alice, &RecordQuery::new().period_code(PERIOD))
        .await
        .unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn deleting_a_liability_unlinks_its_expenses() {
    let (engine, _db) = engine_with_db().await;
    let user_id = register(&engine, "alice").await;
    let loan = single_liability(&engine, user_id, 1_000_000).await;

    engine
        .replace_expenses_for_period(
            user_id,
            PERIOD,
            vec![ExpenseItem::new("Car payment", Money::new(200_000), 1).liability(loan)],
        )
        .await
        .unwrap();
    engine
        .replace_liabilities_for_period(user_id, PERIOD, Vec::new())
        .await
        .unwrap();

    let page = engine
        .list_expenses(user_id, &RecordQuery::new().period_code(PERIOD))
        .await
        .unwrap();
    assert_eq!(page.items[0].liability_id, None);

    let outcome = engine
        .replace_expenses_for_period(user_id, PERIOD, Vec::new())
        .await
        .unwrap();
    assert!(!outcome.refetch_liability);
}

#[tokio::test]
async fn failed_balance_write_rolls_back_the_expenses() {
    let (engine, db) = engine_with_db().await;
    let user_id = register(&engine, "alice").await;
    let loan = single_liability(&engine, user_id, 1_000_000).await;
    let food = category_id(&engine, user_id, CategoryKind::Expense, "Food").await;

    engine
        .replace_expenses_for_period(
            user_id,
            PERIOD,
            vec![ExpenseItem::new("Groceries", Money::new(30_000), 1).category(food)],
        )
        .await
        .unwrap();

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "CREATE TRIGGER block_liability_update BEFORE UPDATE ON liabilities \
         BEGIN SELECT RAISE(ABORT, 'simulated failure'); END;",
    ))
    .await
    .unwrap();

    let err = engine
        .replace_expenses_for_period(
            user_id,
            PERIOD,
            vec![ExpenseItem::new("Car payment", Money::new(200_000), 1).liability(loan)],
        )
        .await
        .unwrap_err();
    assert!(err.is_internal());

    let page = engine
        .list_expenses(user_id, &RecordQuery::new().period_code(PERIOD))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Groceries");
    assert_eq!(liability_value(&engine, user_id, loan).await, Money::new(1_000_000));
}

#[tokio::test]
async fn single_expense_mutations_reconcile() {
    let (engine, _db) = engine_with_db().await;
    let user_id = register(&engine, "alice").await;
    let loan = single_liability(&engine, user_id, 1_000_000).await;
    let other = engine
        .replace_liabilities_for_period(
            user_id,
            PERIOD,
            vec![
                LiabilityItem::new("Car loan", Money::new(1_000_000), 1).id(loan),
                LiabilityItem::new("Mortgage", Money::new(5_000_000), 2),
            ],
        )
        .await
        .unwrap()[1];

    let expense = engine
        .add_expense(ExpenseCmd::new(user_id, ymd(2024, 5, 10), Money::new(100_000)).liability(loan))
        .await
        .unwrap();
    assert_eq!(expense.name, "Car loan");
    assert_eq!(expense.period_code, PERIOD);
    assert_eq!(liability_value(&engine, user_id, loan).await, Money::new(900_000));

    engine
        .update_expense(
            expense.id,
            ExpenseCmd::new(user_id, ymd(2024, 5, 10), Money::new(40_000)).liability(other),
        )
        .await
        .unwrap();
    assert_eq!(liability_value(&engine, user_id, loan).await, Money::new(1_000_000));
    assert_eq!(liability_value(&engine, user_id, other).await, Money::new(4_960_000));

    let outcome = engine.delete_expense(user_id, expense.id).await.unwrap();
    assert!(outcome.refetch_liability);
    assert_eq!(liability_value(&engine, user_id, other).await, Money::new(5_000_000));
}

#[tokio::test]
async fn expense_without_category_or_liability_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let user_id = register(&engine, "alice").await;

    let err = engine
        .add_expense(ExpenseCmd::new(user_id, ymd(2024, 5, 10), Money::new(1_000)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn adding_after_the_last_order_number_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let user_id = register(&engine, "alice").await;
    let food = category_id(&engine, user_id, CategoryKind::Expense, "Food").await;

    engine
        .replace_expenses_for_period(
            user_id,
            PERIOD,
            vec![ExpenseItem::new("Groceries", Money::new(30), i32::MAX).category(food)],
        )
        .await
        .unwrap();

    let err = engine
        .add_expense(ExpenseCmd::new(user_id, ymd(2024, 5, 10), Money::new(5)).category(food))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let page = engine
        .list_expenses(user_id, &RecordQuery::new().period_code(PERIOD))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn concurrent_replaces_of_one_period_credit_old_rows_once() {
    let (engine, _db) = engine_with_db().await;
    let user_id = register(&engine, "alice").await;
    let loan = single_liability(&engine, user_id, 1_000_000).await;
    engine
        .replace_expenses_for_period(
            user_id,
            PERIOD,
            vec![ExpenseItem::new("Car payment", Money::new(200_000), 1).liability(loan)],
        )
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        engine.replace_expenses_for_period(
            user_id,
            PERIOD,
            vec![ExpenseItem::new("Car payment", Money::new(300_000), 1).liability(loan)],
        ),
        engine.replace_expenses_for_period(
            user_id,
            PERIOD,
            vec![ExpenseItem::new("Car payment", Money::new(100_000), 1).liability(loan)],
        ),
    );
    first.unwrap();
    second.unwrap();

    let page = engine
        .list_expenses(user_id, &RecordQuery::new().period_code(PERIOD))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    let linked = page.items[0].value;
    assert_eq!(
        liability_value(&engine, user_id, loan).await,
        Money::new(1_000_000 - linked.units())
    );
}
