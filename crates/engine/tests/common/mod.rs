#![allow(dead_code)]

use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

use engine::{CategoryKind, Engine, RegisterCmd, ValueCipher};
use migration::MigratorTrait;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .cipher(ValueCipher::new(Some("integration-test-key")))
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn register(engine: &Engine, username: &str) -> i64 {
    engine
        .register(RegisterCmd::new(username, username, "correct horse battery"))
        .await
        .unwrap()
        .id
}

pub async fn category_id(engine: &Engine, user_id: i64, kind: CategoryKind, name: &str) -> i64 {
    engine
        .list_categories(user_id, kind)
        .await
        .unwrap()
        .into_iter()
        .find(|category| category.name == name)
        .unwrap_or_else(|| panic!("default category {name} missing"))
        .id
}

pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
