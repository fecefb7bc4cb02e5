use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{Engine, ValueCipher};
use server::{ServerState, TokenSigner, router};

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .cipher(ValueCipher::new(Some("api-test-key")))
        .build()
        .await
        .unwrap();
    let signer = TokenSigner::new(b"api-test-token-key", 1).unwrap();
    router(ServerState::new(engine, signer))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn login(app: &Router, username: &str) -> String {
    let (status, _) = send(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({"name": username, "username": username, "password": "s3cret"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"username": username, "password": "s3cret"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], username);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn private_routes_require_a_valid_token() {
    let app = app().await;

    let (status, _) = send(&app, Method::GET, "/cashflow", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/cashflow", Some("forged.token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&app, "alice").await;
    let (status, body) = send(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn wrong_password_is_401_and_duplicate_user_is_409() {
    let app = app().await;
    login(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"username": "alice", "password": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid username or password");

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({"name": "Alice", "username": "alice", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn expense_replace_reconciles_liabilities() {
    let app = app().await;
    let token = login(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/liabilities",
        Some(&token),
        Some(json!({
            "period_code": "2024-05",
            "data": [{"name": "Car loan", "value": 1000000, "installment": "50000", "order_no": 1}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let loan = body["ids"][0].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        "/expenses",
        Some(&token),
        Some(json!({
            "period_code": "2024-05",
            "data": [{"name": "Car payment", "liability_id": loan, "value": "200000", "order_no": 1}],
            "deleted_items": [99]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["refetch_liability"], true);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/liabilities/{loan}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "800000");
    assert_eq!(body["installment"], "50000");

    let (status, body) = send(
        &app,
        Method::GET,
        "/expenses?period_code=2024-05&page=1&limit=10",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "Car payment");
    assert_eq!(body["page"]["total_rows"], 1);
    assert_eq!(body["page"]["total_pages"], 1);
}

#[tokio::test]
async fn records_of_other_users_are_not_found() {
    let app = app().await;
    let alice = login(&app, "alice").await;
    let bob = login(&app, "bob").await;

    let (_, categories) = send(&app, Method::GET, "/categories/expense", Some(&alice), None).await;
    let food = categories
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Food")
        .unwrap()["id"]
        .clone();

    let (status, expense) = send(
        &app,
        Method::POST,
        "/expenses",
        Some(&alice),
        Some(json!({"category_id": food, "date": "2024-05-10", "value": "12.99"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["value"], "12");
    assert_eq!(expense["period_code"], "2024-05");
    let id = expense["id"].as_i64().unwrap();

    let (status, _) = send(&app, Method::GET, &format!("/expenses/{id}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &format!("/expenses/{id}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::DELETE, &format!("/expenses/{id}"), Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["refetch_liability"], false);
}

#[tokio::test]
async fn cashflow_reports_totals_and_page() {
    let app = app().await;
    let token = login(&app, "alice").await;

    send(
        &app,
        Method::PUT,
        "/incomes",
        Some(&token),
        Some(json!({
            "period_code": "2024-05",
            "data": [
                {"name": "Salary", "date": "2024-05-01", "value": 5000, "order_no": 1},
                {"name": "Bonus", "date": "2024-05-20", "value": 500, "order_no": 2}
            ]
        })),
    )
    .await;
    send(
        &app,
        Method::PUT,
        "/expenses",
        Some(&token),
        Some(json!({
            "period_code": "2024-05",
            "data": [{"name": "Rent", "date": "2024-05-02", "value": 1200, "order_no": 1}]
        })),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/cashflow?start_date=2024-05-01&end_date=2024-05-31&page=1&limit=2&sort=value%20desc",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cashflow"]["total_income"], "5500");
    assert_eq!(body["cashflow"]["total_expense"], "1200");
    assert_eq!(body["cashflow"]["total_cashflow"], "4300");
    assert_eq!(body["cashflow"]["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["cashflow"]["data"][0]["kind"], "income");
    assert_eq!(body["page"]["total_rows"], 3);

    let (status, _) = send(&app, Method::GET, "/cashflow?sort=notes", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn period_settings_round_trip() {
    let app = app().await;
    let token = login(&app, "alice").await;

    let (status, body) = send(&app, Method::GET, "/period", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["day_of_month"], 1);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/period",
        Some(&token),
        Some(json!({"day_of_month": 29})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/period",
        Some(&token),
        Some(json!({"day_of_month": 25})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["day_of_month"], 25);
}

#[tokio::test]
async fn spawned_server_answers_over_tcp() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    let signer = TokenSigner::new(b"tcp-test", 1).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = server::spawn_with_listener(engine, signer, listener).unwrap();

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /cashflow HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 401"), "{response}");
}
