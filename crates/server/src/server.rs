use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    assets, auth, cashflow, categories, expenses, incomes, liabilities, periods, users,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub signer: Arc<auth::TokenSigner>,
}

impl ServerState {
    pub fn new(engine: Engine, signer: auth::TokenSigner) -> Self {
        Self {
            engine: Arc::new(engine),
            signer: Arc::new(signer),
        }
    }
}

pub fn router(state: ServerState) -> Router {
    let private = Router::new()
        .route("/auth/me", get(users::me))
        .route(
            "/categories/{kind}",
            get(categories::list).post(categories::create),
        )
        .route("/period", get(periods::get).put(periods::set))
        .route(
            "/liabilities",
            get(liabilities::list).put(liabilities::replace),
        )
        .route("/liabilities/{id}", get(liabilities::get))
        .route(
            "/expenses",
            get(expenses::list)
                .post(expenses::create)
                .put(expenses::replace),
        )
        .route(
            "/expenses/{id}",
            get(expenses::get)
                .patch(expenses::update)
                .delete(expenses::delete),
        )
        .route(
            "/incomes",
            get(incomes::list).post(incomes::create).put(incomes::replace),
        )
        .route(
            "/incomes/{id}",
            get(incomes::get)
                .patch(incomes::update)
                .delete(incomes::delete),
        )
        .route(
            "/assets",
            get(assets::list).post(assets::create).put(assets::replace),
        )
        .route(
            "/assets/{id}",
            get(assets::get).patch(assets::update).delete(assets::delete),
        )
        .route("/cashflow", get(cashflow::list))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_user,
        ));

    Router::new()
        .route("/auth/register", post(users::register))
        .route("/auth/login", post(users::login))
        .merge(private)
        .with_state(state)
}

/// Binds `addr` and serves until the listener fails.
pub async fn run(
    engine: Engine,
    signer: auth::TokenSigner,
    addr: &str,
) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_with_listener(engine, signer, listener).await
}

pub async fn run_with_listener(
    engine: Engine,
    signer: auth::TokenSigner,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(ServerState::new(engine, signer))).await
}

pub fn spawn_with_listener(
    engine: Engine,
    signer: auth::TokenSigner,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, signer, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
