use api_types::{
    ErrorBody,
    page::{ListQuery, PageInfo},
};
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{EngineError, Money, Pagination, RecordQuery};
use rust_decimal::Decimal;

pub use auth::{AuthUser, Claims, TokenError, TokenSigner};
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod assets;
mod auth;
mod cashflow;
mod categories;
mod expenses;
mod incomes;
mod liabilities;
mod periods;
mod server;
mod users;

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Token(TokenError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidPeriod(_)
        | EngineError::InvalidSort(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        EngineError::Configuration(_)
        | EngineError::Crypto(_)
        | EngineError::Authentication(_)
        | EngineError::Decoding(_)
        | EngineError::Parse(_)
        | EngineError::Transaction(_)
        | EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    if err.is_internal() {
        tracing::error!(kind = err.kind(), error = %err, "request failed");
        return "internal server error".to_string();
    }
    err.to_string()
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Token(err) => {
                tracing::error!(error = %err, "token issuing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<TokenError> for ServerError {
    fn from(value: TokenError) -> Self {
        Self::Token(value)
    }
}

/// Whole units of a request amount; fractions are truncated.
fn money(value: Decimal) -> Result<Money, ServerError> {
    Ok(Money::try_from(value)?)
}

fn opt_money(value: Option<Decimal>) -> Result<Option<Money>, ServerError> {
    value.map(money).transpose()
}

fn pagination(page: Option<u64>, limit: Option<u64>, sort: Option<String>) -> Pagination {
    Pagination {
        page,
        limit,
        sort,
    }
}

fn record_query(query: ListQuery) -> RecordQuery {
    RecordQuery {
        period_code: query.period_code,
        search: query.search,
        pagination: pagination(query.page, query.limit, query.sort),
    }
}

fn page_info(info: engine::PageInfo) -> PageInfo {
    PageInfo {
        page: info.page,
        total_pages: info.total_pages,
        total_rows: info.total_rows,
        current_rows_count: info.current_rows_count,
    }
}
