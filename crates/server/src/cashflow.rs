//! Cashflow API endpoint

use api_types::cashflow::{CashflowBody, CashflowEntryView, CashflowQuery, CashflowResponse};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use engine::CashflowEntry;

use crate::{AuthUser, ServerError, page_info, pagination, server::ServerState};

fn view(entry: CashflowEntry) -> CashflowEntryView {
    CashflowEntryView {
        id: entry.id,
        kind: entry.kind.as_str().to_string(),
        date: entry.date,
        category: entry.category,
        name: entry.name,
        value: entry.value.to_decimal(),
        notes: entry.notes,
    }
}

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<CashflowQuery>,
) -> Result<Json<CashflowResponse>, ServerError> {
    let query = engine::CashflowQuery {
        start_date: query.start_date,
        end_date: query.end_date,
        category: query.category,
        pagination: pagination(query.page, query.limit, query.sort),
    };
    let cashflow = state.engine.list_cashflow(user.id, &query).await?;

    Ok(Json(CashflowResponse {
        cashflow: CashflowBody {
            data: cashflow.entries.items.into_iter().map(view).collect(),
            total_income: cashflow.total_income.to_decimal(),
            total_expense: cashflow.total_expense.to_decimal(),
            total_cashflow: cashflow.total_cashflow.to_decimal(),
        },
        page: page_info(cashflow.entries.info),
    }))
}
