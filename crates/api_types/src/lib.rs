//! Request and response bodies of the HTTP API.
//!
//! Amounts travel as [`Decimal`]; the server truncates them to whole units.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod page {
    use super::*;

    /// Query string accepted by every ledger list endpoint.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct ListQuery {
        pub period_code: Option<String>,
        pub search: Option<String>,
        pub page: Option<u64>,
        pub limit: Option<u64>,
        /// `"<field> [asc|desc]"`.
        pub sort: Option<String>,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PageInfo {
        pub page: u64,
        pub total_pages: u64,
        pub total_rows: u64,
        pub current_rows_count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ListResponse<T> {
        pub data: Vec<T>,
        pub page: PageInfo,
    }

    /// Body of the `PUT` endpoints that replace a whole period.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReplaceRequest<T> {
        pub period_code: String,
        pub data: Vec<T>,
        /// Ids the client removed locally. Replacement already drops every
        /// row not in `data`, so these are only logged.
        #[serde(default)]
        pub deleted_items: Vec<i64>,
    }
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterRequest {
        pub name: String,
        pub username: String,
        pub email: Option<String>,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub username: String,
        pub password: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i64,
        pub name: String,
        pub username: String,
        pub email: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub token: String,
        pub user: UserView,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: i64,
        /// `income`, `expense` or `asset`.
        pub kind: String,
        pub name: String,
    }
}

pub mod period {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PeriodSettingsView {
        /// First day of every monthly period, 1..=28.
        pub day_of_month: u32,
    }
}

pub mod liability {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct LiabilityView {
        pub id: i64,
        pub period_code: String,
        pub name: String,
        pub value: Decimal,
        pub installment: Option<Decimal>,
        pub order_no: i32,
    }

    /// One row of a liability replace. Rows with an `id` are updated in place.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct LiabilityInput {
        pub id: Option<i64>,
        pub name: String,
        pub value: Decimal,
        pub installment: Option<Decimal>,
        pub order_no: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LiabilityReplaceResponse {
        /// Ids in the order the rows were submitted.
        pub ids: Vec<i64>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: i64,
        pub period_code: String,
        pub category_id: Option<i64>,
        pub liability_id: Option<i64>,
        pub name: String,
        pub date: Option<NaiveDate>,
        pub value: Decimal,
        pub notes: Option<String>,
        pub order_no: i32,
    }

    /// Body of `POST /expenses` and `PATCH /expenses/{id}`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub category_id: Option<i64>,
        pub liability_id: Option<i64>,
        pub date: NaiveDate,
        pub value: Decimal,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseInput {
        pub name: String,
        pub category_id: Option<i64>,
        pub liability_id: Option<i64>,
        pub date: Option<NaiveDate>,
        pub value: Decimal,
        pub notes: Option<String>,
        pub order_no: i32,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ReplaceOutcome {
        /// Liability balances changed; clients should reload them.
        pub refetch_liability: bool,
    }
}

pub mod income {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct IncomeView {
        pub id: i64,
        pub period_code: String,
        pub category_id: Option<i64>,
        pub name: String,
        pub date: Option<NaiveDate>,
        pub value: Decimal,
        pub notes: Option<String>,
        pub order_no: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeNew {
        pub category_id: i64,
        pub date: NaiveDate,
        pub value: Decimal,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeInput {
        pub name: String,
        pub category_id: Option<i64>,
        pub date: Option<NaiveDate>,
        pub value: Decimal,
        pub notes: Option<String>,
        pub order_no: i32,
    }
}

pub mod asset {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct AssetView {
        pub id: i64,
        pub period_code: String,
        pub category_id: Option<i64>,
        pub name: String,
        pub amount: Decimal,
        pub value: Decimal,
        pub notes: Option<String>,
        pub order_no: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssetNew {
        pub period_code: String,
        pub category_id: i64,
        pub amount: Decimal,
        pub value: Decimal,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssetInput {
        pub name: String,
        pub category_id: Option<i64>,
        pub amount: Decimal,
        pub value: Decimal,
        pub notes: Option<String>,
        pub order_no: i32,
    }
}

/// Rows written by a replace that has nothing else to report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceCount {
    pub written: usize,
}

pub mod cashflow {
    use super::*;
    use crate::page::PageInfo;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct CashflowQuery {
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        pub category: Option<String>,
        pub page: Option<u64>,
        pub limit: Option<u64>,
        pub sort: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CashflowEntryView {
        pub id: i64,
        /// `income` or `expense`.
        pub kind: String,
        pub date: Option<NaiveDate>,
        pub category: String,
        pub name: String,
        pub value: Decimal,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashflowBody {
        pub data: Vec<CashflowEntryView>,
        pub total_income: Decimal,
        pub total_expense: Decimal,
        pub total_cashflow: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashflowResponse {
        pub cashflow: CashflowBody,
        pub page: PageInfo,
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
