//! Bookkeeping engine: encrypted ledger records and liability reconciliation.
//!
//! Every monetary value is sealed with the user's [`Scope`] before it reaches
//! the database and opened again on read; callers only ever see [`Money`].

pub use amount::{AmountCodec, EncryptedAmount};
pub use assets::Asset;
pub use categories::{Category, CategoryKind};
pub use cipher::{Scope, ValueCipher};
pub use commands::{
    AssetCmd, AssetItem, ExpenseCmd, ExpenseItem, IncomeCmd, IncomeItem, LiabilityItem,
    RegisterCmd,
};
pub use error::EngineError;
pub use expenses::Expense;
pub use incomes::Income;
pub use liabilities::Liability;
pub use money::Money;
pub use ops::{
    Cashflow, CashflowEntry, CashflowKind, CashflowQuery, Engine, EngineBuilder, PeriodSettings,
    ReplaceOutcome,
};
pub use pagination::{Page, PageInfo, Pagination, SortDirection, SortKey};
pub use store::RecordQuery;
pub use users::UserProfile;
pub use util::period_code_for;

mod amount;
mod assets;
mod categories;
mod cipher;
mod commands;
mod error;
mod expenses;
mod incomes;
mod liabilities;
mod money;
mod ops;
mod pagination;
mod period_settings;
mod store;
mod users;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
