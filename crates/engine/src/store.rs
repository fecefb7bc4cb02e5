//! Ledger record store.
//!
//! Assets, liabilities, incomes and expenses share the same persistence
//! surface. [`ledger_store!`] generates it inside each entity module as a
//! `store` submodule, so every record kind gets identical semantics:
//!
//! - mutators take `&DatabaseTransaction` and cannot run outside a transaction;
//! - every lookup is scoped by `user_id`, so a foreign row is indistinguishable
//!   from a missing one (`KeyNotFound`);
//! - `get_by_id_for_update` takes an exclusive row lock for the rest of the
//!   transaction, and `update_by_id` / `delete_by_id` take it before writing.
//!
//! The entity module must define `Entity`, `Model`, `ActiveModel` and the
//! columns `Id`, `UserId`, `PeriodCode`, `Name`, `OrderNo`.

use crate::pagination::Pagination;

/// Filters for listing one record kind.
#[derive(Clone, Debug, Default)]
pub struct RecordQuery {
    pub period_code: Option<String>,
    /// Substring match on the record name.
    pub search: Option<String>,
    pub pagination: Pagination,
}

impl RecordQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn period_code(mut self, period_code: impl Into<String>) -> Self {
        self.period_code = Some(period_code.into());
        self
    }

    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    #[must_use]
    pub fn pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }
}

/// Generates the `store` submodule for a ledger entity.
///
/// `$label` names the record in `KeyNotFound` messages; the list holds the
/// columns a caller may sort by (never an encrypted column).
macro_rules! ledger_store {
    ($label:literal, [$($sortable:literal),* $(,)?]) => {
        #[allow(dead_code)]
        pub(crate) mod store {
            use std::str::FromStr;

            use sea_orm::{
                ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseTransaction,
                EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
            };

            use super::{ActiveModel, Column, Entity, Model};
            use crate::{EngineError, ResultEngine, store::RecordQuery};

            const LABEL: &str = $label;
            const SORTABLE: &[&str] = &[$($sortable),*];

            fn not_found() -> EngineError {
                EngineError::KeyNotFound(format!("{LABEL} not exists"))
            }

            /// Inserts one row and returns its id.
            pub(crate) async fn insert(
                db_tx: &DatabaseTransaction,
                model: ActiveModel,
            ) -> ResultEngine<i64> {
                Ok(model.insert(db_tx).await?.id)
            }

            /// Inserts all rows in one statement. An empty set is a no-op.
            pub(crate) async fn bulk_insert(
                db_tx: &DatabaseTransaction,
                models: Vec<ActiveModel>,
            ) -> ResultEngine<()> {
                if models.is_empty() {
                    return Ok(());
                }
                Entity::insert_many(models)
                    .exec_without_returning(db_tx)
                    .await?;
                Ok(())
            }

            /// Lists a user's rows, returning the page and the unpaged row count.
            pub(crate) async fn get_by_period<C: ConnectionTrait>(
                db: &C,
                user_id: i64,
                query: &RecordQuery,
            ) -> ResultEngine<(Vec<Model>, u64)> {
                let mut select = Entity::find().filter(Column::UserId.eq(user_id));
                if let Some(period_code) = &query.period_code {
                    select = select.filter(Column::PeriodCode.eq(period_code.as_str()));
                }
                if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                    select = select.filter(Column::Name.contains(search));
                }

                let total_rows = select.clone().count(db).await?;

                select = match query.pagination.sort_key()? {
                    Some(key) => {
                        let column = SORTABLE
                            .contains(&key.field.as_str())
                            .then(|| Column::from_str(&key.field).ok())
                            .flatten()
                            .ok_or_else(|| {
                                EngineError::InvalidSort(format!(
                                    "cannot sort {LABEL} by '{}'",
                                    key.field
                                ))
                            })?;
                        select.order_by(column, key.direction.into())
                    }
                    None => select.order_by_asc(Column::OrderNo),
                };
                select = select.order_by_asc(Column::Id);

                if let Some((offset, limit)) = query.pagination.window() {
                    select = select.offset(offset).limit(limit);
                }

                Ok((select.all(db).await?, total_rows))
            }

            /// Reads one row without locking it.
            pub(crate) async fn get_by_id<C: ConnectionTrait>(
                db: &C,
                id: i64,
                user_id: i64,
            ) -> ResultEngine<Model> {
                Entity::find_by_id(id)
                    .filter(Column::UserId.eq(user_id))
                    .one(db)
                    .await?
                    .ok_or_else(not_found)
            }

            /// Reads one row and holds a write-intent lock on it until the
            /// transaction ends.
            pub(crate) async fn get_by_id_for_update(
                db_tx: &DatabaseTransaction,
                id: i64,
                user_id: i64,
            ) -> ResultEngine<Model> {
                Entity::find_by_id(id)
                    .filter(Column::UserId.eq(user_id))
                    .lock_exclusive()
                    .one(db_tx)
                    .await?
                    .ok_or_else(not_found)
            }

            /// Applies the fields set in `changes` to the row `id`.
            pub(crate) async fn update_by_id(
                db_tx: &DatabaseTransaction,
                id: i64,
                user_id: i64,
                mut changes: ActiveModel,
            ) -> ResultEngine<Model> {
                get_by_id_for_update(db_tx, id, user_id).await?;
                changes.id = ActiveValue::Unchanged(id);
                changes.user_id = ActiveValue::NotSet;
                Ok(changes.update(db_tx).await?)
            }

            /// Deletes one row, returning it as it was.
            pub(crate) async fn delete_by_id(
                db_tx: &DatabaseTransaction,
                id: i64,
                user_id: i64,
            ) -> ResultEngine<Model> {
                let model = get_by_id_for_update(db_tx, id, user_id).await?;
                Entity::delete_by_id(id).exec(db_tx).await?;
                Ok(model)
            }

            pub(crate) async fn delete_by_period(
                db_tx: &DatabaseTransaction,
                user_id: i64,
                period_code: &str,
            ) -> ResultEngine<u64> {
                let result = Entity::delete_many()
                    .filter(Column::UserId.eq(user_id))
                    .filter(Column::PeriodCode.eq(period_code))
                    .exec(db_tx)
                    .await?;
                Ok(result.rows_affected)
            }

            /// Deletes the period's rows whose id is not in `keep_ids`.
            pub(crate) async fn delete_except(
                db_tx: &DatabaseTransaction,
                user_id: i64,
                period_code: &str,
                keep_ids: &[i64],
            ) -> ResultEngine<u64> {
                let mut delete = Entity::delete_many()
                    .filter(Column::UserId.eq(user_id))
                    .filter(Column::PeriodCode.eq(period_code));
                if !keep_ids.is_empty() {
                    delete = delete.filter(Column::Id.is_not_in(keep_ids.iter().copied()));
                }
                Ok(delete.exec(db_tx).await?.rows_affected)
            }

            /// The `order_no` that appends a row at the end of a period.
            pub(crate) async fn next_order_no(
                db_tx: &DatabaseTransaction,
                user_id: i64,
                period_code: &str,
            ) -> ResultEngine<i32> {
                let max: Option<Option<i32>> = Entity::find()
                    .select_only()
                    .column_as(Column::OrderNo.max(), "max_order_no")
                    .filter(Column::UserId.eq(user_id))
                    .filter(Column::PeriodCode.eq(period_code))
                    .into_tuple()
                    .one(db_tx)
                    .await?;
                match max.flatten() {
                    None => Ok(1),
                    Some(order_no) => order_no.checked_add(1).ok_or_else(|| {
                        EngineError::InvalidAmount(format!(
                            "{LABEL} order number overflows in period '{period_code}'"
                        ))
                    }),
                }
            }
        }
    };
}

pub(crate) use ledger_store;
