//! Cashflow: incomes and expenses merged into one dated view.
//!
//! Both sides are read concurrently, decrypted, tagged with their
//! [`CashflowKind`] and merged in memory, since ordering by decrypted value
//! cannot happen in SQL. Totals cover the whole date range and ignore the
//! category filter and the page window.

use std::cmp::Ordering;

use chrono::NaiveDate;
use sea_orm::{QueryFilter, prelude::*};

use crate::{
    EngineError, Money, ResultEngine,
    amount::AmountCodec,
    categories, expenses, incomes,
    pagination::{Page, Pagination, SortDirection, SortKey},
};

use super::Engine;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CashflowKind {
    Income,
    Expense,
}

impl CashflowKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CashflowKind::Income => "income",
            CashflowKind::Expense => "expense",
        }
    }
}

/// One decrypted income or expense.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CashflowEntry {
    pub id: i64,
    pub kind: CashflowKind,
    pub date: Option<NaiveDate>,
    /// Category name, or the record name when it has no category.
    pub category: String,
    pub name: String,
    pub value: Money,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct CashflowQuery {
    /// Inclusive.
    pub start_date: Option<NaiveDate>,
    /// Inclusive.
    pub end_date: Option<NaiveDate>,
    /// Case-insensitive substring of the category label.
    pub category: Option<String>,
    pub pagination: Pagination,
}

impl CashflowQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn between(mut self, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self.end_date = Some(end_date);
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }
}

#[derive(Clone, Debug)]
pub struct Cashflow {
    pub entries: Page<CashflowEntry>,
    pub total_income: Money,
    pub total_expense: Money,
    /// `total_income - total_expense`.
    pub total_cashflow: Money,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CashflowSortField {
    Date,
    Value,
    Category,
    Name,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CashflowSort {
    field: CashflowSortField,
    direction: SortDirection,
}

impl Default for CashflowSort {
    fn default() -> Self {
        Self {
            field: CashflowSortField::Date,
            direction: SortDirection::Desc,
        }
    }
}

impl TryFrom<Option<SortKey>> for CashflowSort {
    type Error = EngineError;

    fn try_from(value: Option<SortKey>) -> Result<Self, Self::Error> {
        let Some(key) = value else {
            return Ok(Self::default());
        };
        let field = match key.field.as_str() {
            "date" => CashflowSortField::Date,
            "value" => CashflowSortField::Value,
            "category" => CashflowSortField::Category,
            "name" => CashflowSortField::Name,
            other => {
                return Err(EngineError::InvalidSort(format!(
                    "cannot sort cashflow by '{other}'"
                )));
            }
        };
        Ok(Self {
            field,
            direction: key.direction,
        })
    }
}

impl CashflowSort {
    fn compare(self, left: &CashflowEntry, right: &CashflowEntry) -> Ordering {
        let ordering = match self.field {
            CashflowSortField::Date => left.date.cmp(&right.date),
            CashflowSortField::Value => left.value.cmp(&right.value),
            CashflowSortField::Category => left
                .category
                .to_lowercase()
                .cmp(&right.category.to_lowercase()),
            CashflowSortField::Name => left.name.to_lowercase().cmp(&right.name.to_lowercase()),
        };
        let ordering = match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        ordering
            .then_with(|| left.kind.cmp(&right.kind))
            .then_with(|| left.id.cmp(&right.id))
    }
}

impl Engine {
    /// Lists incomes and expenses of a date range as one sequence.
    ///
    /// The first value that fails to decrypt aborts the whole call.
    pub async fn list_cashflow(&self, user_id: i64, query: &CashflowQuery) -> ResultEngine<Cashflow> {
        let sort = CashflowSort::try_from(query.pagination.sort_key()?)?;
        let codec = self.codec(user_id);

        let (income_entries, expense_entries) = tokio::try_join!(
            self.income_entries(user_id, query, &codec),
            self.expense_entries(user_id, query, &codec),
        )?;

        let total_income = checked_total(&income_entries)?;
        let total_expense = checked_total(&expense_entries)?;
        let total_cashflow = total_income
            .checked_sub(total_expense)
            .ok_or_else(|| EngineError::InvalidAmount("cashflow total overflow".to_string()))?;

        let needle = query
            .category
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
            .map(str::to_lowercase);
        let mut entries: Vec<CashflowEntry> = income_entries
            .into_iter()
            .chain(expense_entries)
            .filter(|entry| {
                needle
                    .as_deref()
                    .is_none_or(|needle| entry.category.to_lowercase().contains(needle))
            })
            .collect();
        entries.sort_by(|left, right| sort.compare(left, right));

        let total_rows = entries.len() as u64;
        let items = query.pagination.slice(entries);

        Ok(Cashflow {
            entries: Page::new(items, total_rows, &query.pagination),
            total_income,
            total_expense,
            total_cashflow,
        })
    }

    async fn income_entries(
        &self,
        user_id: i64,
        query: &CashflowQuery,
        codec: &AmountCodec<'_>,
    ) -> ResultEngine<Vec<CashflowEntry>> {
        let mut select = incomes::Entity::find().filter(incomes::Column::UserId.eq(user_id));
        if let Some(start_date) = query.start_date {
            select = select.filter(incomes::Column::Date.gte(start_date));
        }
        if let Some(end_date) = query.end_date {
            select = select.filter(incomes::Column::Date.lte(end_date));
        }

        select
            .find_also_related(categories::Entity)
            .all(&self.database)
            .await?
            .into_iter()
            .map(|(model, category)| {
                Ok(CashflowEntry {
                    id: model.id,
                    kind: CashflowKind::Income,
                    date: model.date,
                    category: category.map_or_else(|| model.name.clone(), |c| c.name),
                    value: codec.decode(&model.value)?,
                    name: model.name,
                    notes: model.notes,
                })
            })
            .collect()
    }

    async fn expense_entries(
        &self,
        user_id: i64,
        query: &CashflowQuery,
        codec: &AmountCodec<'_>,
    ) -> ResultEngine<Vec<CashflowEntry>> {
        let mut select = expenses::Entity::find().filter(expenses::Column::UserId.eq(user_id));
        if let Some(start_date) = query.start_date {
            select = select.filter(expenses::Column::Date.gte(start_date));
        }
        if let Some(end_date) = query.end_date {
            select = select.filter(expenses::Column::Date.lte(end_date));
        }

        select
            .find_also_related(categories::Entity)
            .all(&self.database)
            .await?
            .into_iter()
            .map(|(model, category)| {
                Ok(CashflowEntry {
                    id: model.id,
                    kind: CashflowKind::Expense,
                    date: model.date,
                    category: category.map_or_else(|| model.name.clone(), |c| c.name),
                    value: codec.decode(&model.value)?,
                    name: model.name,
                    notes: model.notes,
                })
            })
            .collect()
    }
}

fn checked_total(entries: &[CashflowEntry]) -> ResultEngine<Money> {
    entries.iter().try_fold(Money::ZERO, |total, entry| {
        total
            .checked_add(entry.value)
            .ok_or_else(|| EngineError::InvalidAmount("cashflow total overflow".to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, kind: CashflowKind, day: Option<u32>, value: i64) -> CashflowEntry {
        CashflowEntry {
            id,
            kind,
            date: day.and_then(|day| NaiveDate::from_ymd_opt(2024, 5, day)),
            category: "Food".to_string(),
            name: format!("entry {id}"),
            value: Money::new(value),
            notes: None,
        }
    }

    #[test]
    fn default_sort_is_newest_first_with_undated_last() {
        let mut entries = vec![
            entry(1, CashflowKind::Income, Some(1), 10),
            entry(2, CashflowKind::Expense, None, 5),
            entry(3, CashflowKind::Expense, Some(9), 7),
        ];
        let sort = CashflowSort::default();
        entries.sort_by(|l, r| sort.compare(l, r));
        let ids: Vec<_> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn ties_break_on_kind_then_id() {
        let mut entries = vec![
            entry(4, CashflowKind::Expense, Some(2), 1),
            entry(9, CashflowKind::Income, Some(2), 1),
            entry(2, CashflowKind::Expense, Some(2), 1),
        ];
        let sort = CashflowSort::try_from(SortKey::parse("value asc").unwrap()).unwrap();
        entries.sort_by(|l, r| sort.compare(l, r));
        let keys: Vec<_> = entries.iter().map(|e| (e.kind, e.id)).collect();
        assert_eq!(
            keys,
            vec![
                (CashflowKind::Income, 9),
                (CashflowKind::Expense, 2),
                (CashflowKind::Expense, 4)
            ]
        );
    }

    #[test]
    fn unknown_sort_field_is_rejected() {
        let key = SortKey::parse("notes").unwrap();
        assert!(matches!(
            CashflowSort::try_from(key),
            Err(EngineError::InvalidSort(_))
        ));
    }

    #[test]
    fn totals_are_checked() {
        let entries = vec![
            entry(1, CashflowKind::Income, Some(1), i64::MAX),
            entry(2, CashflowKind::Income, Some(1), 1),
        ];
        assert!(checked_total(&entries).is_err());
        assert_eq!(
            checked_total(&entries[..1]).unwrap(),
            Money::new(i64::MAX)
        );
    }
}
