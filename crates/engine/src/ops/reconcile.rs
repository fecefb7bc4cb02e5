//! Liability reconciliation.
//!
//! A liability's balance moves with the expenses linked to it: an expense that
//! appears debits the liability, one that disappears credits it back. Every
//! mutation of linked expenses goes through the same three steps, inside the
//! caller's transaction:
//!
//! 1. fold the old (credited) and new (debited) linked values into
//!    [`Adjustments`], one entry per liability; the old rows are read under
//!    an exclusive lock so a concurrent replace of the same period waits
//!    instead of crediting them a second time;
//! 2. [`Engine::lock_liabilities`]: lock and read each baseline, in ascending
//!    id order, before any expense row is written;
//! 3. write the expenses, then [`Engine::apply_adjustments`] stores
//!    `baseline + credits - debits` for every locked liability.
//!
//! Locks are always taken in that order: the period's expense rows first, then
//! liabilities by ascending id.

use std::collections::BTreeMap;

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QuerySelect, prelude::*};

use crate::{
    EngineError, ExpenseItem, Money, ResultEngine,
    amount::AmountCodec,
    categories::CategoryKind,
    expenses, liabilities,
};

use super::{Engine, normalize_optional_text, normalize_period_code, normalize_required_name, with_tx};

/// What a caller should refresh after an expense mutation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaceOutcome {
    /// At least one liability balance was rewritten.
    pub refetch_liability: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(super) struct Adjustment {
    credits: Money,
    debits: Money,
    /// A new expense links to the liability, so it must exist.
    required: bool,
}

impl Adjustment {
    fn apply(self, baseline: Money) -> ResultEngine<Money> {
        baseline
            .checked_add(self.credits)
            .and_then(|balance| balance.checked_sub(self.debits))
            .ok_or_else(|| EngineError::InvalidAmount("liability balance overflow".to_string()))
    }
}

/// Pending balance changes keyed by liability id.
///
/// Iteration is in ascending id order, which is also the lock order.
#[derive(Debug, Default)]
pub(super) struct Adjustments(BTreeMap<i64, Adjustment>);

impl Adjustments {
    /// Money returned to a liability because a linked expense goes away.
    pub(super) fn credit(&mut self, liability_id: i64, value: Money) -> ResultEngine<()> {
        let entry = self.0.entry(liability_id).or_default();
        entry.credits = entry
            .credits
            .checked_add(value)
            .ok_or_else(|| EngineError::InvalidAmount("credit overflow".to_string()))?;
        Ok(())
    }

    /// Money paid down on a liability because a linked expense now exists.
    pub(super) fn debit(&mut self, liability_id: i64, value: Money) -> ResultEngine<()> {
        let entry = self.0.entry(liability_id).or_default();
        entry.debits = entry
            .debits
            .checked_add(value)
            .ok_or_else(|| EngineError::InvalidAmount("debit overflow".to_string()))?;
        entry.required = true;
        Ok(())
    }
}

/// A liability locked for the rest of the transaction, with its decrypted
/// balance before any adjustment.
#[derive(Debug)]
pub(super) struct LockedLiability {
    pub(super) model: liabilities::Model,
    baseline: Money,
    adjustment: Adjustment,
}

impl Engine {
    /// Replaces every expense of a period and reconciles the liabilities the
    /// old and new rows link to, all in one transaction.
    ///
    /// Running it twice with the same items yields the same end state.
    pub async fn replace_expenses_for_period(
        &self,
        user_id: i64,
        period_code: &str,
        items: Vec<ExpenseItem>,
    ) -> ResultEngine<ReplaceOutcome> {
        let period_code = normalize_period_code(period_code)?;
        let codec = self.codec(user_id);
        let submitted = items.len();

        let outcome = with_tx!(self, |db_tx| {
            let old_linked = expenses::Entity::find()
                .filter(expenses::Column::UserId.eq(user_id))
                .filter(expenses::Column::PeriodCode.eq(period_code.as_str()))
                .filter(expenses::Column::LiabilityId.is_not_null())
                .lock_exclusive()
                .all(&db_tx)
                .await?;

            let mut adjustments = Adjustments::default();
            for row in &old_linked {
                if let Some(liability_id) = row.liability_id {
                    adjustments.credit(liability_id, codec.decode(&row.value)?)?;
                }
            }

            let mut rows = Vec::with_capacity(items.len());
            for item in items {
                let name = normalize_required_name(&item.name, "expense")?;
                Self::check_category(&db_tx, user_id, CategoryKind::Expense, item.category_id)
                    .await?;
                if let Some(liability_id) = item.liability_id {
                    adjustments.debit(liability_id, item.value)?;
                }
                rows.push(expenses::ActiveModel {
                    id: ActiveValue::NotSet,
                    user_id: ActiveValue::Set(user_id),
                    period_code: ActiveValue::Set(period_code.clone()),
                    category_id: ActiveValue::Set(item.category_id),
                    liability_id: ActiveValue::Set(item.liability_id),
                    name: ActiveValue::Set(name),
                    date: ActiveValue::Set(item.date),
                    value: ActiveValue::Set(codec.encode(item.value)?),
                    notes: ActiveValue::Set(normalize_optional_text(item.notes.as_deref())),
                    order_no: ActiveValue::Set(item.order_no),
                });
            }

            let locked = Self::lock_liabilities(&db_tx, user_id, &codec, adjustments).await?;

            expenses::store::delete_by_period(&db_tx, user_id, &period_code).await?;
            expenses::store::bulk_insert(&db_tx, rows).await?;

            let touched = Self::apply_adjustments(&db_tx, user_id, &codec, locked).await?;
            Ok(ReplaceOutcome {
                refetch_liability: touched > 0,
            })
        })?;

        tracing::info!(
            user_id,
            period_code = %period_code,
            expenses = submitted,
            refetch_liability = outcome.refetch_liability,
            "expenses replaced"
        );
        Ok(outcome)
    }

    /// Locks every liability named in `adjustments` and reads its baseline.
    ///
    /// A liability that only receives credits and no longer exists is skipped;
    /// one a new expense links to must exist and belong to `user_id`.
    pub(super) async fn lock_liabilities(
        db_tx: &DatabaseTransaction,
        user_id: i64,
        codec: &AmountCodec<'_>,
        adjustments: Adjustments,
    ) -> ResultEngine<Vec<LockedLiability>> {
        let mut locked = Vec::with_capacity(adjustments.0.len());
        for (liability_id, adjustment) in adjustments.0 {
            let model =
                match liabilities::store::get_by_id_for_update(db_tx, liability_id, user_id).await {
                    Ok(model) => model,
                    Err(EngineError::KeyNotFound(_)) if !adjustment.required => {
                        tracing::warn!(
                            user_id,
                            liability_id,
                            credits = %adjustment.credits,
                            "skipping credit to a liability that no longer exists"
                        );
                        continue;
                    }
                    Err(err) => return Err(err),
                };
            let baseline = codec.decode(&model.value)?;
            locked.push(LockedLiability {
                model,
                baseline,
                adjustment,
            });
        }
        Ok(locked)
    }

    /// Writes the adjusted balance of every locked liability and returns how
    /// many were written.
    pub(super) async fn apply_adjustments(
        db_tx: &DatabaseTransaction,
        user_id: i64,
        codec: &AmountCodec<'_>,
        locked: Vec<LockedLiability>,
    ) -> ResultEngine<usize> {
        let touched = locked.len();
        for liability in locked {
            let balance = liability.adjustment.apply(liability.baseline)?;
            let changes = liabilities::ActiveModel {
                value: ActiveValue::Set(codec.encode(balance)?),
                ..Default::default()
            };
            liabilities::store::update_by_id(db_tx, liability.model.id, user_id, changes).await?;
            tracing::debug!(
                user_id,
                liability_id = liability.model.id,
                "liability balance reconciled"
            );
        }
        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjustments_accumulate_per_liability() {
        let mut adjustments = Adjustments::default();
        adjustments.debit(7, Money::new(100)).unwrap();
        adjustments.debit(7, Money::new(50)).unwrap();
        adjustments.credit(7, Money::new(30)).unwrap();
        adjustments.credit(3, Money::new(10)).unwrap();

        let entries: Vec<_> = adjustments.0.into_iter().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, 3);
        assert!(!entries[0].1.required);
        assert_eq!(entries[1].0, 7);
        assert_eq!(entries[1].1.debits, Money::new(150));
        assert_eq!(entries[1].1.credits, Money::new(30));
        assert!(entries[1].1.required);
    }

    #[test]
    fn balance_is_baseline_plus_credits_minus_debits() {
        let adjustment = Adjustment {
            credits: Money::new(200_000),
            debits: Money::new(50_000),
            required: true,
        };
        assert_eq!(
            adjustment.apply(Money::new(800_000)).unwrap(),
            Money::new(950_000)
        );
    }

    #[test]
    fn balance_overflow_is_rejected() {
        let adjustment = Adjustment {
            credits: Money::new(1),
            debits: Money::ZERO,
            required: false,
        };
        assert!(matches!(
            adjustment.apply(Money::new(i64::MAX)),
            Err(EngineError::InvalidAmount(_))
        ));
    }
}
