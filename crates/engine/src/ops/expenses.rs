use sea_orm::{ActiveValue, DatabaseTransaction};

use crate::{
    EngineError, Expense, ExpenseCmd, ResultEngine,
    categories::CategoryKind,
    expenses,
    pagination::Page,
    store::RecordQuery,
};

use super::{
    Engine, normalize_optional_text, reconcile::{Adjustments, LockedLiability, ReplaceOutcome},
    with_tx,
};

impl Engine {
    /// Records one dated expense. A liability link pays the liability down by
    /// `value` in the same transaction.
    pub async fn add_expense(&self, cmd: ExpenseCmd) -> ResultEngine<Expense> {
        ensure_linked(&cmd)?;
        let user_id = cmd.user_id;
        let codec = self.codec(user_id);

        let expense = with_tx!(self, |db_tx| {
            let mut adjustments = Adjustments::default();
            if let Some(liability_id) = cmd.liability_id {
                adjustments.debit(liability_id, cmd.value)?;
            }
            let locked = Self::lock_liabilities(&db_tx, user_id, &codec, adjustments).await?;
            let (name, period_code) = Self::describe_expense(&db_tx, &cmd, &locked).await?;

            let order_no = expenses::store::next_order_no(&db_tx, user_id, &period_code).await?;
            let id = expenses::store::insert(
                &db_tx,
                expenses::ActiveModel {
                    id: ActiveValue::NotSet,
                    user_id: ActiveValue::Set(user_id),
                    period_code: ActiveValue::Set(period_code),
                    category_id: ActiveValue::Set(cmd.category_id),
                    liability_id: ActiveValue::Set(cmd.liability_id),
                    name: ActiveValue::Set(name),
                    date: ActiveValue::Set(Some(cmd.date)),
                    value: ActiveValue::Set(codec.encode(cmd.value)?),
                    notes: ActiveValue::Set(normalize_optional_text(cmd.notes.as_deref())),
                    order_no: ActiveValue::Set(order_no),
                },
            )
            .await?;

            Self::apply_adjustments(&db_tx, user_id, &codec, locked).await?;
            let model = expenses::store::get_by_id(&db_tx, id, user_id).await?;
            Expense::open(model, &codec)
        })?;

        tracing::info!(user_id, expense_id = expense.id, "expense added");
        Ok(expense)
    }

    pub async fn expense(&self, user_id: i64, id: i64) -> ResultEngine<Expense> {
        let model = expenses::store::get_by_id(&self.database, id, user_id).await?;
        Expense::open(model, &self.codec(user_id))
    }

    pub async fn list_expenses(
        &self,
        user_id: i64,
        query: &RecordQuery,
    ) -> ResultEngine<Page<Expense>> {
        let (models, total_rows) =
            expenses::store::get_by_period(&self.database, user_id, query).await?;
        let codec = self.codec(user_id);
        let items = models
            .into_iter()
            .map(|model| Expense::open(model, &codec))
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(Page::new(items, total_rows, &query.pagination))
    }

    /// Rewrites one expense. The old liability link is credited with the old
    /// value and the new link debited with the new one.
    pub async fn update_expense(&self, id: i64, cmd: ExpenseCmd) -> ResultEngine<Expense> {
        ensure_linked(&cmd)?;
        let user_id = cmd.user_id;
        let codec = self.codec(user_id);

        let expense = with_tx!(self, |db_tx| {
            let current = expenses::store::get_by_id_for_update(&db_tx, id, user_id).await?;

            let mut adjustments = Adjustments::default();
            if let Some(liability_id) = current.liability_id {
                adjustments.credit(liability_id, codec.decode(&current.value)?)?;
            }
            if let Some(liability_id) = cmd.liability_id {
                adjustments.debit(liability_id, cmd.value)?;
            }
            let locked = Self::lock_liabilities(&db_tx, user_id, &codec, adjustments).await?;
            let (name, period_code) = Self::describe_expense(&db_tx, &cmd, &locked).await?;

            let order_no = if period_code == current.period_code {
                current.order_no
            } else {
                expenses::store::next_order_no(&db_tx, user_id, &period_code).await?
            };
            let changes = expenses::ActiveModel {
                period_code: ActiveValue::Set(period_code),
                category_id: ActiveValue::Set(cmd.category_id),
                liability_id: ActiveValue::Set(cmd.liability_id),
                name: ActiveValue::Set(name),
                date: ActiveValue::Set(Some(cmd.date)),
                value: ActiveValue::Set(codec.encode(cmd.value)?),
                notes: ActiveValue::Set(normalize_optional_text(cmd.notes.as_deref())),
                order_no: ActiveValue::Set(order_no),
                ..Default::default()
            };
            let model = expenses::store::update_by_id(&db_tx, id, user_id, changes).await?;

            Self::apply_adjustments(&db_tx, user_id, &codec, locked).await?;
            Expense::open(model, &codec)
        })?;

        tracing::info!(user_id, expense_id = id, "expense updated");
        Ok(expense)
    }

    /// Deletes one expense, crediting its liability back.
    pub async fn delete_expense(&self, user_id: i64, id: i64) -> ResultEngine<ReplaceOutcome> {
        let codec = self.codec(user_id);

        let outcome = with_tx!(self, |db_tx| {
            let current = expenses::store::get_by_id_for_update(&db_tx, id, user_id).await?;

            let mut adjustments = Adjustments::default();
            if let Some(liability_id) = current.liability_id {
                adjustments.credit(liability_id, codec.decode(&current.value)?)?;
            }
            let locked = Self::lock_liabilities(&db_tx, user_id, &codec, adjustments).await?;

            expenses::store::delete_by_id(&db_tx, id, user_id).await?;
            let touched = Self::apply_adjustments(&db_tx, user_id, &codec, locked).await?;
            Ok(ReplaceOutcome {
                refetch_liability: touched > 0,
            })
        })?;

        tracing::info!(user_id, expense_id = id, "expense deleted");
        Ok(outcome)
    }

    /// Name and period of a dated expense: named after its category, or after
    /// its liability when it has none.
    async fn describe_expense(
        db_tx: &DatabaseTransaction,
        cmd: &ExpenseCmd,
        locked: &[LockedLiability],
    ) -> ResultEngine<(String, String)> {
        let name = match cmd.category_id {
            Some(category_id) => {
                Self::require_category(db_tx, cmd.user_id, CategoryKind::Expense, category_id)
                    .await?
                    .name
            }
            None => locked
                .iter()
                .find(|liability| Some(liability.model.id) == cmd.liability_id)
                .map(|liability| liability.model.name.clone())
                .ok_or_else(|| EngineError::KeyNotFound("liability not exists".to_string()))?,
        };
        let settings = Self::load_period_settings(db_tx, cmd.user_id).await?;
        Ok((name, settings.period_code(cmd.date)))
    }
}

fn ensure_linked(cmd: &ExpenseCmd) -> ResultEngine<()> {
    if cmd.category_id.is_none() && cmd.liability_id.is_none() {
        return Err(EngineError::InvalidAmount(
            "expense needs a category or a liability".to_string(),
        ));
    }
    Ok(())
}
