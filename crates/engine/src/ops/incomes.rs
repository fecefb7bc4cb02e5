use sea_orm::ActiveValue;

use crate::{
    Income, IncomeCmd, IncomeItem, ResultEngine,
    categories::CategoryKind,
    incomes,
    pagination::Page,
    store::RecordQuery,
};

use super::{
    Engine, normalize_optional_text, normalize_period_code, normalize_required_name, with_tx,
};

impl Engine {
    /// Records one dated income, named after its category.
    pub async fn add_income(&self, cmd: IncomeCmd) -> ResultEngine<Income> {
        let user_id = cmd.user_id;
        let codec = self.codec(user_id);

        let income = with_tx!(self, |db_tx| {
            let category =
                Self::require_category(&db_tx, user_id, CategoryKind::Income, cmd.category_id)
                    .await?;
            let period_code = Self::load_period_settings(&db_tx, user_id)
                .await?
                .period_code(cmd.date);
            let order_no = incomes::store::next_order_no(&db_tx, user_id, &period_code).await?;

            let id = incomes::store::insert(
                &db_tx,
                incomes::ActiveModel {
                    id: ActiveValue::NotSet,
                    user_id: ActiveValue::Set(user_id),
                    period_code: ActiveValue::Set(period_code),
                    category_id: ActiveValue::Set(Some(category.id)),
                    name: ActiveValue::Set(category.name),
                    date: ActiveValue::Set(Some(cmd.date)),
                    value: ActiveValue::Set(codec.encode(cmd.value)?),
                    notes: ActiveValue::Set(normalize_optional_text(cmd.notes.as_deref())),
                    order_no: ActiveValue::Set(order_no),
                },
            )
            .await?;

            let model = incomes::store::get_by_id(&db_tx, id, user_id).await?;
            Income::open(model, &codec)
        })?;

        tracing::info!(user_id, income_id = income.id, "income added");
        Ok(income)
    }

    pub async fn income(&self, user_id: i64, id: i64) -> ResultEngine<Income> {
        let model = incomes::store::get_by_id(&self.database, id, user_id).await?;
        Income::open(model, &self.codec(user_id))
    }

    pub async fn list_incomes(&self, user_id: i64, query: &RecordQuery) -> ResultEngine<Page<Income>> {
        let (models, total_rows) =
            incomes::store::get_by_period(&self.database, user_id, query).await?;
        let codec = self.codec(user_id);
        let items = models
            .into_iter()
            .map(|model| Income::open(model, &codec))
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(Page::new(items, total_rows, &query.pagination))
    }

    pub async fn update_income(&self, id: i64, cmd: IncomeCmd) -> ResultEngine<Income> {
        let user_id = cmd.user_id;
        let codec = self.codec(user_id);

        with_tx!(self, |db_tx| {
            let current = incomes::store::get_by_id_for_update(&db_tx, id, user_id).await?;
            let category =
                Self::require_category(&db_tx, user_id, CategoryKind::Income, cmd.category_id)
                    .await?;
            let period_code = Self::load_period_settings(&db_tx, user_id)
                .await?
                .period_code(cmd.date);
            let order_no = if period_code == current.period_code {
                current.order_no
            } else {
                incomes::store::next_order_no(&db_tx, user_id, &period_code).await?
            };

            let changes = incomes::ActiveModel {
                period_code: ActiveValue::Set(period_code),
                category_id: ActiveValue::Set(Some(category.id)),
                name: ActiveValue::Set(category.name),
                date: ActiveValue::Set(Some(cmd.date)),
                value: ActiveValue::Set(codec.encode(cmd.value)?),
                notes: ActiveValue::Set(normalize_optional_text(cmd.notes.as_deref())),
                order_no: ActiveValue::Set(order_no),
                ..Default::default()
            };
            let model = incomes::store::update_by_id(&db_tx, id, user_id, changes).await?;
            Income::open(model, &codec)
        })
    }

    pub async fn delete_income(&self, user_id: i64, id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            incomes::store::delete_by_id(&db_tx, id, user_id).await?;
            Ok(())
        })?;
        tracing::info!(user_id, income_id = id, "income deleted");
        Ok(())
    }

    /// Replaces every income of a period. Returns the number of rows written.
    pub async fn replace_incomes_for_period(
        &self,
        user_id: i64,
        period_code: &str,
        items: Vec<IncomeItem>,
    ) -> ResultEngine<usize> {
        let period_code = normalize_period_code(period_code)?;
        let codec = self.codec(user_id);
        let count = items.len();

        with_tx!(self, |db_tx| {
            let mut rows = Vec::with_capacity(items.len());
            for item in items {
                let name = normalize_required_name(&item.name, "income")?;
                Self::check_category(&db_tx, user_id, CategoryKind::Income, item.category_id)
                    .await?;
                rows.push(incomes::ActiveModel {
                    id: ActiveValue::NotSet,
                    user_id: ActiveValue::Set(user_id),
                    period_code: ActiveValue::Set(period_code.clone()),
                    category_id: ActiveValue::Set(item.category_id),
                    name: ActiveValue::Set(name),
                    date: ActiveValue::Set(item.date),
                    value: ActiveValue::Set(codec.encode(item.value)?),
                    notes: ActiveValue::Set(normalize_optional_text(item.notes.as_deref())),
                    order_no: ActiveValue::Set(item.order_no),
                });
            }

            incomes::store::delete_by_period(&db_tx, user_id, &period_code).await?;
            incomes::store::bulk_insert(&db_tx, rows).await?;
            Ok(())
        })?;

        tracing::info!(user_id, period_code = %period_code, incomes = count, "incomes replaced");
        Ok(count)
    }
}
