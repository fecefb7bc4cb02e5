use sea_orm::ActiveValue;

use crate::{
    Liability, LiabilityItem, ResultEngine, liabilities,
    pagination::Page,
    store::RecordQuery,
};

use super::{Engine, normalize_period_code, normalize_required_name, with_tx};

impl Engine {
    pub async fn liability(&self, user_id: i64, id: i64) -> ResultEngine<Liability> {
        let model = liabilities::store::get_by_id(&self.database, id, user_id).await?;
        Liability::open(model, &self.codec(user_id))
    }

    pub async fn list_liabilities(
        &self,
        user_id: i64,
        query: &RecordQuery,
    ) -> ResultEngine<Page<Liability>> {
        let (models, total_rows) =
            liabilities::store::get_by_period(&self.database, user_id, query).await?;
        let codec = self.codec(user_id);
        let items = models
            .into_iter()
            .map(|model| Liability::open(model, &codec))
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(Page::new(items, total_rows, &query.pagination))
    }

    /// Replaces the liabilities of a period.
    ///
    /// Items carrying an id update that row in place (and may move it into
    /// this period); every other row of the period is deleted, then items
    /// without an id are inserted. Returns the ids in submission order.
    pub async fn replace_liabilities_for_period(
        &self,
        user_id: i64,
        period_code: &str,
        items: Vec<LiabilityItem>,
    ) -> ResultEngine<Vec<i64>> {
        let period_code = normalize_period_code(period_code)?;
        let codec = self.codec(user_id);

        let ids = with_tx!(self, |db_tx| {
            let mut ids: Vec<Option<i64>> = Vec::with_capacity(items.len());
            let mut kept = Vec::new();
            let mut fresh = Vec::new();

            for (position, item) in items.into_iter().enumerate() {
                let model = liabilities::ActiveModel {
                    id: ActiveValue::NotSet,
                    user_id: ActiveValue::Set(user_id),
                    period_code: ActiveValue::Set(period_code.clone()),
                    name: ActiveValue::Set(normalize_required_name(&item.name, "liability")?),
                    value: ActiveValue::Set(codec.encode(item.value)?),
                    installment: ActiveValue::Set(codec.encode_opt(item.installment)?),
                    order_no: ActiveValue::Set(item.order_no),
                };
                match item.id {
                    Some(id) => {
                        liabilities::store::update_by_id(&db_tx, id, user_id, model).await?;
                        kept.push(id);
                        ids.push(Some(id));
                    }
                    None => {
                        fresh.push((position, model));
                        ids.push(None);
                    }
                }
            }

            liabilities::store::delete_except(&db_tx, user_id, &period_code, &kept).await?;

            for (position, model) in fresh {
                let id = liabilities::store::insert(&db_tx, model).await?;
                ids[position] = Some(id);
            }

            Ok(ids.into_iter().flatten().collect::<Vec<_>>())
        })?;

        tracing::info!(
            user_id,
            period_code = %period_code,
            liabilities = ids.len(),
            "liabilities replaced"
        );
        Ok(ids)
    }
}
