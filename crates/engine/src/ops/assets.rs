use sea_orm::ActiveValue;

use crate::{
    Asset, AssetCmd, AssetItem, ResultEngine,
    assets,
    categories::CategoryKind,
    pagination::Page,
    store::RecordQuery,
};

use super::{
    Engine, normalize_optional_text, normalize_period_code, normalize_required_name, with_tx,
};

impl Engine {
    /// Adds one asset at the end of its period, named after its category.
    pub async fn add_asset(&self, cmd: AssetCmd) -> ResultEngine<Asset> {
        let user_id = cmd.user_id;
        let period_code = normalize_period_code(&cmd.period_code)?;
        let codec = self.codec(user_id);

        let asset = with_tx!(self, |db_tx| {
            let category =
                Self::require_category(&db_tx, user_id, CategoryKind::Asset, cmd.category_id)
                    .await?;
            let order_no = assets::store::next_order_no(&db_tx, user_id, &period_code).await?;

            let id = assets::store::insert(
                &db_tx,
                assets::ActiveModel {
                    id: ActiveValue::NotSet,
                    user_id: ActiveValue::Set(user_id),
                    period_code: ActiveValue::Set(period_code.clone()),
                    category_id: ActiveValue::Set(Some(category.id)),
                    name: ActiveValue::Set(category.name),
                    amount: ActiveValue::Set(codec.encode(cmd.amount)?),
                    value: ActiveValue::Set(codec.encode(cmd.value)?),
                    notes: ActiveValue::Set(normalize_optional_text(cmd.notes.as_deref())),
                    order_no: ActiveValue::Set(order_no),
                },
            )
            .await?;

            let model = assets::store::get_by_id(&db_tx, id, user_id).await?;
            Asset::open(model, &codec)
        })?;

        tracing::info!(user_id, asset_id = asset.id, period_code = %period_code, "asset added");
        Ok(asset)
    }

    pub async fn asset(&self, user_id: i64, id: i64) -> ResultEngine<Asset> {
        let model = assets::store::get_by_id(&self.database, id, user_id).await?;
        Asset::open(model, &self.codec(user_id))
    }

    pub async fn list_assets(&self, user_id: i64, query: &RecordQuery) -> ResultEngine<Page<Asset>> {
        let (models, total_rows) =
            assets::store::get_by_period(&self.database, user_id, query).await?;
        let codec = self.codec(user_id);
        let items = models
            .into_iter()
            .map(|model| Asset::open(model, &codec))
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(Page::new(items, total_rows, &query.pagination))
    }

    pub async fn update_asset(&self, id: i64, cmd: AssetCmd) -> ResultEngine<Asset> {
        let user_id = cmd.user_id;
        let period_code = normalize_period_code(&cmd.period_code)?;
        let codec = self.codec(user_id);

        with_tx!(self, |db_tx| {
            let current = assets::store::get_by_id_for_update(&db_tx, id, user_id).await?;
            let category =
                Self::require_category(&db_tx, user_id, CategoryKind::Asset, cmd.category_id)
                    .await?;
            let order_no = if period_code == current.period_code {
                current.order_no
            } else {
                assets::store::next_order_no(&db_tx, user_id, &period_code).await?
            };

            let changes = assets::ActiveModel {
                period_code: ActiveValue::Set(period_code),
                category_id: ActiveValue::Set(Some(category.id)),
                name: ActiveValue::Set(category.name),
                amount: ActiveValue::Set(codec.encode(cmd.amount)?),
                value: ActiveValue::Set(codec.encode(cmd.value)?),
                notes: ActiveValue::Set(normalize_optional_text(cmd.notes.as_deref())),
                order_no: ActiveValue::Set(order_no),
                ..Default::default()
            };
            let model = assets::store::update_by_id(&db_tx, id, user_id, changes).await?;
            Asset::open(model, &codec)
        })
    }

    pub async fn delete_asset(&self, user_id: i64, id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            assets::store::delete_by_id(&db_tx, id, user_id).await?;
            Ok(())
        })?;
        tracing::info!(user_id, asset_id = id, "asset deleted");
        Ok(())
    }

    /// Replaces every asset of a period. Returns the number of rows written.
    pub async fn replace_assets_for_period(
        &self,
        user_id: i64,
        period_code: &str,
        items: Vec<AssetItem>,
    ) -> ResultEngine<usize> {
        let period_code = normalize_period_code(period_code)?;
        let codec = self.codec(user_id);
        let count = items.len();

        with_tx!(self, |db_tx| {
            let mut rows = Vec::with_capacity(items.len());
            for item in items {
                let name = normalize_required_name(&item.name, "asset")?;
                Self::check_category(&db_tx, user_id, CategoryKind::Asset, item.category_id)
                    .await?;
                rows.push(assets::ActiveModel {
                    id: ActiveValue::NotSet,
                    user_id: ActiveValue::Set(user_id),
                    period_code: ActiveValue::Set(period_code.clone()),
                    category_id: ActiveValue::Set(item.category_id),
                    name: ActiveValue::Set(name),
                    amount: ActiveValue::Set(codec.encode(item.amount)?),
                    value: ActiveValue::Set(codec.encode(item.value)?),
                    notes: ActiveValue::Set(normalize_optional_text(item.notes.as_deref())),
                    order_no: ActiveValue::Set(item.order_no),
                });
            }

            assets::store::delete_by_period(&db_tx, user_id, &period_code).await?;
            assets::store::bulk_insert(&db_tx, rows).await?;
            Ok(())
        })?;

        tracing::info!(user_id, period_code = %period_code, assets = count, "assets replaced");
        Ok(count)
    }
}
