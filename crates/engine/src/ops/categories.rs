use sea_orm::{ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};

use crate::{
    EngineError, ResultEngine, categories,
    categories::{Category, CategoryKind},
    util::{normalize_category_display, normalize_category_key},
};

use super::{Engine, with_tx};

impl Engine {
    /// Lists a user's categories of one kind, ordered by name.
    pub async fn list_categories(
        &self,
        user_id: i64,
        kind: CategoryKind,
    ) -> ResultEngine<Vec<Category>> {
        categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .filter(categories::Column::Kind.eq(kind.as_str()))
            .order_by_asc(categories::Column::NameNorm)
            .order_by_asc(categories::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }

    /// Creates a category; a name equal to an existing one after
    /// normalization is [`EngineError::ExistingKey`].
    pub async fn new_category(
        &self,
        user_id: i64,
        kind: CategoryKind,
        name: &str,
    ) -> ResultEngine<Category> {
        let display = normalize_category_display(name)?;
        let name_norm = normalize_category_key(&display);

        with_tx!(self, |db_tx| {
            let existing = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id))
                .filter(categories::Column::Kind.eq(kind.as_str()))
                .filter(categories::Column::NameNorm.eq(name_norm.as_str()))
                .one(&db_tx)
                .await?;
            if let Some(existing) = existing {
                return Err(EngineError::ExistingKey(existing.name));
            }

            let model = categories::ActiveModel {
                id: ActiveValue::NotSet,
                user_id: ActiveValue::Set(user_id),
                kind: ActiveValue::Set(kind.as_str().to_string()),
                name: ActiveValue::Set(display),
                name_norm: ActiveValue::Set(name_norm),
            }
            .insert(&db_tx)
            .await?;

            Category::try_from(model)
        })
    }

    pub(super) async fn seed_default_categories(
        db_tx: &DatabaseTransaction,
        user_id: i64,
        kind: CategoryKind,
    ) -> ResultEngine<()> {
        let models = kind.defaults().iter().map(|name| categories::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(user_id),
            kind: ActiveValue::Set(kind.as_str().to_string()),
            name: ActiveValue::Set((*name).to_string()),
            name_norm: ActiveValue::Set(normalize_category_key(name)),
        });
        categories::Entity::insert_many(models)
            .exec_without_returning(db_tx)
            .await?;
        Ok(())
    }

    /// Loads a category that must belong to `user_id` and be of `kind`.
    pub(super) async fn require_category<C: ConnectionTrait>(
        db: &C,
        user_id: i64,
        kind: CategoryKind,
        category_id: i64,
    ) -> ResultEngine<categories::Model> {
        categories::Entity::find_by_id(category_id)
            .filter(categories::Column::UserId.eq(user_id))
            .filter(categories::Column::Kind.eq(kind.as_str()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("{} category not exists", kind.as_str())))
    }

    /// Checks an optional category link without loading it.
    pub(super) async fn check_category<C: ConnectionTrait>(
        db: &C,
        user_id: i64,
        kind: CategoryKind,
        category_id: Option<i64>,
    ) -> ResultEngine<()> {
        if let Some(category_id) = category_id {
            Self::require_category(db, user_id, kind, category_id).await?;
        }
        Ok(())
    }
}
