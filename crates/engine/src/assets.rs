//! Assets held at the end of a period.
//!
//! `amount` is a quantity (units held), `value` their worth; both are sealed.

use sea_orm::entity::prelude::*;

use crate::{
    Money, ResultEngine,
    amount::{AmountCodec, EncryptedAmount},
    store::ledger_store,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    pub id: i64,
    pub period_code: String,
    pub category_id: Option<i64>,
    pub name: String,
    pub amount: Money,
    pub value: Money,
    pub notes: Option<String>,
    pub order_no: i32,
}

impl Asset {
    pub(crate) fn open(model: Model, codec: &AmountCodec<'_>) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            amount: codec.decode(&model.amount)?,
            value: codec.decode(&model.value)?,
            period_code: model.period_code,
            category_id: model.category_id,
            name: model.name,
            notes: model.notes,
            order_no: model.order_no,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub period_code: String,
    pub category_id: Option<i64>,
    pub name: String,
    pub amount: EncryptedAmount,
    pub value: EncryptedAmount,
    pub notes: Option<String>,
    pub order_no: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

ledger_store!("asset", ["id", "name", "period_code", "order_no"]);
