//! Expenses, optionally linked to a [`Liability`](crate::Liability).
//!
//! The link is a weak reference: deleting the liability clears it
//! (`ON DELETE SET NULL`) and never deletes the expense.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;

use crate::{
    Money, ResultEngine,
    amount::{AmountCodec, EncryptedAmount},
    store::ledger_store,
};

/// A decrypted expense.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub id: i64,
    pub period_code: String,
    pub category_id: Option<i64>,
    pub liability_id: Option<i64>,
    pub name: String,
    /// Rows submitted as part of a period replace carry no date.
    pub date: Option<NaiveDate>,
    pub value: Money,
    pub notes: Option<String>,
    pub order_no: i32,
}

impl Expense {
    pub(crate) fn open(model: Model, codec: &AmountCodec<'_>) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            value: codec.decode(&model.value)?,
            period_code: model.period_code,
            category_id: model.category_id,
            liability_id: model.liability_id,
            name: model.name,
            date: model.date,
            notes: model.notes,
            order_no: model.order_no,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub period_code: String,
    pub category_id: Option<i64>,
    pub liability_id: Option<i64>,
    pub name: String,
    pub date: Option<NaiveDate>,
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
    #[sea_orm(
        belongs_to = "super::liabilities::Entity",
        from = "Column::LiabilityId",
        to = "super::liabilities::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Liability,
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

impl Related<super::liabilities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Liability.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

ledger_store!("expense", ["id", "name", "period_code", "date", "order_no"]);
