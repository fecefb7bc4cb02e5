//! Liabilities: debts whose balance is paid down by linked expenses.
//!
//! `value` is the outstanding balance. It is only ever written through a
//! locked read ([`store::get_by_id_for_update`]) inside a transaction, so
//! concurrent reconciliations against the same row serialize.

use sea_orm::entity::prelude::*;

use crate::{
    Money, ResultEngine,
    amount::{AmountCodec, EncryptedAmount},
    store::ledger_store,
};

/// A decrypted liability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Liability {
    pub id: i64,
    pub period_code: String,
    pub name: String,
    pub value: Money,
    pub installment: Option<Money>,
    pub order_no: i32,
}

impl Liability {
    pub(crate) fn open(model: Model, codec: &AmountCodec<'_>) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            value: codec.decode(&model.value)?,
            installment: codec.decode_opt(model.installment.as_ref())?,
            period_code: model.period_code,
            name: model.name,
            order_no: model.order_no,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "liabilities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub period_code: String,
    pub name: String,
    pub value: EncryptedAmount,
    pub installment: Option<EncryptedAmount>,
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
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

ledger_store!("liability", ["id", "name", "period_code", "order_no"]);
