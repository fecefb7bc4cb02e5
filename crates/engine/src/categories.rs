//! Category registry per user.
//!
//! Each category belongs to one [`CategoryKind`]; names are unique per
//! `(user, kind)` after normalization.

use sea_orm::entity::prelude::*;

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CategoryKind {
    Income,
    Expense,
    Asset,
}

impl CategoryKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
            CategoryKind::Asset => "asset",
        }
    }

    /// Categories created for every new user.
    #[must_use]
    pub fn defaults(self) -> &'static [&'static str] {
        match self {
            CategoryKind::Income => &["Salary", "Bonus", "Investment", "Other"],
            CategoryKind::Expense => &[
                "Food",
                "Transport",
                "Bills",
                "Shopping",
                "Health",
                "Entertainment",
                "Other",
            ],
            CategoryKind::Asset => &[
                "Cash",
                "Bank Account",
                "Investment",
                "Property",
                "Vehicle",
                "Other",
            ],
        }
    }
}

impl TryFrom<&str> for CategoryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(CategoryKind::Income),
            "expense" => Ok(CategoryKind::Expense),
            "asset" => Ok(CategoryKind::Asset),
            other => Err(EngineError::InvalidName(format!(
                "unknown category kind '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub kind: CategoryKind,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub kind: String,
    pub name: String,
    pub name_norm: String,
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
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            kind: CategoryKind::try_from(value.kind.as_str())?,
            name: value.name,
        })
    }
}
