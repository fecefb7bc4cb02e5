//! Command structs for engine operations.
//!
//! These types group parameters for write operations (register, single-record
//! add/update, period replaces), keeping call sites readable and avoiding long
//! argument lists.

use chrono::NaiveDate;

use crate::Money;

/// Register a new user.
#[derive(Clone, Debug)]
pub struct RegisterCmd {
    pub name: String,
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

impl RegisterCmd {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            email: None,
            password: password.into(),
        }
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Add (or fully rewrite) one dated income.
///
/// The period is derived from `date` and the record is named after its
/// category.
#[derive(Clone, Debug)]
pub struct IncomeCmd {
    pub user_id: i64,
    pub category_id: i64,
    pub date: NaiveDate,
    pub value: Money,
    pub notes: Option<String>,
}

impl IncomeCmd {
    #[must_use]
    pub fn new(user_id: i64, category_id: i64, date: NaiveDate, value: Money) -> Self {
        Self {
            user_id,
            category_id,
            date,
            value,
            notes: None,
        }
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Add (or fully rewrite) one dated expense.
///
/// At least one of `category_id` and `liability_id` is required. When both are
/// set the record is named after the category.
#[derive(Clone, Debug)]
pub struct ExpenseCmd {
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub liability_id: Option<i64>,
    pub date: NaiveDate,
    pub value: Money,
    pub notes: Option<String>,
}

impl ExpenseCmd {
    #[must_use]
    pub fn new(user_id: i64, date: NaiveDate, value: Money) -> Self {
        Self {
            user_id,
            category_id: None,
            liability_id: None,
            date,
            value,
            notes: None,
        }
    }

    #[must_use]
    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn liability(mut self, liability_id: i64) -> Self {
        self.liability_id = Some(liability_id);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Add (or fully rewrite) one asset of a period.
#[derive(Clone, Debug)]
pub struct AssetCmd {
    pub user_id: i64,
    pub period_code: String,
    pub category_id: i64,
    pub amount: Money,
    pub value: Money,
    pub notes: Option<String>,
}

impl AssetCmd {
    #[must_use]
    pub fn new(
        user_id: i64,
        period_code: impl Into<String>,
        category_id: i64,
        amount: Money,
        value: Money,
    ) -> Self {
        Self {
            user_id,
            period_code: period_code.into(),
            category_id,
            amount,
            value,
            notes: None,
        }
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// One expense of a period replace.
#[derive(Clone, Debug)]
pub struct ExpenseItem {
    pub name: String,
    pub value: Money,
    pub order_no: i32,
    pub liability_id: Option<i64>,
    pub category_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl ExpenseItem {
    #[must_use]
    pub fn new(name: impl Into<String>, value: Money, order_no: i32) -> Self {
        Self {
            name: name.into(),
            value,
            order_no,
            liability_id: None,
            category_id: None,
            date: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn liability(mut self, liability_id: i64) -> Self {
        self.liability_id = Some(liability_id);
        self
    }

    #[must_use]
    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// One income of a period replace.
#[derive(Clone, Debug)]
pub struct IncomeItem {
    pub name: String,
    pub value: Money,
    pub order_no: i32,
    pub category_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl IncomeItem {
    #[must_use]
    pub fn new(name: impl Into<String>, value: Money, order_no: i32) -> Self {
        Self {
            name: name.into(),
            value,
            order_no,
            category_id: None,
            date: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// One asset of a period replace.
#[derive(Clone, Debug)]
pub struct AssetItem {
    pub name: String,
    pub amount: Money,
    pub value: Money,
    pub order_no: i32,
    pub category_id: Option<i64>,
    pub notes: Option<String>,
}

impl AssetItem {
    #[must_use]
    pub fn new(name: impl Into<String>, amount: Money, value: Money, order_no: i32) -> Self {
        Self {
            name: name.into(),
            amount,
            value,
            order_no,
            category_id: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// One liability of a period replace.
///
/// With `id` set the existing row is updated in place; without it a new row
/// is created.
#[derive(Clone, Debug)]
pub struct LiabilityItem {
    pub id: Option<i64>,
    pub name: String,
    pub value: Money,
    pub installment: Option<Money>,
    pub order_no: i32,
}

impl LiabilityItem {
    #[must_use]
    pub fn new(name: impl Into<String>, value: Money, order_no: i32) -> Self {
        Self {
            id: None,
            name: name.into(),
            value,
            installment: None,
            order_no,
        }
    }

    #[must_use]
    pub fn id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn installment(mut self, installment: Money) -> Self {
        self.installment = Some(installment);
        self
    }
}
