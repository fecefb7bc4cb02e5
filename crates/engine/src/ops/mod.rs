use sea_orm::DatabaseConnection;

use crate::{
    EngineError, ResultEngine,
    amount::AmountCodec,
    cipher::{Scope, ValueCipher},
};

mod assets;
mod auth;
mod cashflow;
mod categories;
mod expenses;
mod incomes;
mod liabilities;
mod periods;
mod reconcile;

pub use cashflow::{Cashflow, CashflowEntry, CashflowKind, CashflowQuery};
pub use periods::PeriodSettings;
pub use reconcile::ReplaceOutcome;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// Begin and commit failures surface as [`EngineError::Transaction`].
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = sea_orm::TransactionTrait::begin(&$self.database)
            .await
            .map_err($crate::EngineError::Transaction)?;
        let result: $crate::ResultEngine<_> = $body;
        match result {
            Ok(value) => {
                $tx.commit()
                    .await
                    .map_err($crate::EngineError::Transaction)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = $tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    cipher: ValueCipher,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Codec for the monetary values of `user_id`.
    fn codec(&self, user_id: i64) -> AmountCodec<'_> {
        AmountCodec::new(&self.cipher, Scope::user(user_id))
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_period_code(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidPeriod(
            "period code must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    cipher: ValueCipher,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Pass the cipher sealing monetary values
    pub fn cipher(mut self, cipher: ValueCipher) -> EngineBuilder {
        self.cipher = cipher;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            cipher: self.cipher,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_name_is_trimmed() {
        assert_eq!(normalize_required_name("  Rent ", "expense").unwrap(), "Rent");
        assert_eq!(
            normalize_required_name(" ", "expense").unwrap_err(),
            EngineError::InvalidName("expense name must not be empty".to_string())
        );
    }

    #[test]
    fn period_code_must_not_be_blank() {
        assert_eq!(normalize_period_code(" 2024-05 ").unwrap(), "2024-05");
        assert!(matches!(
            normalize_period_code(""),
            Err(EngineError::InvalidPeriod(_))
        ));
    }

    #[test]
    fn optional_text_drops_blanks() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(Some(" x ")), Some("x".to_string()));
        assert_eq!(normalize_optional_text(None), None);
    }
}
