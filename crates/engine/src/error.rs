//! The module contains the error the engine can throw.
//!
//! The errors fall in three groups:
//!
//! - validation errors ([`InvalidAmount`], [`InvalidName`], [`InvalidPeriod`],
//!   [`InvalidSort`], [`ExistingKey`], [`InvalidCredentials`]) carry a message
//!   meant for the caller;
//! - [`KeyNotFound`] is thrown when a record does not exist or belongs to
//!   another user;
//! - storage and cipher errors ([`Database`], [`Transaction`],
//!   [`Configuration`], [`Crypto`], [`Authentication`], [`Decoding`],
//!   [`Parse`]) are internal and never shown verbatim to a caller.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidName`]: EngineError::InvalidName
//!  [`InvalidPeriod`]: EngineError::InvalidPeriod
//!  [`InvalidSort`]: EngineError::InvalidSort
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`InvalidCredentials`]: EngineError::InvalidCredentials
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Database`]: EngineError::Database
//!  [`Transaction`]: EngineError::Transaction
//!  [`Configuration`]: EngineError::Configuration
//!  [`Crypto`]: EngineError::Crypto
//!  [`Authentication`]: EngineError::Authentication
//!  [`Decoding`]: EngineError::Decoding
//!  [`Parse`]: EngineError::Parse
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
    #[error("Invalid sort: {0}")]
    InvalidSort(String),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Crypto error: {0}")]
    Crypto(String),
    #[error("Authentication failed: {0}")]
    Authentication(String),
    #[error("Decoding error: {0}")]
    Decoding(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Transaction error: {0}")]
    Transaction(#[source] DbErr),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` for errors caused by stored data or the storage layer
    /// rather than by caller input.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_)
                | Self::Crypto(_)
                | Self::Authentication(_)
                | Self::Decoding(_)
                | Self::Parse(_)
                | Self::Transaction(_)
                | Self::Database(_)
        )
    }

    /// Short, stable label used in logs to tell error classes apart.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::KeyNotFound(_) => "not_found",
            Self::ExistingKey(_) => "conflict",
            Self::InvalidAmount(_)
            | Self::InvalidName(_)
            | Self::InvalidPeriod(_)
            | Self::InvalidSort(_) => "validation",
            Self::InvalidCredentials => "credentials",
            Self::Configuration(_) => "configuration",
            Self::Crypto(_) => "crypto",
            Self::Authentication(_) => "authentication",
            Self::Decoding(_) => "decoding",
            Self::Parse(_) => "parse",
            Self::Transaction(_) => "transaction",
            Self::Database(_) => "database",
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidPeriod(a), Self::InvalidPeriod(b)) => a == b,
            (Self::InvalidSort(a), Self::InvalidSort(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::Configuration(a), Self::Configuration(b)) => a == b,
            (Self::Crypto(a), Self::Crypto(b)) => a == b,
            (Self::Authentication(a), Self::Authentication(b)) => a == b,
            (Self::Decoding(a), Self::Decoding(b)) => a == b,
            (Self::Parse(a), Self::Parse(b)) => a == b,
            (Self::Transaction(a), Self::Transaction(b)) => a.to_string() == b.to_string(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
