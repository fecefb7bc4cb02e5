//! Monetary codec: the only place that knows which text is sealed for an
//! amount.
//!
//! Amounts are rendered as integer text ([`Money`]'s `Display`) and passed to
//! the [`ValueCipher`]; decoding reverses it and parses the plaintext back.

use sea_orm::DeriveValueType;
use serde::{Deserialize, Serialize};

use crate::{
    Money, ResultEngine,
    cipher::{Scope, ValueCipher},
};

/// An opaque, base64-encoded sealed amount as stored in the database.
///
/// Never holds a raw number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveValueType)]
pub struct EncryptedAmount(pub String);

impl EncryptedAmount {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Seals and opens amounts for one scope.
#[derive(Clone, Debug)]
pub struct AmountCodec<'a> {
    cipher: &'a ValueCipher,
    scope: Scope,
}

impl<'a> AmountCodec<'a> {
    #[must_use]
    pub fn new(cipher: &'a ValueCipher, scope: Scope) -> Self {
        Self { cipher, scope }
    }

    pub fn encode(&self, amount: Money) -> ResultEngine<EncryptedAmount> {
        self.cipher
            .encrypt(&self.scope, &amount.to_string())
            .map(EncryptedAmount)
    }

    pub fn decode(&self, sealed: &EncryptedAmount) -> ResultEngine<Money> {
        self.cipher.decrypt(&self.scope, sealed.as_str())?.parse()
    }

    pub fn encode_opt(&self, amount: Option<Money>) -> ResultEngine<Option<EncryptedAmount>> {
        amount.map(|amount| self.encode(amount)).transpose()
    }

    pub fn decode_opt(&self, sealed: Option<&EncryptedAmount>) -> ResultEngine<Option<Money>> {
        sealed.map(|sealed| self.decode(sealed)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use crate::EngineError;

    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        let cipher = ValueCipher::new(None);
        let codec = AmountCodec::new(&cipher, Scope::user(4));

        let sealed = codec.encode(Money::new(1_000_000)).unwrap();
        assert!(!sealed.as_str().contains("1000000"));
        assert_eq!(codec.decode(&sealed).unwrap(), Money::new(1_000_000));
    }

    #[test]
    fn decode_under_other_scope_fails() {
        let cipher = ValueCipher::new(None);
        let sealed = AmountCodec::new(&cipher, Scope::user(4))
            .encode(Money::new(10))
            .unwrap();

        let err = AmountCodec::new(&cipher, Scope::user(5))
            .decode(&sealed)
            .unwrap_err();
        assert!(matches!(err, EngineError::Authentication(_)));
    }

    #[test]
    fn non_numeric_plaintext_is_parse_error() {
        let cipher = ValueCipher::new(None);
        let scope = Scope::user(4);
        let sealed = EncryptedAmount(cipher.encrypt(&scope, "twelve").unwrap());

        let err = AmountCodec::new(&cipher, scope).decode(&sealed).unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
    }

    #[test]
    fn optional_amounts_pass_none_through() {
        let cipher = ValueCipher::new(None);
        let codec = AmountCodec::new(&cipher, Scope::user(1));

        assert_eq!(codec.encode_opt(None).unwrap(), None);
        assert_eq!(codec.decode_opt(None).unwrap(), None);

        let sealed = codec.encode_opt(Some(Money::new(3))).unwrap();
        assert_eq!(codec.decode_opt(sealed.as_ref()).unwrap(), Some(Money::new(3)));
    }
}
