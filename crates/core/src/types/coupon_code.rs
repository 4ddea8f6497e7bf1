//! Coupon code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CouponCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CouponCodeError {
    /// The input is empty after trimming.
    #[error("Coupon code is required")]
    Empty,
    /// The input is too long.
    #[error("coupon code must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `A-Z`, `0-9`, `-` and `_`.
    #[error("coupon code may only contain letters, digits, '-' and '_'")]
    InvalidCharacter,
}

/// A normalized coupon code.
///
/// Codes are case-insensitive: `save10`, ` Save10 ` and `SAVE10` all parse to
/// `SAVE10`. Codes are stored upper-cased, so lookups compare normalized values.
///
/// ```
/// use gocart_core::CouponCode;
///
/// let code = CouponCode::parse(" new20 ").unwrap();
/// assert_eq!(code.as_str(), "NEW20");
/// assert!(CouponCode::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct CouponCode(String);

impl CouponCode {
    /// Maximum length of a coupon code.
    pub const MAX_LENGTH: usize = 32;

    /// Parse and normalize a coupon code.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, longer than
    /// [`Self::MAX_LENGTH`], or contains unsupported characters.
    pub fn parse(s: &str) -> Result<Self, CouponCodeError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CouponCodeError::Empty);
        }
        if s.chars().count() > Self::MAX_LENGTH {
            return Err(CouponCodeError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(CouponCodeError::InvalidCharacter);
        }
        Ok(Self(s.to_ascii_uppercase()))
    }

    /// Returns the normalized code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CouponCode {
    type Err = CouponCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for CouponCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for CouponCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for CouponCode {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for CouponCode {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for CouponCode {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        assert_eq!(CouponCode::parse("save10").unwrap().as_str(), "SAVE10");
        assert_eq!(CouponCode::parse("  Summer_Sale-24 ").unwrap().as_str(), "SUMMER_SALE-24");
    }

    #[test]
    fn test_parse_equal_regardless_of_case() {
        assert_eq!(CouponCode::parse("abc").unwrap(), CouponCode::parse("ABC").unwrap());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(CouponCode::parse(""), Err(CouponCodeError::Empty));
        assert_eq!(CouponCode::parse(" \t"), Err(CouponCodeError::Empty));
    }

    #[test]
    fn test_parse_rejects_long_codes() {
        let long = "A".repeat(CouponCode::MAX_LENGTH + 1);
        assert!(matches!(CouponCode::parse(&long), Err(CouponCodeError::TooLong { .. })));
        assert!(CouponCode::parse(&"A".repeat(CouponCode::MAX_LENGTH)).is_ok());
    }

    #[test]
    fn test_parse_rejects_symbols() {
        assert_eq!(CouponCode::parse("10% OFF"), Err(CouponCodeError::InvalidCharacter));
        assert_eq!(CouponCode::parse("café"), Err(CouponCodeError::InvalidCharacter));
    }

    #[test]
    fn test_empty_error_message_is_client_facing() {
        assert_eq!(CouponCodeError::Empty.to_string(), "Coupon code is required");
    }

    #[test]
    fn test_deserialize_normalizes() {
        let code: CouponCode = serde_json::from_str("\"welcome\"").unwrap();
        assert_eq!(code.as_str(), "WELCOME");
    }
}
