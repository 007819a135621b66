//! Chat-platform identity type.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`TelegramId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TelegramIdError {
    /// The input string is empty.
    #[error("telegram id cannot be empty")]
    Empty,
    /// The input is not a base-10 integer.
    #[error("telegram id must be an integer: {0}")]
    NotANumber(String),
}

/// The stable user identifier assigned by Telegram.
///
/// This is the natural key of the identity store: at most one user row
/// exists per `TelegramId`, and it never changes once stored.
///
/// ## Examples
///
/// ```
/// use party_finder_core::TelegramId;
///
/// let id: TelegramId = " 42 ".parse().unwrap();
/// assert_eq!(id.as_i64(), 42);
///
/// assert!("".parse::<TelegramId>().is_err());
/// assert!("abc".parse::<TelegramId>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TelegramId(i64);

impl TelegramId {
    /// Wrap a raw Telegram user id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the underlying i64 value.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Parse a `TelegramId`, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or not an integer.
    pub fn parse(s: &str) -> Result<Self, TelegramIdError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TelegramIdError::Empty);
        }
        trimmed
            .parse::<i64>()
            .map(Self)
            .map_err(|_| TelegramIdError::NotANumber(trimmed.to_owned()))
    }
}

impl fmt::Display for TelegramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TelegramId {
    type Err = TelegramIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<i64> for TelegramId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<TelegramId> for i64 {
    fn from(id: TelegramId) -> Self {
        id.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for TelegramId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for TelegramId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let id = <i64 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(id))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for TelegramId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
