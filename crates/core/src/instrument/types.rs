//! Payment instrument types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spendwise_shared::types::{InstrumentId, UserId};

use super::error::InstrumentError;
use crate::tombstone::SoftDelete;

/// Card brands accepted when registering an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardBrand {
    /// Visa.
    Visa,
    /// MasterCard.
    MasterCard,
    /// American Express.
    Amex,
    /// Discover.
    Discover,
    /// Elo.
    Elo,
}

impl CardBrand {
    /// All accepted brands.
    pub const ALL: [Self; 5] = [
        Self::Visa,
        Self::MasterCard,
        Self::Amex,
        Self::Discover,
        Self::Elo,
    ];

    /// Brand name as stored.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Visa => "Visa",
            Self::MasterCard => "MasterCard",
            Self::Amex => "Amex",
            Self::Discover => "Discover",
            Self::Elo => "Elo",
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a brand name. Matching is exact, including case.
impl FromStr for CardBrand {
    type Err = InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|brand| brand.as_str() == s)
            .ok_or_else(|| InstrumentError::UnknownBrand(s.to_string()))
    }
}

/// Instrument kind without its funding data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentKind {
    /// Debit card drawing on a balance.
    Debit,
    /// Credit card charging against a limit.
    Credit,
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debit => f.write_str("debit"),
            Self::Credit => f.write_str("credit"),
        }
    }
}

/// Funding side of an instrument.
///
/// At rest `balance >= 0` for debit and `0 <= usage <= limit` for credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Funding {
    /// Debit card.
    Debit {
        /// Spendable balance.
        balance: Decimal,
    },
    /// Credit card.
    Credit {
        /// Credit limit.
        limit: Decimal,
        /// Amount currently charged against the limit.
        usage: Decimal,
        /// Day of month after which purchases roll to the next cycle (1-31).
        closing_day: u32,
    },
}

impl Funding {
    /// Kind tag.
    #[must_use]
    pub const fn kind(&self) -> InstrumentKind {
        match self {
            Self::Debit { .. } => InstrumentKind::Debit,
            Self::Credit { .. } => InstrumentKind::Credit,
        }
    }
}

/// A debit or credit card owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Instrument ID.
    pub id: InstrumentId,
    /// Owning user.
    pub owner_id: UserId,
    /// 16-digit card number.
    pub card_number: String,
    /// Card brand.
    pub brand: CardBrand,
    /// Last day the card can be used.
    pub valid_until: NaiveDate,
    /// Balance or limit/usage.
    pub funding: Funding,
    /// Optimistic concurrency token.
    pub version: i64,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SoftDelete for Instrument {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

impl Instrument {
    /// Kind tag.
    #[must_use]
    pub const fn kind(&self) -> InstrumentKind {
        self.funding.kind()
    }

    /// Debit balance, or `None` for a credit card.
    #[must_use]
    pub const fn balance(&self) -> Option<Decimal> {
        match self.funding {
            Funding::Debit { balance } => Some(balance),
            Funding::Credit { .. } => None,
        }
    }

    /// Credit usage, or `None` for a debit card.
    #[must_use]
    pub const fn usage(&self) -> Option<Decimal> {
        match self.funding {
            Funding::Credit { usage, .. } => Some(usage),
            Funding::Debit { .. } => None,
        }
    }

    /// Credit limit, or `None` for a debit card.
    #[must_use]
    pub const fn limit(&self) -> Option<Decimal> {
        match self.funding {
            Funding::Credit { limit, .. } => Some(limit),
            Funding::Debit { .. } => None,
        }
    }

    /// Billing closing day, or `None` for a debit card.
    #[must_use]
    pub const fn closing_day(&self) -> Option<u32> {
        match self.funding {
            Funding::Credit { closing_day, .. } => Some(closing_day),
            Funding::Debit { .. } => None,
        }
    }

    /// Subtracts `amount` from a debit balance.
    ///
    /// # Errors
    ///
    /// Returns `InstrumentError::NotFound` if this is not a debit card.
    /// Returns `InstrumentError::InsufficientBalance` if `amount > balance`.
    pub fn debit(&mut self, amount: Decimal) -> Result<Decimal, InstrumentError> {
        let id = self.id;
        match &mut self.funding {
            Funding::Debit { balance } => {
                if *balance < amount {
                    return Err(InstrumentError::InsufficientBalance {
                        id,
                        balance: *balance,
                        requested: amount,
                    });
                }
                *balance -= amount;
                Ok(*balance)
            }
            Funding::Credit { .. } => Err(InstrumentError::NotFound {
                id,
                kind: InstrumentKind::Debit,
            }),
        }
    }

    /// Checks that `amount` fits in the remaining credit limit.
    ///
    /// # Errors
    ///
    /// Returns `InstrumentError::NotFound` if this is not a credit card.
    /// Returns `InstrumentError::CreditLimitExceeded` if `usage + amount > limit`.
    pub fn ensure_headroom(&self, amount: Decimal) -> Result<(), InstrumentError> {
        match self.funding {
            Funding::Credit { limit, usage, .. } => {
                if usage + amount > limit {
                    return Err(InstrumentError::CreditLimitExceeded {
                        id: self.id,
                        limit,
                        usage,
                        requested: amount,
                    });
                }
                Ok(())
            }
            Funding::Debit { .. } => Err(InstrumentError::NotFound {
                id: self.id,
                kind: InstrumentKind::Credit,
            }),
        }
    }

    /// Adds `amount` to credit usage.
    ///
    /// # Errors
    ///
    /// Same as [`Instrument::ensure_headroom`].
    pub fn charge(&mut self, amount: Decimal) -> Result<Decimal, InstrumentError> {
        self.ensure_headroom(amount)?;
        match &mut self.funding {
            Funding::Credit { usage, .. } => {
                *usage += amount;
                Ok(*usage)
            }
            Funding::Debit { .. } => Err(InstrumentError::NotFound {
                id: self.id,
                kind: InstrumentKind::Credit,
            }),
        }
    }
}
