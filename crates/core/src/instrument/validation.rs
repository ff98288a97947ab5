//! Field rules for registering and editing instruments.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spendwise_shared::types::{InstrumentId, UserId};

use super::error::InstrumentError;
use super::types::{CardBrand, Funding, Instrument};

/// Number of digits in a card number.
pub const CARD_NUMBER_LEN: usize = 16;

/// Checks that a card number is exactly 16 ASCII digits.
///
/// # Errors
///
/// Returns `InstrumentError::InvalidCardNumber` otherwise.
pub fn validate_card_number(card_number: &str) -> Result<(), InstrumentError> {
    if card_number.len() == CARD_NUMBER_LEN && card_number.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(InstrumentError::InvalidCardNumber)
    }
}

/// Checks that a closing day is a day of month.
///
/// # Errors
///
/// Returns `InstrumentError::InvalidClosingDay` if outside 1-31.
pub fn validate_closing_day(day: u32) -> Result<(), InstrumentError> {
    if (1..=31).contains(&day) {
        Ok(())
    } else {
        Err(InstrumentError::InvalidClosingDay(day))
    }
}

/// Checks that a validity date is strictly after `today`.
///
/// # Errors
///
/// Returns `InstrumentError::Expired` otherwise.
pub fn validate_validity(valid_until: NaiveDate, today: NaiveDate) -> Result<(), InstrumentError> {
    if valid_until > today {
        Ok(())
    } else {
        Err(InstrumentError::Expired { valid_until, today })
    }
}

fn validate_funding(funding: &Funding) -> Result<(), InstrumentError> {
    match *funding {
        Funding::Debit { balance } => {
            if balance < Decimal::ZERO {
                return Err(InstrumentError::NegativeBalance(balance));
            }
        }
        Funding::Credit {
            limit,
            usage,
            closing_day,
        } => {
            if limit <= Decimal::ZERO {
                return Err(InstrumentError::NonPositiveLimit(limit));
            }
            if usage < Decimal::ZERO || usage > limit {
                return Err(InstrumentError::InvalidUsage { usage, limit });
            }
            validate_closing_day(closing_day)?;
        }
    }
    Ok(())
}

/// Funding data supplied when registering a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NewFunding {
    /// Debit card with an opening balance.
    Debit {
        /// Opening balance (>= 0).
        balance: Decimal,
    },
    /// Credit card. Usage starts at zero.
    Credit {
        /// Credit limit (> 0).
        limit: Decimal,
        /// Billing closing day (1-31).
        closing_day: u32,
    },
}

/// Request to register a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInstrument {
    /// 16-digit card number.
    pub card_number: String,
    /// Brand name, matched exactly.
    pub brand: String,
    /// Last day the card can be used.
    pub valid_until: NaiveDate,
    /// Kind-specific data.
    pub funding: NewFunding,
}

impl NewInstrument {
    /// Validates every field and builds the instrument row.
    ///
    /// The duplicate card number check needs the store and is done by the service.
    ///
    /// # Errors
    ///
    /// Returns the first failing field rule.
    pub fn into_instrument(
        self,
        owner: UserId,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Instrument, InstrumentError> {
        validate_card_number(&self.card_number)?;
        let brand: CardBrand = self.brand.parse()?;
        validate_validity(self.valid_until, today)?;

        let funding = match self.funding {
            NewFunding::Debit { balance } => Funding::Debit { balance },
            NewFunding::Credit { limit, closing_day } => Funding::Credit {
                limit,
                usage: Decimal::ZERO,
                closing_day,
            },
        };
        validate_funding(&funding)?;

        Ok(Instrument {
            id: InstrumentId::new(),
            owner_id: owner,
            card_number: self.card_number,
            brand,
            valid_until: self.valid_until,
            funding,
            version: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }
}

/// Partial update of a card. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentPatch {
    /// New brand name.
    pub brand: Option<String>,
    /// New validity date.
    pub valid_until: Option<NaiveDate>,
    /// New credit limit.
    pub limit: Option<Decimal>,
    /// New credit usage.
    pub usage: Option<Decimal>,
    /// New closing day.
    pub closing_day: Option<u32>,
    /// New debit balance.
    pub balance: Option<Decimal>,
}

impl InstrumentPatch {
    /// Applies the patch. The instrument is left untouched on error.
    ///
    /// # Errors
    ///
    /// Returns `InstrumentError::FieldNotApplicable` for a field of the other kind,
    /// or the first failing field rule.
    pub fn apply(&self, instrument: &mut Instrument, today: NaiveDate) -> Result<(), InstrumentError> {
        let kind = instrument.kind();
        let mut funding = instrument.funding;

        match &mut funding {
            Funding::Debit { balance } => {
                for (field, set) in [
                    ("limit", self.limit.is_some()),
                    ("usage", self.usage.is_some()),
                    ("closing_day", self.closing_day.is_some()),
                ] {
                    if set {
                        return Err(InstrumentError::FieldNotApplicable { field, kind });
                    }
                }
                if let Some(new_balance) = self.balance {
                    *balance = new_balance;
                }
            }
            Funding::Credit {
                limit,
                usage,
                closing_day,
            } => {
                if self.balance.is_some() {
                    return Err(InstrumentError::FieldNotApplicable {
                        field: "balance",
                        kind,
                    });
                }
                if let Some(new_limit) = self.limit {
                    *limit = new_limit;
                }
                if let Some(new_usage) = self.usage {
                    *usage = new_usage;
                }
                if let Some(day) = self.closing_day {
                    *closing_day = day;
                }
            }
        }
        validate_funding(&funding)?;

        let brand = match &self.brand {
            Some(name) => name.parse()?,
            None => instrument.brand,
        };
        if let Some(valid_until) = self.valid_until {
            validate_validity(valid_until, today)?;
            instrument.valid_until = valid_until;
        }

        instrument.brand = brand;
        instrument.funding = funding;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn new_credit() -> NewInstrument {
        NewInstrument {
            card_number: "5500000000000004".to_string(),
            brand: "MasterCard".to_string(),
            valid_until: NaiveDate::from_ymd_opt(2028, 12, 31).unwrap(),
            funding: NewFunding::Credit {
                limit: dec!(2000),
                closing_day: 25,
            },
        }
    }

    #[rstest]
    #[case("4111111111111111", true)]
    #[case("411111111111111", false)]
    #[case("41111111111111112", false)]
    #[case("4111 1111 1111 11", false)]
    #[case("411111111111111a", false)]
    #[case("", false)]
    fn test_card_number(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(validate_card_number(input).is_ok(), ok);
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(31, true)]
    #[case(32, false)]
    fn test_closing_day(#[case] day: u32, #[case] ok: bool) {
        assert_eq!(validate_closing_day(day).is_ok(), ok);
    }

    #[test]
    fn test_create_credit_starts_with_zero_usage() {
        let owner = UserId::new();
        let instrument = new_credit()
            .into_instrument(owner, today(), Utc::now())
            .unwrap();
        assert_eq!(instrument.owner_id, owner);
        assert_eq!(instrument.brand, CardBrand::MasterCard);
        assert_eq!(instrument.usage(), Some(Decimal::ZERO));
        assert_eq!(instrument.limit(), Some(dec!(2000)));
        assert_eq!(instrument.version, 0);
    }

    #[test]
    fn test_create_rejects_validity_today() {
        let mut request = new_credit();
        request.valid_until = today();
        assert!(matches!(
            request.into_instrument(UserId::new(), today(), Utc::now()),
            Err(InstrumentError::Expired { .. })
        ));
    }

    #[test]
    fn test_create_rejects_zero_limit() {
        let mut request = new_credit();
        request.funding = NewFunding::Credit {
            limit: Decimal::ZERO,
            closing_day: 10,
        };
        assert_eq!(
            request.into_instrument(UserId::new(), today(), Utc::now()),
            Err(InstrumentError::NonPositiveLimit(Decimal::ZERO))
        );
    }

    #[test]
    fn test_create_rejects_negative_debit_balance() {
        let mut request = new_credit();
        request.funding = NewFunding::Debit {
            balance: dec!(-0.01),
        };
        assert_eq!(
            request.into_instrument(UserId::new(), today(), Utc::now()),
            Err(InstrumentError::NegativeBalance(dec!(-0.01)))
        );
    }

    #[test]
    fn test_create_rejects_lowercase_brand() {
        let mut request = new_credit();
        request.brand = "mastercard".to_string();
        assert!(matches!(
            request.into_instrument(UserId::new(), today(), Utc::now()),
            Err(InstrumentError::UnknownBrand(_))
        ));
    }

    #[test]
    fn test_patch_credit_fields() {
        let mut instrument = new_credit()
            .into_instrument(UserId::new(), today(), Utc::now())
            .unwrap();
        let patch = InstrumentPatch {
            brand: Some("Elo".to_string()),
            limit: Some(dec!(500)),
            usage: Some(dec!(500)),
            closing_day: Some(5),
            ..InstrumentPatch::default()
        };
        patch.apply(&mut instrument, today()).unwrap();

        assert_eq!(instrument.brand, CardBrand::Elo);
        assert_eq!(instrument.limit(), Some(dec!(500)));
        assert_eq!(instrument.usage(), Some(dec!(500)));
        assert_eq!(instrument.closing_day(), Some(5));
    }

    #[test]
    fn test_patch_keeps_usage_within_limit() {
        let mut instrument = new_credit()
            .into_instrument(UserId::new(), today(), Utc::now())
            .unwrap();
        let before = instrument.clone();
        let patch = InstrumentPatch {
            brand: Some("Amex".to_string()),
            usage: Some(dec!(2000.01)),
            ..InstrumentPatch::default()
        };

        assert!(matches!(
            patch.apply(&mut instrument, today()),
            Err(InstrumentError::InvalidUsage { .. })
        ));
        assert_eq!(instrument, before);
    }

    #[test]
    fn test_patch_rejects_field_of_other_kind() {
        let mut instrument = new_credit()
            .into_instrument(UserId::new(), today(), Utc::now())
            .unwrap();
        let patch = InstrumentPatch {
            balance: Some(dec!(10)),
            ..InstrumentPatch::default()
        };
        assert!(matches!(
            patch.apply(&mut instrument, today()),
            Err(InstrumentError::FieldNotApplicable {
                field: "balance",
                ..
            })
        ));
    }
}
