//! Instrument service: registration, edits, soft delete and balance queries.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use spendwise_shared::types::{InstrumentId, UserId};
use tracing::{info, warn};

use super::error::InstrumentError;
use super::types::{Instrument, InstrumentKind};
use super::validation::{InstrumentPatch, NewInstrument};
use crate::store::{LedgerStoreRef, StoreError};

/// Instrument service over a ledger store.
#[derive(Clone)]
pub struct InstrumentService {
    store: LedgerStoreRef,
}

impl InstrumentService {
    /// Creates a new instrument service.
    #[must_use]
    pub fn new(store: LedgerStoreRef) -> Self {
        Self { store }
    }

    /// Registers a card for the owner.
    ///
    /// # Errors
    ///
    /// Returns a validation error for any failing field rule, including a card
    /// number the owner already has registered.
    pub async fn create(
        &self,
        owner: UserId,
        request: NewInstrument,
        today: NaiveDate,
    ) -> Result<Instrument, InstrumentError> {
        let instrument = request.into_instrument(owner, today, Utc::now())?;

        if self
            .store
            .find_instrument_by_number(owner, &instrument.card_number)
            .await?
            .is_some()
        {
            return Err(InstrumentError::DuplicateCardNumber);
        }

        let instrument = self
            .store
            .insert_instrument(instrument)
            .await
            .map_err(|err| {
                if err.is_conflict() {
                    InstrumentError::DuplicateCardNumber
                } else {
                    err.into()
                }
            })?;
        info!(
            owner = %owner,
            instrument_id = %instrument.id,
            kind = %instrument.kind(),
            "Instrument registered"
        );
        Ok(instrument)
    }

    /// Applies a patch to a live card.
    ///
    /// # Errors
    ///
    /// Returns `InstrumentError::UnknownInstrument` if the card is missing or was
    /// deleted, a validation error for a failing field rule, or a store conflict
    /// if the card changed concurrently.
    pub async fn update(
        &self,
        owner: UserId,
        id: InstrumentId,
        patch: &InstrumentPatch,
        today: NaiveDate,
    ) -> Result<Instrument, InstrumentError> {
        let mut instrument = self.load(owner, id).await?;
        patch.apply(&mut instrument, today)?;
        instrument.updated_at = Utc::now();

        match self.store.save_instrument(instrument).await {
            Ok(saved) => {
                info!(owner = %owner, instrument_id = %id, version = saved.version, "Instrument updated");
                Ok(saved)
            }
            Err(err) => Err(self.resolve_conflict(owner, id, err).await),
        }
    }

    /// Soft-deletes a card. Expenses referencing it are kept.
    ///
    /// # Errors
    ///
    /// Returns `InstrumentError::UnknownInstrument` if the card is missing or
    /// already deleted.
    pub async fn delete(&self, owner: UserId, id: InstrumentId) -> Result<(), InstrumentError> {
        let mut instrument = self.load(owner, id).await?;
        let now = Utc::now();
        instrument.deleted_at = Some(now);
        instrument.updated_at = now;

        match self.store.save_instrument(instrument).await {
            Ok(_) => {
                info!(owner = %owner, instrument_id = %id, "Instrument deleted");
                Ok(())
            }
            Err(err) => Err(self.resolve_conflict(owner, id, err).await),
        }
    }

    /// Live card owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `InstrumentError::UnknownInstrument` if missing or deleted.
    pub async fn get(&self, owner: UserId, id: InstrumentId) -> Result<Instrument, InstrumentError> {
        self.load(owner, id).await
    }

    /// Live cards owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns a store error if the listing fails.
    pub async fn list(&self, owner: UserId) -> Result<Vec<Instrument>, InstrumentError> {
        Ok(self.store.list_instruments(owner).await?)
    }

    /// Current usage of a live credit card.
    ///
    /// # Errors
    ///
    /// Returns `InstrumentError::NotFound` if there is no live credit card with this id.
    pub async fn credit_usage(&self, owner: UserId, id: InstrumentId) -> Result<Decimal, InstrumentError> {
        self.store
            .find_instrument(owner, id)
            .await?
            .and_then(|instrument| instrument.usage())
            .ok_or(InstrumentError::NotFound {
                id,
                kind: InstrumentKind::Credit,
            })
    }

    /// Current balance of a live debit card.
    ///
    /// # Errors
    ///
    /// Returns `InstrumentError::NotFound` if there is no live debit card with this id.
    pub async fn debit_balance(&self, owner: UserId, id: InstrumentId) -> Result<Decimal, InstrumentError> {
        self.store
            .find_instrument(owner, id)
            .await?
            .and_then(|instrument| instrument.balance())
            .ok_or(InstrumentError::NotFound {
                id,
                kind: InstrumentKind::Debit,
            })
    }

    async fn load(&self, owner: UserId, id: InstrumentId) -> Result<Instrument, InstrumentError> {
        self.store
            .find_instrument(owner, id)
            .await?
            .ok_or(InstrumentError::UnknownInstrument(id))
    }

    /// A conflicting write is re-checked once: a card that is gone is reported
    /// as not found, otherwise the conflict goes back to the caller.
    async fn resolve_conflict(
        &self,
        owner: UserId,
        id: InstrumentId,
        err: StoreError,
    ) -> InstrumentError {
        if !err.is_conflict() {
            return err.into();
        }

        match self.store.find_instrument(owner, id).await {
            Ok(None) => InstrumentError::UnknownInstrument(id),
            Ok(Some(_)) => {
                warn!(owner = %owner, instrument_id = %id, "Instrument changed concurrently");
                err.into()
            }
            Err(lookup) => lookup.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::validation::NewFunding;
    use crate::store::InMemoryLedgerStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn debit_request(card_number: &str) -> NewInstrument {
        NewInstrument {
            card_number: card_number.to_string(),
            brand: "Visa".to_string(),
            valid_until: NaiveDate::from_ymd_opt(2029, 6, 30).unwrap(),
            funding: NewFunding::Debit { balance: dec!(800) },
        }
    }

    fn credit_request(card_number: &str) -> NewInstrument {
        NewInstrument {
            card_number: card_number.to_string(),
            brand: "Elo".to_string(),
            valid_until: NaiveDate::from_ymd_opt(2029, 6, 30).unwrap(),
            funding: NewFunding::Credit {
                limit: dec!(1500),
                closing_day: 12,
            },
        }
    }

    fn service() -> InstrumentService {
        InstrumentService::new(Arc::new(InMemoryLedgerStore::new()))
    }

    #[tokio::test]
    async fn test_create_and_query_balances() {
        let service = service();
        let owner = UserId::new();

        let debit = service
            .create(owner, debit_request("1111222233334444"), today())
            .await
            .unwrap();
        let credit = service
            .create(owner, credit_request("5555666677778888"), today())
            .await
            .unwrap();

        assert_eq!(service.debit_balance(owner, debit.id).await.unwrap(), dec!(800));
        assert_eq!(service.credit_usage(owner, credit.id).await.unwrap(), Decimal::ZERO);
        assert!(matches!(
            service.credit_usage(owner, debit.id).await,
            Err(InstrumentError::NotFound { .. })
        ));
        assert_eq!(service.list(owner).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_card_number_rejected_per_owner() {
        let service = service();
        let owner = UserId::new();

        service
            .create(owner, debit_request("1111222233334444"), today())
            .await
            .unwrap();
        assert_eq!(
            service
                .create(owner, credit_request("1111222233334444"), today())
                .await,
            Err(InstrumentError::DuplicateCardNumber)
        );

        // Another owner may register the same number
        assert!(
            service
                .create(UserId::new(), debit_request("1111222233334444"), today())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_deleted_card_number_can_be_registered_again() {
        let service = service();
        let owner = UserId::new();

        let first = service
            .create(owner, debit_request("1111222233334444"), today())
            .await
            .unwrap();
        service.delete(owner, first.id).await.unwrap();

        assert!(
            service
                .create(owner, debit_request("1111222233334444"), today())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_update_bumps_version() {
        let service = service();
        let owner = UserId::new();
        let credit = service
            .create(owner, credit_request("5555666677778888"), today())
            .await
            .unwrap();

        let patch = InstrumentPatch {
            limit: Some(dec!(3000)),
            closing_day: Some(28),
            ..InstrumentPatch::default()
        };
        let updated = service.update(owner, credit.id, &patch, today()).await.unwrap();

        assert_eq!(updated.limit(), Some(dec!(3000)));
        assert_eq!(updated.closing_day(), Some(28));
        assert_eq!(updated.version, credit.version + 1);
    }

    #[tokio::test]
    async fn test_deleted_card_is_not_found() {
        let service = service();
        let owner = UserId::new();
        let debit = service
            .create(owner, debit_request("1111222233334444"), today())
            .await
            .unwrap();

        service.delete(owner, debit.id).await.unwrap();

        assert_eq!(
            service.get(owner, debit.id).await,
            Err(InstrumentError::UnknownInstrument(debit.id))
        );
        assert_eq!(
            service.delete(owner, debit.id).await,
            Err(InstrumentError::UnknownInstrument(debit.id))
        );
        assert!(service.list(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_owner_cannot_see_card() {
        let service = service();
        let debit = service
            .create(UserId::new(), debit_request("1111222233334444"), today())
            .await
            .unwrap();

        assert!(matches!(
            service.debit_balance(UserId::new(), debit.id).await,
            Err(InstrumentError::NotFound { .. })
        ));
    }
}
