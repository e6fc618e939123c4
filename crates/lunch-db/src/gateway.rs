//! # PersistenceGateway for SQLite
//!
//! Thin delegation to the repositories; every [`DbError`](crate::DbError)
//! is mapped onto [`PersistenceError`], so a unique violation reaches the
//! engine as `DuplicateKey`.

use async_trait::async_trait;
use lunch_core::error::PersistenceResult;
use lunch_core::{
    NewReservation, PersistenceError, PersistenceGateway, Profile, Reservation, ReservationFilter,
    ReservationPatch,
};
use tracing::warn;

use crate::pool::Database;

#[async_trait]
impl PersistenceGateway for Database {
    async fn select_reservations(&self, owner_id: &str) -> PersistenceResult<Vec<Reservation>> {
        Ok(self.reservations().list_for_owner(owner_id).await?)
    }

    async fn insert_reservations(&self, rows: &[NewReservation]) -> PersistenceResult<()> {
        self.reservations().insert_many(rows).await.map_err(|e| {
            if !e.is_unique_violation() {
                warn!(error = %e, count = rows.len(), "Reservation insert failed");
            }
            PersistenceError::from(e)
        })?;
        Ok(())
    }

    async fn update_reservations(
        &self,
        filter: &ReservationFilter,
        patch: ReservationPatch,
    ) -> PersistenceResult<u64> {
        Ok(self.reservations().update(filter, patch).await?)
    }

    async fn upsert_profile(&self, profile: &Profile) -> PersistenceResult<()> {
        Ok(self.profiles().upsert(profile).await?)
    }

    async fn select_profile(&self, owner_id: &str) -> PersistenceResult<Option<Profile>> {
        Ok(self.profiles().get(owner_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbConfig;
    use chrono::NaiveDate;
    use lunch_core::{MenuType, ReservationStatus};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_duplicate_insert_reports_duplicate_key() {
        let gateway: Arc<dyn PersistenceGateway> =
            Arc::new(Database::new(DbConfig::in_memory()).await.unwrap());
        let row = NewReservation::confirmed(
            "u-1",
            NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            MenuType::Normal,
        );

        gateway.insert_reservations(std::slice::from_ref(&row)).await.unwrap();
        let err = gateway.insert_reservations(&[row]).await.unwrap_err();

        assert!(err.is_duplicate_key(), "expected DuplicateKey, got {err:?}");
    }

    #[tokio::test]
    async fn test_status_update_delegates_to_patch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        db.insert_reservations(&[NewReservation::confirmed("u-1", date, MenuType::Normal)])
            .await
            .unwrap();

        let filter = ReservationFilter::owner("u-1").with_dates(vec![date]);
        let affected = db
            .update_reservation_status(&filter, ReservationStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let rows = db.select_reservations("u-1").await.unwrap();
        assert_eq!(rows[0].status, ReservationStatus::Cancelled);
    }
}
