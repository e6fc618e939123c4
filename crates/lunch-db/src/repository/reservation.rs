//! # Reservation Repository
//!
//! Queries on the `reservations` table. Every statement is scoped by
//! `owner_id`.

use chrono::{NaiveDate, Utc};
use lunch_core::{NewReservation, Reservation, ReservationFilter, ReservationPatch};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;

const SELECT_COLUMNS: &str = "SELECT id, owner_id, date, menu_type, status, created_at FROM reservations";

/// Repository for reservation rows.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: SqlitePool,
}

impl ReservationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReservationRepository { pool }
    }

    /// Every row of `owner_id`, ordered by date ascending.
    pub async fn list_for_owner(&self, owner_id: &str) -> DbResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, Reservation>(&format!(
            "{SELECT_COLUMNS} WHERE owner_id = ?1 ORDER BY date ASC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(owner_id = %owner_id, count = rows.len(), "Listed reservations");
        Ok(rows)
    }

    pub async fn find_by_date(&self, owner_id: &str, date: NaiveDate) -> DbResult<Option<Reservation>> {
        let row = sqlx::query_as::<_, Reservation>(&format!(
            "{SELECT_COLUMNS} WHERE owner_id = ?1 AND date = ?2"
        ))
        .bind(owner_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Inserts all rows in one transaction.
    ///
    /// A unique violation on any row rolls the whole batch back and
    /// surfaces as [`DbError::UniqueViolation`](crate::DbError::UniqueViolation).
    pub async fn insert_many(&self, rows: &[NewReservation]) -> DbResult<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let created_at = Utc::now();

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO reservations (id, owner_id, date, menu_type, status, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&row.owner_id)
            .bind(row.date)
            .bind(row.menu_type)
            .bind(row.status)
            .bind(created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(count = rows.len(), "Inserted reservations");
        Ok(rows.len() as u64)
    }

    /// Applies `patch` to every row matching `filter`. Returns rows affected.
    ///
    /// An empty patch changes nothing and reports the number of matching rows.
    pub async fn update(&self, filter: &ReservationFilter, patch: ReservationPatch) -> DbResult<u64> {
        if patch.is_empty() {
            return self.count(filter).await;
        }

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("UPDATE reservations SET ");
        {
            let mut sets = qb.separated(", ");
            if let Some(status) = patch.status {
                sets.push("status = ").push_bind_unseparated(status);
            }
            if let Some(menu_type) = patch.menu_type {
                sets.push("menu_type = ").push_bind_unseparated(menu_type);
            }
        }
        push_filter(&mut qb, filter);

        let affected = qb.build().execute(&self.pool).await?.rows_affected();

        debug!(
            owner_id = %filter.owner_id,
            status = ?patch.status,
            menu_type = ?patch.menu_type,
            affected,
            "Updated reservations"
        );
        Ok(affected)
    }

    pub async fn count(&self, filter: &ReservationFilter) -> DbResult<u64> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM reservations");
        push_filter(&mut qb, filter);

        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &ReservationFilter) {
    qb.push(" WHERE owner_id = ").push_bind(filter.owner_id.clone());

    if let Some(id) = &filter.id {
        qb.push(" AND id = ").push_bind(id.clone());
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(dates) = &filter.dates {
        if dates.is_empty() {
            qb.push(" AND 0");
        } else {
            qb.push(" AND date IN (");
            let mut list = qb.separated(", ");
            for date in dates {
                list.push_bind(*date);
            }
            list.push_unseparated(")");
        }
    }
    if let Some((start, end)) = filter.date_range {
        qb.push(" AND date >= ").push_bind(start);
        qb.push(" AND date <= ").push_bind(end);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig, DbError};
    use lunch_core::{MenuType, ReservationStatus};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    async fn repo() -> ReservationRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().reservations()
    }

    #[tokio::test]
    async fn test_insert_and_list_ordered() {
        let repo = repo().await;
        repo.insert_many(&[
            NewReservation::confirmed("u-1", date(12), MenuType::Normal),
            NewReservation::confirmed("u-1", date(10), MenuType::Hipocaloric),
            NewReservation::confirmed("u-2", date(10), MenuType::Normal),
        ])
        .await
        .unwrap();

        let rows = repo.list_for_owner("u-1").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, date(10));
        assert_eq!(rows[0].menu_type, MenuType::Hipocaloric);
        assert_eq!(rows[1].date, date(12));
        assert!(rows.iter().all(|r| r.status == ReservationStatus::Confirmed));
    }

    #[tokio::test]
    async fn test_duplicate_date_rolls_back_batch() {
        let repo = repo().await;
        repo.insert_many(&[NewReservation::confirmed("u-1", date(10), MenuType::Normal)])
            .await
            .unwrap();

        let err = repo
            .insert_many(&[
                NewReservation::confirmed("u-1", date(11), MenuType::Normal),
                NewReservation::confirmed("u-1", date(10), MenuType::Normal),
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        // 06-11 was rolled back with the rest of the batch
        assert_eq!(repo.list_for_owner("u-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_with_filter() {
        let repo = repo().await;
        repo.insert_many(&[
            NewReservation::confirmed("u-1", date(10), MenuType::Normal),
            NewReservation::confirmed("u-1", date(11), MenuType::Normal),
            NewReservation::confirmed("u-1", date(20), MenuType::Normal),
        ])
        .await
        .unwrap();

        let in_range = ReservationFilter::owner("u-1")
            .with_status(ReservationStatus::Confirmed)
            .with_date_range(date(9), date(15));
        let affected = repo
            .update(&in_range, ReservationPatch::status(ReservationStatus::Cancelled))
            .await
            .unwrap();
        assert_eq!(affected, 2);

        let reactivate = ReservationFilter::owner("u-1")
            .with_status(ReservationStatus::Cancelled)
            .with_dates(vec![date(10)]);
        let affected = repo
            .update(&reactivate, ReservationPatch::reactivate(MenuType::Hipocaloric))
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let row = repo.find_by_date("u-1", date(10)).await.unwrap().unwrap();
        assert_eq!(row.status, ReservationStatus::Confirmed);
        assert_eq!(row.menu_type, MenuType::Hipocaloric);

        let other_owner = ReservationFilter::owner("u-2");
        assert_eq!(
            repo.update(&other_owner, ReservationPatch::status(ReservationStatus::Cancelled))
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_update_by_unknown_id_affects_nothing() {
        let repo = repo().await;
        let filter = ReservationFilter::owner("u-1").with_id("missing");
        assert_eq!(
            repo.update(&filter, ReservationPatch::menu(MenuType::Normal)).await.unwrap(),
            0
        );
    }
}
