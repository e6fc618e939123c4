//! # Profile Repository

use chrono::Utc;
use lunch_core::Profile;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProfileRepository { pool }
    }

    /// Inserts the profile, or overwrites the row already keyed by its owner.
    pub async fn upsert(&self, profile: &Profile) -> DbResult<()> {
        let now = Utc::now();
        debug!(owner_id = %profile.owner_id, "Upserting profile");

        sqlx::query(
            r#"
            INSERT INTO profiles (
                owner_id, email, full_name, employee_id, department, role,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            ON CONFLICT(owner_id) DO UPDATE SET
                email = excluded.email,
                full_name = excluded.full_name,
                employee_id = excluded.employee_id,
                department = excluded.department,
                role = excluded.role,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&profile.owner_id)
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(&profile.employee_id)
        .bind(&profile.department)
        .bind(&profile.role)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, owner_id: &str) -> DbResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT owner_id, email, full_name, employee_id, department, role
            FROM profiles
            WHERE owner_id = ?1
            "#,
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }
}
