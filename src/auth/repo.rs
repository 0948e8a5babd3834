use anyhow::Context;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{MeasurementsUpdate, NewUser, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, gender, birthday, weight, height, \
                            waist, neck, hip, goal, created_at, updated_at";

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &SqlitePool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1 AND deleted_at IS NULL"
        ))
        .bind(email)
        .fetch_optional(db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    pub async fn find_by_id(db: &SqlitePool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    /// Create a new user with hashed password.
    pub async fn create(db: &SqlitePool, new: &NewUser) -> anyhow::Result<User> {
        let now = OffsetDateTime::now_utc();
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, name, email, password_hash, gender, birthday,
                               weight, height, waist, neck, hip, goal, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.gender.as_str())
        .bind(&new.birthday)
        .bind(new.weight)
        .bind(new.height)
        .bind(new.waist)
        .bind(new.neck)
        .bind(new.hip)
        .bind(new.goal.as_str())
        .bind(now)
        .fetch_one(db)
        .await
        .context("insert user")?;
        Ok(user)
    }

    /// Overwrite the stored measurements and goal.
    pub async fn update_measurements(
        db: &SqlitePool,
        id: Uuid,
        update: &MeasurementsUpdate,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET weight = ?2, height = ?3, neck = ?4, waist = ?5, hip = ?6,
                   goal = ?7, updated_at = ?8
             WHERE id = ?1 AND deleted_at IS NULL
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.weight)
        .bind(update.height)
        .bind(update.neck)
        .bind(update.waist)
        .bind(update.hip)
        .bind(update.goal.as_str())
        .bind(OffsetDateTime::now_utc())
        .fetch_optional(db)
        .await
        .context("update user measurements")?;
        Ok(user)
    }
}

/// True when `err` wraps a unique-constraint violation from the store.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<sqlx::Error>()
            .and_then(|e| e.as_database_error())
            .map(|e| e.is_unique_violation())
            .unwrap_or(false)
    })
}
