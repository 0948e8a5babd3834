use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::measurements::{Gender, Goal, Measurements};

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,        // Argon2 hash, not exposed in JSON
    pub gender: String,               // "male" | "female"
    pub birthday: String,             // YYYY-MM-DD
    pub weight: Option<i64>,          // kg
    pub height: Option<i64>,          // cm
    pub waist: Option<i64>,           // cm
    pub neck: Option<i64>,            // cm
    pub hip: Option<i64>,             // cm
    pub goal: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    pub fn measurements(&self) -> Measurements {
        Measurements {
            gender: Gender::parse(&self.gender).unwrap_or(Gender::Male),
            birthday: self.birthday.clone(),
            weight: self.weight,
            height: self.height,
            waist: self.waist,
            neck: self.neck,
            hip: self.hip,
            goal: Goal::parse_or_default(&self.goal),
        }
    }
}

/// Fields needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub gender: Gender,
    pub birthday: String,
    pub weight: Option<i64>,
    pub height: Option<i64>,
    pub waist: Option<i64>,
    pub neck: Option<i64>,
    pub hip: Option<i64>,
    pub goal: Goal,
}

/// New measurement values for a profile update; `None` clears the column.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementsUpdate {
    pub weight: Option<i64>,
    pub height: Option<i64>,
    pub neck: Option<i64>,
    pub waist: Option<i64>,
    pub hip: Option<i64>,
    pub goal: Goal,
}
