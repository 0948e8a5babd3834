use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Food set record in the database. Its entries live in `food_entries`.
#[derive(Debug, Clone, FromRow)]
pub struct FoodSet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: OffsetDateTime,
}
