use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entries::FoodEntryView;
use crate::measurements::{Gender, Goal};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub gender: Gender,
    pub birthday: String,
    pub current_weight: Option<i64>,
    pub height: Option<i64>,
    pub neck_measurement: Option<i64>,
    pub waist_measurement: Option<i64>,
    pub hip_measurement: Option<i64>,
    pub goal: Goal,
    pub age: i64,
    pub fat_percentage: i64,
    pub needed_calories: i64,
}

/// Measurement update. Absent fields keep their value; 0 marks a value unknown.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub current_weight: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub neck_measurement: Option<f64>,
    #[serde(default)]
    pub waist_measurement: Option<f64>,
    #[serde(default)]
    pub hip_measurement: Option<f64>,
    #[serde(default)]
    pub goal: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileResponse {
    pub fat_percentage: i64,
    pub goal: Goal,
    pub needed_calories: i64,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStatsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub daily_calories: f64,
    pub needed_calories: i64,
    pub weight: Option<i64>,
    pub neck: Option<i64>,
    pub waist: Option<i64>,
    pub hip: Option<i64>,
    pub fat_percentage: i64,
    pub goal: Goal,
    pub age: i64,
    pub food_entries: Vec<FoodEntryView>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    pub total_calories: f64,
    pub average_percentage: f64,
}
