//! Body-composition and energy math derived from a user's measurements.
//!
//! Everything here is pure and never fails: missing or nonsensical inputs
//! produce zero results instead of errors.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::dates::parse_date;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Lose,
    #[default]
    Maintain,
    Gain,
}

impl Goal {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "lose" => Some(Goal::Lose),
            "maintain" => Some(Goal::Maintain),
            "gain" => Some(Goal::Gain),
            _ => None,
        }
    }

    /// Stored goals that no longer parse fall back to maintenance.
    pub fn parse_or_default(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Goal::Lose => "lose",
            Goal::Maintain => "maintain",
            Goal::Gain => "gain",
        }
    }

    pub fn activity_factor(self) -> f64 {
        match self {
            Goal::Lose => 1.2,
            Goal::Maintain => 1.55,
            Goal::Gain => 1.725,
        }
    }

    pub fn calorie_adjustment(self) -> f64 {
        match self {
            Goal::Lose => -500.0,
            Goal::Maintain => 0.0,
            Goal::Gain => 500.0,
        }
    }
}

/// Raw anthropometrics. `None` means the value is unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurements {
    pub gender: Gender,
    pub birthday: String,
    pub weight: Option<i64>,
    pub height: Option<i64>,
    pub waist: Option<i64>,
    pub neck: Option<i64>,
    pub hip: Option<i64>,
    pub goal: Goal,
}

/// Values recomputed on every read, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derived {
    pub age: i64,
    pub fat_percentage: i64,
    pub bmr: f64,
    pub needed_calories: i64,
}

impl Measurements {
    pub fn derive(&self, today: Date) -> Derived {
        let age = age_on(&self.birthday, today);
        let bmr = match (positive(self.weight), positive(self.height)) {
            (Some(w), Some(h)) => bmr(self.gender, w, h, age),
            _ => 0.0,
        };
        Derived {
            age,
            fat_percentage: fat_percentage(self),
            bmr,
            needed_calories: daily_target(bmr, self.goal),
        }
    }
}

fn positive(v: Option<i64>) -> Option<i64> {
    v.filter(|v| *v > 0)
}

/// Whole years between `birthday` and `today`; 0 when the birthday does not parse.
pub fn age_on(birthday: &str, today: Date) -> i64 {
    let Some(born) = parse_date(birthday) else {
        return 0;
    };
    let mut age = i64::from(today.year()) - i64::from(born.year());
    let (tm, bm) = (u8::from(today.month()), u8::from(born.month()));
    if tm < bm || (tm == bm && today.day() < born.day()) {
        age -= 1;
    }
    age
}

/// U.S. Navy body-fat estimate, clamped to [5, 50] and rounded.
/// Returns 0 when a required circumference is unknown.
pub fn fat_percentage(m: &Measurements) -> i64 {
    let (Some(waist), Some(neck), Some(height)) =
        (positive(m.waist), positive(m.neck), positive(m.height))
    else {
        return 0;
    };
    let (waist, neck, height) = (waist as f64, neck as f64, height as f64);

    let raw = match m.gender {
        Gender::Male => {
            if waist - neck <= 0.0 {
                return 0;
            }
            495.0 / (1.0324 - 0.19077 * (waist - neck).log10() + 0.15456 * height.log10()) - 450.0
        }
        Gender::Female => {
            let Some(hip) = positive(m.hip) else {
                return 0;
            };
            let girth = waist + hip as f64 - neck;
            if girth <= 0.0 {
                return 0;
            }
            495.0 / (1.29579 - 0.35004 * girth.log10() + 0.22100 * height.log10()) - 450.0
        }
    };

    if !raw.is_finite() {
        return 0;
    }
    raw.clamp(5.0, 50.0).round() as i64
}

/// Mifflin-St Jeor basal metabolic rate.
pub fn bmr(gender: Gender, weight: i64, height: i64, age: i64) -> f64 {
    let s = match gender {
        Gender::Male => 5.0,
        Gender::Female => -161.0,
    };
    10.0 * weight as f64 + 6.25 * height as f64 - 5.0 * age as f64 + s
}

/// Daily calorie target for a goal, truncated toward zero and never negative.
pub fn daily_target(bmr: f64, goal: Goal) -> i64 {
    if bmr <= 0.0 {
        return 0;
    }
    let target = (bmr * goal.activity_factor() + goal.calorie_adjustment()) as i64;
    target.max(0)
}
