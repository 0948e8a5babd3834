//! One-shot catalog seeding from the nutrition dataset CSV.
//!
//! Columns: `name, (ignored), calories, fat, carbs, protein, ...`, values per gram.
//! The catalog stores everything per 100 g.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::repo::{count_foods, insert_food_tx};
use super::repo_types::{NewFood, NewServing};

const CATEGORY: &str = "General";

/// Seeds the catalog when it is empty. Returns the number of foods inserted.
///
/// Everything is inserted in one transaction so requests never see a partial catalog.
pub async fn seed_if_empty(db: &SqlitePool, csv_path: &Path) -> anyhow::Result<usize> {
    if count_foods(db).await? > 0 {
        info!("food catalog already populated; skipping seed");
        return Ok(0);
    }

    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("open food dataset {}", csv_path.display()))?;
    let rows = parse_catalog(file)?;

    let mut tx = db.begin().await.context("begin seed tx")?;
    for (food, servings) in &rows {
        insert_food_tx(&mut tx, food, servings).await?;
    }
    tx.commit().await.context("commit seed tx")?;

    info!(foods = rows.len(), path = %csv_path.display(), "food catalog seeded");
    Ok(rows.len())
}

/// Parses dataset rows into foods with their servings. The first line is a header.
pub fn parse_catalog<R: Read>(reader: R) -> anyhow::Result<Vec<(NewFood, Vec<NewServing>)>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut out = Vec::new();
    for (line, record) in csv.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!(line = line + 2, error = %e, "skipping unreadable dataset row");
                continue;
            }
        };
        if record.len() < 6 {
            continue;
        }
        let name = record[0].trim();
        if name.is_empty() || name == "deprecated" {
            continue;
        }

        let calories = number(&record[2]);
        let fat = number(&record[3]);
        let carbs = number(&record[4]);
        let protein = number(&record[5]);

        let food = NewFood {
            name: name.to_string(),
            calories_per_100g: (calories * 100.0) as i64,
            protein: protein * 100.0,
            carbohydrates: carbs * 100.0,
            fat: fat * 100.0,
            serving_size: 100,
            category: CATEGORY.to_string(),
        };
        let servings = servings_for(name);
        out.push((food, servings));
    }
    Ok(out)
}

/// Non-numeric cells count as zero.
fn number(cell: &str) -> f64 {
    cell.trim().parse::<f64>().unwrap_or(0.0)
}

/// Baseline servings plus the first name-based extra that matches.
pub fn servings_for(name: &str) -> Vec<NewServing> {
    let mut servings = vec![
        NewServing { description: "100 grams", grams: 100.0 },
        NewServing { description: "50 grams", grams: 50.0 },
    ];

    let lower = name.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if has(&["oil", "sauce", "dressing"]) {
        servings.push(NewServing { description: "1 tablespoon", grams: 15.0 });
        servings.push(NewServing { description: "1 teaspoon", grams: 5.0 });
    } else if has(&["fruit", "apple", "orange", "banana", "pear", "peach"]) {
        servings.push(NewServing { description: "1 medium piece", grams: 150.0 });
    } else if has(&["egg"]) {
        servings.push(NewServing { description: "1 piece", grams: 50.0 });
    } else if has(&["bread", "toast"]) {
        servings.push(NewServing { description: "1 slice", grams: 30.0 });
    } else if has(&["rice", "pasta", "noodle"]) {
        servings.push(NewServing { description: "1 cup cooked", grams: 200.0 });
    }

    servings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foods::repo::{find_serving, list_with_servings};
    use crate::state::AppState;

    const DATASET: &str = "\
name,id,calories,fat,carbs,protein,fiber
Apple,1,0.52,0.002,0.14,0.003,0.024
deprecated,2,1,1,1,1,1
Olive Oil,3,8.84,1,0,0,0
short,row
Boiled Egg,4,1.55,0.11,0.011,0.13,0
Mystery,5,abc,0.1,0.2,0.3,0
\"Bread, white\",6,2.65,0.032,0.49,0.09,0
";

    fn descriptions(servings: &[NewServing]) -> Vec<&'static str> {
        servings.iter().map(|s| s.description).collect()
    }

    #[test]
    fn parse_scales_values_and_skips_bad_rows() {
        let rows = parse_catalog(DATASET.as_bytes()).unwrap();
        let names: Vec<_> = rows.iter().map(|(f, _)| f.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "Olive Oil", "Boiled Egg", "Mystery", "Bread, white"]);

        let apple = &rows[0].0;
        assert_eq!(apple.calories_per_100g, 52);
        assert!((apple.fat - 0.2).abs() < 1e-9);
        assert!((apple.carbohydrates - 14.0).abs() < 1e-9);
        assert!((apple.protein - 0.3).abs() < 1e-9);
        assert_eq!(apple.category, "General");
        assert_eq!(apple.serving_size, 100);

        let mystery = &rows[3].0;
        assert_eq!(mystery.calories_per_100g, 0);
        assert!((mystery.protein - 30.0).abs() < 1e-9);
    }

    #[test]
    fn servings_follow_name_priority() {
        assert_eq!(
            descriptions(&servings_for("Olive Oil")),
            vec!["100 grams", "50 grams", "1 tablespoon", "1 teaspoon"]
        );
        assert_eq!(
            descriptions(&servings_for("APPLE pie")),
            vec!["100 grams", "50 grams", "1 medium piece"]
        );
        assert_eq!(
            descriptions(&servings_for("Egg noodles")),
            vec!["100 grams", "50 grams", "1 piece"]
        );
        assert_eq!(
            descriptions(&servings_for("Garlic toast")),
            vec!["100 grams", "50 grams", "1 slice"]
        );
        assert_eq!(
            descriptions(&servings_for("Brown rice")),
            vec!["100 grams", "50 grams", "1 cup cooked"]
        );
        // sauce wins over everything below it
        assert_eq!(servings_for("Apple sauce").len(), 4);
        assert_eq!(descriptions(&servings_for("Cheddar")), vec!["100 grams", "50 grams"]);
    }

    #[tokio::test]
    async fn seed_runs_once() {
        let state = AppState::for_tests().await;
        let dir = std::env::temp_dir().join(format!("calorics-seed-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dataset.csv");
        std::fs::write(&path, DATASET).unwrap();

        assert_eq!(seed_if_empty(&state.db, &path).await.unwrap(), 5);
        assert_eq!(seed_if_empty(&state.db, &path).await.unwrap(), 0);

        let foods = list_with_servings(&state.db).await.unwrap();
        assert_eq!(foods.len(), 5);
        let (apple, servings) = foods.iter().find(|(f, _)| f.name == "Apple").unwrap();
        assert_eq!(servings.len(), 3);
        let piece = find_serving(&state.db, apple.id, "1 medium piece").await.unwrap().unwrap();
        assert_eq!(piece.grams, 150.0);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn missing_dataset_fails_only_for_empty_catalog() {
        let state = AppState::for_tests().await;
        let missing = Path::new("/definitely/not/here.csv");
        assert!(seed_if_empty(&state.db, missing).await.is_err());

        let mut tx = state.db.begin().await.unwrap();
        for (food, servings) in parse_catalog(DATASET.as_bytes()).unwrap().iter().take(1) {
            insert_food_tx(&mut tx, food, servings).await.unwrap();
        }
        tx.commit().await.unwrap();

        assert_eq!(seed_if_empty(&state.db, missing).await.unwrap(), 0);
        assert_eq!(count_foods(&state.db).await.unwrap(), 1);
    }
}
