use std::collections::{BTreeMap, HashMap};

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::db::DbPool;
use crate::entities::{ingredient, recipe_ingredient, shopping_cart};
use crate::error::ApiError;

/// One consolidated line of a user's shopping list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub total: u64,
}

/// Sums ingredient amounts across every recipe in the user's cart, one line
/// per (name, measurement_unit), sorted by name then unit. An empty cart
/// yields an empty list.
pub async fn build_shopping_list(
    db: &DbPool,
    user_id: i64,
) -> Result<Vec<ShoppingListItem>, ApiError> {
    let cart_rows = shopping_cart::Entity::find()
        .filter(shopping_cart::Column::UserId.eq(user_id))
        .all(db)
        .await?;

    let recipe_ids: Vec<i64> = cart_rows.iter().map(|row| row.recipe_id).collect();
    if recipe_ids.is_empty() {
        return Ok(Vec::new());
    }

    let links = recipe_ingredient::Entity::find()
        .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids))
        .all(db)
        .await?;

    let ingredient_ids: Vec<i64> = links.iter().map(|link| link.ingredient_id).collect();
    let ingredients = ingredient::Entity::find()
        .filter(ingredient::Column::Id.is_in(ingredient_ids))
        .all(db)
        .await?;

    let by_id: HashMap<i64, &ingredient::Model> =
        ingredients.iter().map(|ing| (ing.id, ing)).collect();

    let entries = links.iter().filter_map(|link| {
        by_id
            .get(&link.ingredient_id)
            .map(|ing| (ing.name.clone(), ing.measurement_unit.clone(), link.amount))
    });

    Ok(merge_amounts(entries))
}

/// Merges (name, unit, amount) entries, summing amounts per (name, unit).
/// BTreeMap keys give the deterministic name-then-unit ordering.
fn merge_amounts(
    entries: impl IntoIterator<Item = (String, String, u32)>,
) -> Vec<ShoppingListItem> {
    let mut totals: BTreeMap<(String, String), u64> = BTreeMap::new();
    for (name, unit, amount) in entries {
        *totals.entry((name, unit)).or_insert(0) += u64::from(amount);
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), total)| ShoppingListItem {
            name,
            measurement_unit,
            total,
        })
        .collect()
}

/// Plain-text rendering served as the downloadable attachment: one line per
/// item, `{name} - {total} {unit}`.
pub fn format_shopping_list(items: &[ShoppingListItem]) -> String {
    items
        .iter()
        .map(|item| format!("{} - {} {}", item.name, item.total, item.measurement_unit))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn item(name: &str, unit: &str, total: u64) -> ShoppingListItem {
        ShoppingListItem {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            total,
        }
    }

    #[test]
    fn merge_sums_same_ingredient_across_recipes() {
        let merged = merge_amounts([
            ("Salt".to_string(), "g".to_string(), 10),
            ("Salt".to_string(), "g".to_string(), 5),
        ]);
        assert_eq!(merged, vec![item("Salt", "g", 15)]);
    }

    #[test]
    fn merge_keeps_different_units_separate() {
        let merged = merge_amounts([
            ("Milk".to_string(), "ml".to_string(), 200),
            ("Milk".to_string(), "g".to_string(), 50),
        ]);
        assert_eq!(merged, vec![item("Milk", "g", 50), item("Milk", "ml", 200)]);
    }

    #[test]
    fn merge_sorts_by_name() {
        let merged = merge_amounts([
            ("Sugar".to_string(), "kg".to_string(), 1),
            ("Flour".to_string(), "kg".to_string(), 2),
        ]);
        assert_eq!(merged, vec![item("Flour", "kg", 2), item("Sugar", "kg", 1)]);
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        assert!(merge_amounts([]).is_empty());
    }

    #[test]
    fn format_renders_one_line_per_item() {
        let items = vec![item("Salt", "g", 15), item("Sugar", "kg", 3)];
        assert_eq!(format_shopping_list(&items), "Salt - 15 g\nSugar - 3 kg");
    }

    #[test]
    fn format_of_empty_list_is_empty() {
        assert_eq!(format_shopping_list(&[]), "");
    }

    #[actix_web::test]
    async fn empty_cart_yields_empty_list() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([Vec::<shopping_cart::Model>::new()])
            .into_connection();

        let items = build_shopping_list(&db, 1).await.unwrap();
        assert!(items.is_empty());
    }

    #[actix_web::test]
    async fn duplicate_ingredient_across_two_cart_recipes_is_summed() {
        let now = chrono::Utc::now();
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![
                shopping_cart::Model {
                    id: 1,
                    user_id: 1,
                    recipe_id: 10,
                    added_at: now,
                },
                shopping_cart::Model {
                    id: 2,
                    user_id: 1,
                    recipe_id: 11,
                    added_at: now,
                },
            ]])
            .append_query_results([vec![
                recipe_ingredient::Model {
                    id: 1,
                    recipe_id: 10,
                    ingredient_id: 7,
                    amount: 10,
                },
                recipe_ingredient::Model {
                    id: 2,
                    recipe_id: 11,
                    ingredient_id: 7,
                    amount: 5,
                },
            ]])
            .append_query_results([vec![ingredient::Model {
                id: 7,
                name: "Salt".to_string(),
                measurement_unit: "g".to_string(),
            }]])
            .into_connection();

        let items = build_shopping_list(&db, 1).await.unwrap();
        assert_eq!(
            items,
            vec![ShoppingListItem {
                name: "Salt".to_string(),
                measurement_unit: "g".to_string(),
                total: 15,
            }]
        );
    }
}
