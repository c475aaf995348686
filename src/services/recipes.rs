use std::collections::HashSet;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::entities::{ingredient, recipe, recipe_ingredient};
use crate::error::ApiError;
use crate::models::{IngredientAmount, RecipeWriteRequest};

/// Field-level checks shared by create and update. The minimum-amount rule
/// is enforced on both paths.
pub fn validate_recipe_input(input: &RecipeWriteRequest, app: &AppConfig) -> Result<(), ApiError> {
    if input.name.trim().is_empty() {
        return Err(ApiError::validation("name", "Name must not be blank"));
    }
    if input.text.trim().is_empty() {
        return Err(ApiError::validation("text", "Text must not be blank"));
    }
    if input.image.trim().is_empty() {
        return Err(ApiError::validation("image", "Image must not be blank"));
    }
    if input.cooking_time < app.min_cooking_time {
        return Err(ApiError::validation(
            "cooking_time",
            format!("Cooking time must be at least {}", app.min_cooking_time),
        ));
    }
    validate_ingredient_entries(&input.ingredients, app)
}

fn validate_ingredient_entries(
    entries: &[IngredientAmount],
    app: &AppConfig,
) -> Result<(), ApiError> {
    if entries.is_empty() {
        return Err(ApiError::validation(
            "ingredients",
            "At least one ingredient is required",
        ));
    }

    let mut seen_ids = HashSet::new();
    for entry in entries {
        if !seen_ids.insert(entry.id) {
            return Err(ApiError::validation(
                "ingredients",
                format!("Ingredients must not repeat (duplicate id={})", entry.id),
            ));
        }
        if entry.amount < app.min_ingredient_amount {
            return Err(ApiError::validation(
                "amount",
                format!(
                    "Ingredient amount must be at least {}",
                    app.min_ingredient_amount
                ),
            ));
        }
    }
    Ok(())
}

/// Every referenced ingredient id must resolve to an existing row.
async fn resolve_ingredients(db: &DbPool, entries: &[IngredientAmount]) -> Result<(), ApiError> {
    let ids: Vec<i64> = entries.iter().map(|entry| entry.id).collect();
    let found = ingredient::Entity::find()
        .filter(ingredient::Column::Id.is_in(ids.clone()))
        .all(db)
        .await?;

    let found_ids: HashSet<i64> = found.iter().map(|ing| ing.id).collect();
    for id in ids {
        if !found_ids.contains(&id) {
            return Err(ApiError::validation(
                "ingredients",
                format!("Ingredient with id={} does not exist", id),
            ));
        }
    }
    Ok(())
}

fn ingredient_links(
    recipe_id: i64,
    entries: &[IngredientAmount],
) -> Vec<recipe_ingredient::ActiveModel> {
    entries
        .iter()
        .map(|entry| recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe_id),
            ingredient_id: Set(entry.id),
            amount: Set(entry.amount),
            ..Default::default()
        })
        .collect()
}

/// Inserts the recipe row and its ingredient links in one transaction; no
/// rows are written when validation fails.
pub async fn create_recipe(
    db: &DbPool,
    app: &AppConfig,
    author_id: i64,
    input: &RecipeWriteRequest,
) -> Result<recipe::Model, ApiError> {
    validate_recipe_input(input, app)?;
    resolve_ingredients(db, &input.ingredients).await?;

    let txn = db.begin().await?;

    let new_recipe = recipe::ActiveModel {
        author_id: Set(author_id),
        name: Set(input.name.clone()),
        text: Set(input.text.clone()),
        image: Set(input.image.clone()),
        cooking_time: Set(input.cooking_time),
        ..Default::default()
    };
    let created = new_recipe.insert(&txn).await?;

    recipe_ingredient::Entity::insert_many(ingredient_links(created.id, &input.ingredients))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(created)
}

/// Applies scalar changes, then replaces the ingredient set wholesale
/// (delete-all-then-reinsert). The transaction keeps the intermediate
/// no-ingredients state invisible to other callers.
pub async fn update_recipe(
    db: &DbPool,
    app: &AppConfig,
    existing: recipe::Model,
    input: &RecipeWriteRequest,
) -> Result<recipe::Model, ApiError> {
    validate_recipe_input(input, app)?;
    resolve_ingredients(db, &input.ingredients).await?;

    let recipe_id = existing.id;
    let txn = db.begin().await?;

    let mut active: recipe::ActiveModel = existing.into();
    active.name = Set(input.name.clone());
    active.text = Set(input.text.clone());
    active.image = Set(input.image.clone());
    active.cooking_time = Set(input.cooking_time);
    let updated = active.update(&txn).await?;

    recipe_ingredient::Entity::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .exec(&txn)
        .await?;
    recipe_ingredient::Entity::insert_many(ingredient_links(recipe_id, &input.ingredients))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(updated)
}

/// Ingredient links, favorites, cart entries and the short link all cascade
/// at the database level.
pub async fn delete_recipe(db: &DbPool, recipe_id: i64) -> Result<(), ApiError> {
    recipe::Entity::delete_by_id(recipe_id).exec(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn test_app_config() -> AppConfig {
        AppConfig {
            base_url: "http://localhost:8080".to_string(),
            min_cooking_time: 1,
            min_ingredient_amount: 1,
            short_code_length: 8,
            short_code_max_tries: 15,
        }
    }

    fn valid_input() -> RecipeWriteRequest {
        RecipeWriteRequest {
            name: "Borscht".to_string(),
            text: "Simmer for an hour".to_string(),
            image: "data:image/png;base64,AAAA".to_string(),
            cooking_time: 60,
            ingredients: vec![IngredientAmount { id: 7, amount: 10 }],
        }
    }

    #[test]
    fn valid_input_passes() {
        assert!(validate_recipe_input(&valid_input(), &test_app_config()).is_ok());
    }

    #[test]
    fn empty_ingredient_list_is_rejected() {
        let mut input = valid_input();
        input.ingredients.clear();
        let err = validate_recipe_input(&input, &test_app_config()).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation {
                field: "ingredients",
                ..
            }
        ));
    }

    #[test]
    fn duplicate_ingredient_id_is_rejected() {
        let mut input = valid_input();
        input.ingredients = vec![
            IngredientAmount { id: 7, amount: 10 },
            IngredientAmount { id: 7, amount: 5 },
        ];
        let err = validate_recipe_input(&input, &test_app_config()).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation {
                field: "ingredients",
                ..
            }
        ));
    }

    #[test]
    fn amount_below_minimum_is_rejected() {
        let mut input = valid_input();
        input.ingredients = vec![IngredientAmount { id: 7, amount: 0 }];
        let err = validate_recipe_input(&input, &test_app_config()).unwrap_err();
        assert!(matches!(err, ApiError::Validation { field: "amount", .. }));
    }

    #[test]
    fn cooking_time_below_minimum_is_rejected() {
        let mut input = valid_input();
        input.cooking_time = 0;
        let err = validate_recipe_input(&input, &test_app_config()).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation {
                field: "cooking_time",
                ..
            }
        ));
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut input = valid_input();
        input.name = "   ".to_string();
        let err = validate_recipe_input(&input, &test_app_config()).unwrap_err();
        assert!(matches!(err, ApiError::Validation { field: "name", .. }));
    }

    #[actix_web::test]
    async fn create_with_zero_amount_writes_nothing() {
        // No query or exec results appended: any database access would panic.
        let db = MockDatabase::new(DatabaseBackend::MySql).into_connection();

        let mut input = valid_input();
        input.ingredients = vec![IngredientAmount { id: 7, amount: 0 }];

        let err = create_recipe(&db, &test_app_config(), 1, &input)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation { field: "amount", .. }));
    }

    #[actix_web::test]
    async fn unknown_ingredient_id_is_rejected_before_the_transaction() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([Vec::<ingredient::Model>::new()])
            .into_connection();

        let err = create_recipe(&db, &test_app_config(), 1, &valid_input())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation {
                field: "ingredients",
                ..
            }
        ));
    }
}
