use rand::distributions::Alphanumeric;
use rand::Rng;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::entities::short_link;
use crate::error::{is_unique_violation, ApiError};

pub fn random_code(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Returns the recipe's short code, creating one on first request.
///
/// The existence pre-check is best effort; the unique key on `code` is the
/// final authority, and a losing insert retries within the same bound. A
/// racing insert for the same recipe returns the winner's code, so both
/// callers observe the identical code.
pub async fn get_or_create(
    db: &DbPool,
    app: &AppConfig,
    recipe_id: i64,
) -> Result<String, ApiError> {
    if let Some(existing) = find_by_recipe(db, recipe_id).await? {
        return Ok(existing.code);
    }

    for _ in 0..app.short_code_max_tries {
        let code = random_code(app.short_code_length);

        let taken = short_link::Entity::find()
            .filter(short_link::Column::Code.eq(&code))
            .one(db)
            .await?
            .is_some();
        if taken {
            continue;
        }

        let new_link = short_link::ActiveModel {
            recipe_id: Set(recipe_id),
            code: Set(code.clone()),
            ..Default::default()
        };

        match short_link::Entity::insert(new_link).exec(db).await {
            Ok(_) => return Ok(code),
            Err(err) if is_unique_violation(&err) => {
                if let Some(existing) = find_by_recipe(db, recipe_id).await? {
                    return Ok(existing.code);
                }
                // The code itself collided between check and insert; retry.
                continue;
            }
            Err(err) => return Err(err.into()),
        }
    }

    log::error!(
        "exhausted {} attempts generating a short code for recipe {}",
        app.short_code_max_tries,
        recipe_id
    );
    Err(ApiError::CodeSpaceExhausted)
}

async fn find_by_recipe(
    db: &DbPool,
    recipe_id: i64,
) -> Result<Option<short_link::Model>, ApiError> {
    Ok(short_link::Entity::find()
        .filter(short_link::Column::RecipeId.eq(recipe_id))
        .one(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn test_app_config() -> AppConfig {
        AppConfig {
            base_url: "http://localhost:8080".to_string(),
            min_cooking_time: 1,
            min_ingredient_amount: 1,
            short_code_length: 8,
            short_code_max_tries: 15,
        }
    }

    #[test]
    fn codes_are_alphanumeric_with_requested_length() {
        let code = random_code(8);
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[actix_web::test]
    async fn existing_link_is_returned_without_insert() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![short_link::Model {
                id: 1,
                recipe_id: 5,
                code: "Ab3dEf7h".to_string(),
                created_at: chrono::Utc::now(),
            }]])
            .into_connection();

        let code = get_or_create(&db, &test_app_config(), 5).await.unwrap();
        assert_eq!(code, "Ab3dEf7h");
    }

    #[actix_web::test]
    async fn fresh_link_is_generated_and_persisted() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            // no link for this recipe yet, generated code not taken
            .append_query_results([
                Vec::<short_link::Model>::new(),
                Vec::<short_link::Model>::new(),
            ])
            .append_exec_results([MockExecResult {
                last_insert_id: 1,
                rows_affected: 1,
            }])
            .into_connection();

        let code = get_or_create(&db, &test_app_config(), 5).await.unwrap();
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
