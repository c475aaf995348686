use crate::db::DbPool;
use crate::entities::ingredient;
use crate::error::ApiError;
use crate::models::{IngredientQuery, IngredientResponse};
use actix_web::{web, HttpResponse};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

fn to_response(model: ingredient::Model) -> IngredientResponse {
    IngredientResponse {
        id: model.id,
        name: model.name,
        measurement_unit: model.measurement_unit,
    }
}

#[utoipa::path(
    get,
    path = "/api/ingredients",
    params(
        ("name" = Option<String>, Query, description = "Name prefix filter")
    ),
    responses(
        (status = 200, description = "List of ingredients", body = Vec<IngredientResponse>)
    ),
    tag = "ingredients"
)]
pub async fn list_ingredients(
    query: web::Query<IngredientQuery>,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let mut find = ingredient::Entity::find().order_by_asc(ingredient::Column::Name);
    if let Some(prefix) = query.name.as_deref() {
        if !prefix.is_empty() {
            // Prefix match is case-insensitive under the default collation.
            find = find.filter(ingredient::Column::Name.starts_with(prefix));
        }
    }

    let ingredients = find.all(pool.get_ref()).await?;
    let responses: Vec<IngredientResponse> = ingredients.into_iter().map(to_response).collect();
    Ok(HttpResponse::Ok().json(responses))
}

#[utoipa::path(
    get,
    path = "/api/ingredients/{id}",
    params(("id" = i64, Path, description = "Ingredient ID")),
    responses(
        (status = 200, description = "Ingredient", body = IngredientResponse),
        (status = 404, description = "Ingredient not found")
    ),
    tag = "ingredients"
)]
pub async fn get_ingredient(
    path: web::Path<i64>,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let ingredient_id = path.into_inner();
    let found = ingredient::Entity::find_by_id(ingredient_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("ingredient"))?;

    Ok(HttpResponse::Ok().json(to_response(found)))
}
