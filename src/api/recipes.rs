use std::collections::HashMap;

use crate::api::users::build_profile;
use crate::auth::AuthenticatedUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::entities::{favorite, ingredient, recipe, recipe_ingredient, shopping_cart, user};
use crate::error::ApiError;
use crate::models::{
    IngredientInRecipe, RecipeMinified, RecipeQuery, RecipeResponse, RecipeWriteRequest,
    ShortLinkResponse,
};
use crate::services::{recipes, relations, shopping_list, short_link};
use actix_web::{web, HttpResponse};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

fn to_minified(model: &recipe::Model) -> RecipeMinified {
    RecipeMinified {
        id: model.id,
        name: model.name.clone(),
        image: model.image.clone(),
        cooking_time: model.cooking_time,
    }
}

async fn to_recipe_response(
    db: &DbPool,
    model: &recipe::Model,
    viewer: Option<i64>,
) -> Result<RecipeResponse, ApiError> {
    let author = user::Entity::find_by_id(model.author_id)
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    let author_profile = build_profile(db, &author, viewer).await?;

    let links = recipe_ingredient::Entity::find()
        .filter(recipe_ingredient::Column::RecipeId.eq(model.id))
        .all(db)
        .await?;
    let ingredient_ids: Vec<i64> = links.iter().map(|link| link.ingredient_id).collect();
    let ingredients = ingredient::Entity::find()
        .filter(ingredient::Column::Id.is_in(ingredient_ids))
        .all(db)
        .await?;
    let by_id: HashMap<i64, &ingredient::Model> =
        ingredients.iter().map(|ing| (ing.id, ing)).collect();

    let ingredient_rows = links
        .iter()
        .filter_map(|link| {
            by_id.get(&link.ingredient_id).map(|ing| IngredientInRecipe {
                id: ing.id,
                name: ing.name.clone(),
                measurement_unit: ing.measurement_unit.clone(),
                amount: link.amount,
            })
        })
        .collect();

    let (is_favorited, is_in_shopping_cart) = match viewer {
        Some(viewer_id) => (
            relations::is_favorited(db, viewer_id, model.id).await?,
            relations::is_in_shopping_cart(db, viewer_id, model.id).await?,
        ),
        None => (false, false),
    };

    Ok(RecipeResponse {
        id: model.id,
        author: author_profile,
        ingredients: ingredient_rows,
        is_favorited,
        is_in_shopping_cart,
        name: model.name.clone(),
        image: model.image.clone(),
        text: model.text.clone(),
        cooking_time: model.cooking_time,
    })
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("author" = Option<i64>, Query, description = "Filter by author id"),
        ("is_favorited" = Option<u8>, Query, description = "1 keeps only favorited recipes"),
        ("is_in_shopping_cart" = Option<u8>, Query, description = "1 keeps only recipes in the cart")
    ),
    responses(
        (status = 200, description = "List of recipes", body = Vec<RecipeResponse>)
    ),
    tag = "recipes"
)]
pub async fn list_recipes(
    viewer: Option<AuthenticatedUser>,
    pool: web::Data<DbPool>,
    query: web::Query<RecipeQuery>,
) -> Result<HttpResponse, ApiError> {
    let viewer_id = viewer.map(|u| u.user_id);
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);
    let offset = (page - 1) * limit;

    let mut find = recipe::Entity::find().order_by_desc(recipe::Column::Id);

    if let Some(author_id) = query.author {
        find = find.filter(recipe::Column::AuthorId.eq(author_id));
    }

    if let Some(flag) = query.is_favorited {
        match viewer_id {
            // Anonymous callers have no favorites: 1 filters everything out,
            // 0 filters nothing.
            None => {
                if flag != 0 {
                    return Ok(HttpResponse::Ok().json(Vec::<RecipeResponse>::new()));
                }
            }
            Some(viewer_id) => {
                let rows = favorite::Entity::find()
                    .filter(favorite::Column::UserId.eq(viewer_id))
                    .all(pool.get_ref())
                    .await?;
                let ids: Vec<i64> = rows.iter().map(|row| row.recipe_id).collect();
                find = if flag != 0 {
                    find.filter(recipe::Column::Id.is_in(ids))
                } else {
                    find.filter(recipe::Column::Id.is_not_in(ids))
                };
            }
        }
    }

    if let Some(flag) = query.is_in_shopping_cart {
        match viewer_id {
            None => {
                if flag != 0 {
                    return Ok(HttpResponse::Ok().json(Vec::<RecipeResponse>::new()));
                }
            }
            Some(viewer_id) => {
                let rows = shopping_cart::Entity::find()
                    .filter(shopping_cart::Column::UserId.eq(viewer_id))
                    .all(pool.get_ref())
                    .await?;
                let ids: Vec<i64> = rows.iter().map(|row| row.recipe_id).collect();
                find = if flag != 0 {
                    find.filter(recipe::Column::Id.is_in(ids))
                } else {
                    find.filter(recipe::Column::Id.is_not_in(ids))
                };
            }
        }
    }

    let recipes_page = find
        .limit(limit)
        .offset(offset)
        .all(pool.get_ref())
        .await?;

    let mut responses = Vec::new();
    for model in &recipes_page {
        responses.push(to_recipe_response(pool.get_ref(), model, viewer_id).await?);
    }

    Ok(HttpResponse::Ok().json(responses))
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    request_body = RecipeWriteRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "recipes"
)]
pub async fn create_recipe(
    req: web::Json<RecipeWriteRequest>,
    current: AuthenticatedUser,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let created =
        recipes::create_recipe(pool.get_ref(), &config.app, current.user_id, &req).await?;
    let response = to_recipe_response(pool.get_ref(), &created, Some(current.user_id)).await?;
    Ok(HttpResponse::Created().json(response))
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Recipe detail", body = RecipeResponse),
        (status = 404, description = "Recipe not found")
    ),
    tag = "recipes"
)]
pub async fn get_recipe(
    path: web::Path<i64>,
    viewer: Option<AuthenticatedUser>,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = path.into_inner();
    let found = recipe::Entity::find_by_id(recipe_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    let response = to_recipe_response(pool.get_ref(), &found, viewer.map(|u| u.user_id)).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe ID")),
    request_body = RecipeWriteRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Recipe not found")
    ),
    security(("bearer_auth" = [])),
    tag = "recipes"
)]
pub async fn update_recipe(
    path: web::Path<i64>,
    req: web::Json<RecipeWriteRequest>,
    current: AuthenticatedUser,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = path.into_inner();
    let found = recipe::Entity::find_by_id(recipe_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    if found.author_id != current.user_id {
        return Err(ApiError::Forbidden);
    }

    let updated = recipes::update_recipe(pool.get_ref(), &config.app, found, &req).await?;
    let response = to_recipe_response(pool.get_ref(), &updated, Some(current.user_id)).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Recipe not found")
    ),
    security(("bearer_auth" = [])),
    tag = "recipes"
)]
pub async fn delete_recipe(
    path: web::Path<i64>,
    current: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = path.into_inner();
    let found = recipe::Entity::find_by_id(recipe_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    if found.author_id != current.user_id {
        return Err(ApiError::Forbidden);
    }

    recipes::delete_recipe(pool.get_ref(), recipe_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/favorite",
    params(("id" = i64, Path, description = "Recipe ID")),
    responses(
        (status = 201, description = "Added to favorites", body = RecipeMinified),
        (status = 400, description = "Already in favorites"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipe not found")
    ),
    security(("bearer_auth" = [])),
    tag = "recipes"
)]
pub async fn add_favorite(
    path: web::Path<i64>,
    current: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = path.into_inner();
    let found = recipe::Entity::find_by_id(recipe_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    relations::add_favorite(pool.get_ref(), current.user_id, found.id).await?;
    Ok(HttpResponse::Created().json(to_minified(&found)))
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/favorite",
    params(("id" = i64, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Removed from favorites"),
        (status = 400, description = "Was not in favorites"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipe not found")
    ),
    security(("bearer_auth" = [])),
    tag = "recipes"
)]
pub async fn remove_favorite(
    path: web::Path<i64>,
    current: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = path.into_inner();
    let found = recipe::Entity::find_by_id(recipe_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    relations::remove_favorite(pool.get_ref(), current.user_id, found.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/shopping_cart",
    params(("id" = i64, Path, description = "Recipe ID")),
    responses(
        (status = 201, description = "Added to the shopping cart", body = RecipeMinified),
        (status = 400, description = "Already in the shopping cart"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipe not found")
    ),
    security(("bearer_auth" = [])),
    tag = "recipes"
)]
pub async fn add_to_cart(
    path: web::Path<i64>,
    current: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = path.into_inner();
    let found = recipe::Entity::find_by_id(recipe_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    relations::add_to_cart(pool.get_ref(), current.user_id, found.id).await?;
    Ok(HttpResponse::Created().json(to_minified(&found)))
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/shopping_cart",
    params(("id" = i64, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Removed from the shopping cart"),
        (status = 400, description = "Was not in the shopping cart"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipe not found")
    ),
    security(("bearer_auth" = [])),
    tag = "recipes"
)]
pub async fn remove_from_cart(
    path: web::Path<i64>,
    current: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = path.into_inner();
    let found = recipe::Entity::find_by_id(recipe_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    relations::remove_from_cart(pool.get_ref(), current.user_id, found.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart",
    responses(
        (status = 200, description = "Plain-text shopping list attachment"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "recipes"
)]
pub async fn download_shopping_cart(
    current: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let items = shopping_list::build_shopping_list(pool.get_ref(), current.user_id).await?;
    let content = shopping_list::format_shopping_list(&items);

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            "attachment; filename=\"shopping_cart.txt\"",
        ))
        .body(content))
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}/get-link",
    params(("id" = i64, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Short link for the recipe", body = ShortLinkResponse),
        (status = 404, description = "Recipe not found")
    ),
    tag = "recipes"
)]
pub async fn get_link(
    path: web::Path<i64>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = path.into_inner();
    let found = recipe::Entity::find_by_id(recipe_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    let code = short_link::get_or_create(pool.get_ref(), &config.app, found.id).await?;
    Ok(HttpResponse::Ok().json(ShortLinkResponse {
        short_link: format!("{}/s/{}", config.app.base_url, code),
    }))
}
