use crate::db::DbPool;
use crate::entities::short_link;
use crate::error::ApiError;
use actix_web::{web, HttpResponse};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

#[utoipa::path(
    get,
    path = "/s/{code}",
    params(("code" = String, Path, description = "Short link code")),
    responses(
        (status = 302, description = "Redirect to the recipe page"),
        (status = 404, description = "Unknown code")
    ),
    tag = "short-links"
)]
pub async fn redirect_to_recipe(
    path: web::Path<String>,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let code = path.into_inner();
    let link = short_link::Entity::find()
        .filter(short_link::Column::Code.eq(&code))
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("short link"))?;

    Ok(HttpResponse::Found()
        .append_header(("Location", format!("/recipes/{}", link.recipe_id)))
        .finish())
}
