use crate::auth::AuthenticatedUser;
use crate::db::DbPool;
use crate::entities::{recipe, subscription, user};
use crate::error::ApiError;
use crate::models::{
    AvatarResponse, RecipeMinified, SetAvatarRequest, SubscriptionProfile, UserProfile,
};
use crate::services::relations;
use actix_web::{web, HttpResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct UserListQuery {
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 20)]
    pub limit: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct SubscriptionsQuery {
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 20)]
    pub limit: Option<u64>,
    pub recipes_limit: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct SubscribeQuery {
    pub recipes_limit: Option<u64>,
}

pub(crate) async fn build_profile(
    db: &DbPool,
    subject: &user::Model,
    viewer: Option<i64>,
) -> Result<UserProfile, ApiError> {
    let is_subscribed = match viewer {
        Some(viewer_id) if viewer_id != subject.id => {
            relations::is_subscribed(db, viewer_id, subject.id).await?
        }
        _ => false,
    };

    Ok(UserProfile {
        id: subject.id,
        email: subject.email.clone(),
        username: subject.username.clone(),
        first_name: subject.first_name.clone(),
        last_name: subject.last_name.clone(),
        is_subscribed,
        avatar: subject.avatar.clone(),
    })
}

/// Author profile plus a truncated recipe listing, as shaped by the
/// subscribe and subscriptions endpoints.
async fn build_subscription_profile(
    db: &DbPool,
    author: &user::Model,
    viewer: Option<i64>,
    recipes_limit: Option<u64>,
) -> Result<SubscriptionProfile, ApiError> {
    let profile = build_profile(db, author, viewer).await?;

    let recipes_count = recipe::Entity::find()
        .filter(recipe::Column::AuthorId.eq(author.id))
        .count(db)
        .await?;

    let mut recipes_query = recipe::Entity::find()
        .filter(recipe::Column::AuthorId.eq(author.id))
        .order_by_desc(recipe::Column::Id);
    if let Some(limit) = recipes_limit {
        recipes_query = recipes_query.limit(limit);
    }
    let recipes = recipes_query
        .all(db)
        .await?
        .into_iter()
        .map(|item| RecipeMinified {
            id: item.id,
            name: item.name,
            image: item.image,
            cooking_time: item.cooking_time,
        })
        .collect();

    Ok(SubscriptionProfile {
        id: profile.id,
        email: profile.email,
        username: profile.username,
        first_name: profile.first_name,
        last_name: profile.last_name,
        is_subscribed: profile.is_subscribed,
        avatar: profile.avatar,
        recipes,
        recipes_count,
    })
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)")
    ),
    responses(
        (status = 200, description = "List of users", body = Vec<UserProfile>)
    ),
    tag = "users"
)]
pub async fn list_users(
    viewer: Option<AuthenticatedUser>,
    pool: web::Data<DbPool>,
    query: web::Query<UserListQuery>,
) -> Result<HttpResponse, ApiError> {
    let viewer_id = viewer.map(|u| u.user_id);
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);
    let offset = (page - 1) * limit;

    let users = user::Entity::find()
        .order_by_asc(user::Column::Id)
        .limit(limit)
        .offset(offset)
        .all(pool.get_ref())
        .await?;

    let mut profiles = Vec::new();
    for subject in &users {
        profiles.push(build_profile(pool.get_ref(), subject, viewer_id).await?);
    }

    Ok(HttpResponse::Ok().json(profiles))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user profile", body = UserProfile),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn me(
    current: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let subject = user::Entity::find_by_id(current.user_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    let profile = build_profile(pool.get_ref(), &subject, Some(current.user_id)).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = UserProfile),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_user(
    path: web::Path<i64>,
    viewer: Option<AuthenticatedUser>,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let subject = user::Entity::find_by_id(user_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    let profile = build_profile(pool.get_ref(), &subject, viewer.map(|u| u.user_id)).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[utoipa::path(
    put,
    path = "/api/users/me/avatar",
    request_body = SetAvatarRequest,
    responses(
        (status = 200, description = "Avatar updated", body = AvatarResponse),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn set_avatar(
    req: web::Json<SetAvatarRequest>,
    current: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    if req.avatar.trim().is_empty() {
        return Err(ApiError::validation("avatar", "This field is required"));
    }

    let subject = user::Entity::find_by_id(current.user_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    let mut active: user::ActiveModel = subject.into();
    active.avatar = Set(Some(req.avatar.clone()));
    let updated = active.update(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(AvatarResponse {
        avatar: updated.avatar,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/users/me/avatar",
    responses(
        (status = 204, description = "Avatar removed"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_avatar(
    current: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let subject = user::Entity::find_by_id(current.user_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    let mut active: user::ActiveModel = subject.into();
    active.avatar = Set(None);
    active.update(pool.get_ref()).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe",
    params(
        ("id" = i64, Path, description = "Author ID"),
        ("recipes_limit" = Option<u64>, Query, description = "Max recipes in the response")
    ),
    responses(
        (status = 201, description = "Subscribed", body = SubscriptionProfile),
        (status = 400, description = "Already subscribed or self-subscription"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Author not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn subscribe(
    path: web::Path<i64>,
    query: web::Query<SubscribeQuery>,
    current: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let author_id = path.into_inner();
    let author = user::Entity::find_by_id(author_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    relations::subscribe(pool.get_ref(), current.user_id, author.id).await?;

    let profile = build_subscription_profile(
        pool.get_ref(),
        &author,
        Some(current.user_id),
        query.recipes_limit,
    )
    .await?;
    Ok(HttpResponse::Created().json(profile))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe",
    params(("id" = i64, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 400, description = "Was not subscribed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Author not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn unsubscribe(
    path: web::Path<i64>,
    current: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let author_id = path.into_inner();
    let author = user::Entity::find_by_id(author_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    relations::unsubscribe(pool.get_ref(), current.user_id, author.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/users/subscriptions",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("recipes_limit" = Option<u64>, Query, description = "Max recipes per author")
    ),
    responses(
        (status = 200, description = "Subscribed authors", body = Vec<SubscriptionProfile>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn subscriptions(
    query: web::Query<SubscriptionsQuery>,
    current: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);
    let offset = (page - 1) * limit;

    let links = subscription::Entity::find()
        .filter(subscription::Column::SubscriberId.eq(current.user_id))
        .all(pool.get_ref())
        .await?;
    let author_ids: Vec<i64> = links.iter().map(|link| link.author_id).collect();

    let authors = user::Entity::find()
        .filter(user::Column::Id.is_in(author_ids))
        .order_by_asc(user::Column::Id)
        .limit(limit)
        .offset(offset)
        .all(pool.get_ref())
        .await?;

    let mut profiles = Vec::new();
    for author in &authors {
        profiles.push(
            build_subscription_profile(
                pool.get_ref(),
                author,
                Some(current.user_id),
                query.recipes_limit,
            )
            .await?,
        );
    }

    Ok(HttpResponse::Ok().json(profiles))
}
