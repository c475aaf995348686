use crate::auth::{create_token, hash_password, verify_password, Claims};
use crate::config::Config;
use crate::db::DbPool;
use crate::entities::user;
use crate::error::ApiError;
use crate::models::{AuthResponse, LoginRequest, SignupRequest, UserProfile};
use actix_web::{web, HttpResponse};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, Set};
use serde_json::json;

fn validate_signup(req: &SignupRequest) -> Result<(), ApiError> {
    if req.email.trim().is_empty() {
        return Err(ApiError::validation("email", "Email must not be blank"));
    }
    if req.username.trim().is_empty() {
        return Err(ApiError::validation("username", "Username must not be blank"));
    }
    if req.first_name.trim().is_empty() {
        return Err(ApiError::validation(
            "first_name",
            "First name must not be blank",
        ));
    }
    if req.last_name.trim().is_empty() {
        return Err(ApiError::validation(
            "last_name",
            "Last name must not be blank",
        ));
    }
    if req.password.is_empty() {
        return Err(ApiError::validation("password", "Password must not be blank"));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Bad request"),
        (status = 409, description = "User already exists")
    ),
    tag = "auth"
)]
pub async fn signup(
    req: web::Json<SignupRequest>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    validate_signup(&req)?;

    let existing_user = user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Email.eq(&req.email))
                .add(user::Column::Username.eq(&req.username)),
        )
        .one(pool.get_ref())
        .await?;

    if existing_user.is_some() {
        return Ok(HttpResponse::Conflict().json(json!({
            "errors": "User with this email or username already exists"
        })));
    }

    let password_hash = hash_password(&req.password)?;

    let new_user = user::ActiveModel {
        email: Set(req.email.clone()),
        username: Set(req.username.clone()),
        first_name: Set(req.first_name.clone()),
        last_name: Set(req.last_name.clone()),
        password_hash: Set(password_hash),
        ..Default::default()
    };

    let created = user::Entity::insert(new_user)
        .exec_with_returning(pool.get_ref())
        .await?;

    let claims = Claims::new(created.id, config.jwt.expiration_hours);
    let token = create_token(&claims, &config.jwt.secret)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user: UserProfile {
            id: created.id,
            email: created.email,
            username: created.username,
            first_name: created.first_name,
            last_name: created.last_name,
            is_subscribed: false,
            avatar: created.avatar,
        },
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "User not found")
    ),
    tag = "auth"
)]
pub async fn login(
    req: web::Json<LoginRequest>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let found = user::Entity::find()
        .filter(user::Column::Email.eq(&req.email))
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    let is_valid = verify_password(&req.password, &found.password_hash)?;
    if !is_valid {
        return Err(ApiError::Unauthorized);
    }

    let claims = Claims::new(found.id, config.jwt.expiration_hours);
    let token = create_token(&claims, &config.jwt.secret)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: UserProfile {
            id: found.id,
            email: found.email,
            username: found.username,
            first_name: found.first_name,
            last_name: found.last_name,
            is_subscribed: false,
            avatar: found.avatar,
        },
    }))
}
