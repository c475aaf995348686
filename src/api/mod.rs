pub mod auth;
pub mod ingredients;
pub mod recipes;
pub mod short_links;
pub mod users;

use crate::models::{
    AuthResponse, AvatarResponse, IngredientAmount, IngredientInRecipe, IngredientQuery,
    IngredientResponse, LoginRequest, RecipeMinified, RecipeQuery, RecipeResponse,
    RecipeWriteRequest, SetAvatarRequest, ShortLinkResponse, SignupRequest, SubscriptionProfile,
    UserProfile,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth endpoints
        auth::signup,
        auth::login,
        // User endpoints
        users::list_users,
        users::me,
        users::get_user,
        users::set_avatar,
        users::delete_avatar,
        users::subscribe,
        users::unsubscribe,
        users::subscriptions,
        // Ingredient endpoints
        ingredients::list_ingredients,
        ingredients::get_ingredient,
        // Recipe endpoints
        recipes::list_recipes,
        recipes::create_recipe,
        recipes::get_recipe,
        recipes::update_recipe,
        recipes::delete_recipe,
        recipes::add_favorite,
        recipes::remove_favorite,
        recipes::add_to_cart,
        recipes::remove_from_cart,
        recipes::download_shopping_cart,
        recipes::get_link,
        // Short link redirect
        short_links::redirect_to_recipe,
    ),
    components(schemas(
        // Auth schemas
        SignupRequest,
        LoginRequest,
        AuthResponse,
        // User schemas
        UserProfile,
        SetAvatarRequest,
        AvatarResponse,
        SubscriptionProfile,
        // Ingredient schemas
        IngredientResponse,
        IngredientQuery,
        // Recipe schemas
        IngredientAmount,
        RecipeWriteRequest,
        IngredientInRecipe,
        RecipeResponse,
        RecipeMinified,
        RecipeQuery,
        ShortLinkResponse,
        // Query schemas
        users::UserListQuery,
        users::SubscriptionsQuery,
        users::SubscribeQuery,
    )),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User profiles and subscriptions"),
        (name = "ingredients", description = "Ingredient catalog"),
        (name = "recipes", description = "Recipes, favorites, shopping cart"),
        (name = "short-links", description = "Short link redirect"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

use utoipa::Modify;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
