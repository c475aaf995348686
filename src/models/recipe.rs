use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::UserProfile;

/// One (ingredient, amount) pair in a recipe submission.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IngredientAmount {
    pub id: i64,
    pub amount: u32,
}

/// Body for both recipe create and update. The ingredient list is required
/// and replaces the previous set wholesale on update.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecipeWriteRequest {
    pub name: String,
    pub text: String,
    pub image: String,
    pub cooking_time: u32,
    pub ingredients: Vec<IngredientAmount>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IngredientInRecipe {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecipeResponse {
    pub id: i64,
    pub author: UserProfile,
    pub ingredients: Vec<IngredientInRecipe>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecipeMinified {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecipeQuery {
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 20)]
    pub limit: Option<u64>,
    pub author: Option<i64>,
    pub is_favorited: Option<u8>,
    pub is_in_shopping_cart: Option<u8>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    pub short_link: String,
}
