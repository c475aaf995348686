use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, Set};

use crate::db::DbPool;
use crate::entities::{favorite, shopping_cart, subscription};
use crate::error::{is_unique_violation, ApiError};

// Each relation is a two-state machine per (user, target) pair: add moves
// absent -> present and errors on present; remove moves present -> absent and
// errors on absent. The unique key decides races, so a losing concurrent
// insert surfaces as the same conflict as an ordinary duplicate.

pub async fn add_favorite(db: &DbPool, user_id: i64, recipe_id: i64) -> Result<(), ApiError> {
    let existing = favorite::Entity::find()
        .filter(
            Condition::all()
                .add(favorite::Column::UserId.eq(user_id))
                .add(favorite::Column::RecipeId.eq(recipe_id)),
        )
        .one(db)
        .await?;

    if existing.is_some() {
        return Err(ApiError::conflict("Recipe is already in favorites"));
    }

    let new_favorite = favorite::ActiveModel {
        user_id: Set(user_id),
        recipe_id: Set(recipe_id),
        ..Default::default()
    };

    match favorite::Entity::insert(new_favorite).exec(db).await {
        Ok(_) => Ok(()),
        Err(err) if is_unique_violation(&err) => {
            Err(ApiError::conflict("Recipe is already in favorites"))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn remove_favorite(db: &DbPool, user_id: i64, recipe_id: i64) -> Result<(), ApiError> {
    let result = favorite::Entity::delete_many()
        .filter(
            Condition::all()
                .add(favorite::Column::UserId.eq(user_id))
                .add(favorite::Column::RecipeId.eq(recipe_id)),
        )
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(ApiError::conflict("Recipe was not in favorites"));
    }
    Ok(())
}

pub async fn add_to_cart(db: &DbPool, user_id: i64, recipe_id: i64) -> Result<(), ApiError> {
    let existing = shopping_cart::Entity::find()
        .filter(
            Condition::all()
                .add(shopping_cart::Column::UserId.eq(user_id))
                .add(shopping_cart::Column::RecipeId.eq(recipe_id)),
        )
        .one(db)
        .await?;

    if existing.is_some() {
        return Err(ApiError::conflict("Recipe is already in the shopping cart"));
    }

    let new_entry = shopping_cart::ActiveModel {
        user_id: Set(user_id),
        recipe_id: Set(recipe_id),
        ..Default::default()
    };

    match shopping_cart::Entity::insert(new_entry).exec(db).await {
        Ok(_) => Ok(()),
        Err(err) if is_unique_violation(&err) => {
            Err(ApiError::conflict("Recipe is already in the shopping cart"))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn remove_from_cart(db: &DbPool, user_id: i64, recipe_id: i64) -> Result<(), ApiError> {
    let result = shopping_cart::Entity::delete_many()
        .filter(
            Condition::all()
                .add(shopping_cart::Column::UserId.eq(user_id))
                .add(shopping_cart::Column::RecipeId.eq(recipe_id)),
        )
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(ApiError::conflict("Recipe was not in the shopping cart"));
    }
    Ok(())
}

/// Self-subscription is rejected before any write, regardless of prior state.
pub async fn subscribe(db: &DbPool, subscriber_id: i64, author_id: i64) -> Result<(), ApiError> {
    if subscriber_id == author_id {
        return Err(ApiError::conflict("You cannot subscribe to yourself"));
    }

    let existing = subscription::Entity::find()
        .filter(
            Condition::all()
                .add(subscription::Column::SubscriberId.eq(subscriber_id))
                .add(subscription::Column::AuthorId.eq(author_id)),
        )
        .one(db)
        .await?;

    if existing.is_some() {
        return Err(ApiError::conflict("Already subscribed to this author"));
    }

    let new_subscription = subscription::ActiveModel {
        subscriber_id: Set(subscriber_id),
        author_id: Set(author_id),
        ..Default::default()
    };

    match subscription::Entity::insert(new_subscription).exec(db).await {
        Ok(_) => Ok(()),
        Err(err) if is_unique_violation(&err) => {
            Err(ApiError::conflict("Already subscribed to this author"))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn unsubscribe(db: &DbPool, subscriber_id: i64, author_id: i64) -> Result<(), ApiError> {
    let result = subscription::Entity::delete_many()
        .filter(
            Condition::all()
                .add(subscription::Column::SubscriberId.eq(subscriber_id))
                .add(subscription::Column::AuthorId.eq(author_id)),
        )
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(ApiError::conflict("Was not subscribed to this author"));
    }
    Ok(())
}

// Boolean partition predicates over the relation tables, used both for
// response shaping and the list filters.

pub async fn is_favorited(db: &DbPool, user_id: i64, recipe_id: i64) -> Result<bool, ApiError> {
    let existing = favorite::Entity::find()
        .filter(
            Condition::all()
                .add(favorite::Column::UserId.eq(user_id))
                .add(favorite::Column::RecipeId.eq(recipe_id)),
        )
        .one(db)
        .await?;
    Ok(existing.is_some())
}

pub async fn is_in_shopping_cart(
    db: &DbPool,
    user_id: i64,
    recipe_id: i64,
) -> Result<bool, ApiError> {
    let existing = shopping_cart::Entity::find()
        .filter(
            Condition::all()
                .add(shopping_cart::Column::UserId.eq(user_id))
                .add(shopping_cart::Column::RecipeId.eq(recipe_id)),
        )
        .one(db)
        .await?;
    Ok(existing.is_some())
}

pub async fn is_subscribed(db: &DbPool, subscriber_id: i64, author_id: i64) -> Result<bool, ApiError> {
    let existing = subscription::Entity::find()
        .filter(
            Condition::all()
                .add(subscription::Column::SubscriberId.eq(subscriber_id))
                .add(subscription::Column::AuthorId.eq(author_id)),
        )
        .one(db)
        .await?;
    Ok(existing.is_some())
}
