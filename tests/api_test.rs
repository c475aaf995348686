// Integration tests for API endpoints
// These tests need a reachable MySQL database (see Config::from_env)
// Run with: cargo test --test api_test

use actix_web::{http::StatusCode, test, web, App};
use foodgram_backend::{
    api,
    config::Config,
    db::{self, DbPool},
    entities::ingredient,
    models::AuthResponse,
};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, Set};
use serde_json::{json, Value};

/// Generate unique test identifier using nanoseconds for better uniqueness
fn generate_test_id() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos()
        .to_string()
}

async fn create_pool() -> DbPool {
    let config = Config::from_env().expect("Failed to load configuration");
    db::create_mysql_pool(&config)
        .await
        .expect("Failed to create MySQL pool")
}

/// Helper function to create a test app
async fn create_test_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let config = Config::from_env().expect("Failed to load configuration");
    let pool = create_pool().await;

    App::new()
        .app_data(web::Data::new(config))
        .app_data(web::Data::new(pool))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/auth")
                        .route("/signup", web::post().to(api::auth::signup))
                        .route("/login", web::post().to(api::auth::login)),
                )
                .service(
                    web::scope("/users")
                        .route("", web::get().to(api::users::list_users))
                        .route("/me", web::get().to(api::users::me))
                        .route("/me/avatar", web::put().to(api::users::set_avatar))
                        .route("/me/avatar", web::delete().to(api::users::delete_avatar))
                        .route("/subscriptions", web::get().to(api::users::subscriptions))
                        .route("/{id}", web::get().to(api::users::get_user))
                        .route("/{id}/subscribe", web::post().to(api::users::subscribe))
                        .route("/{id}/subscribe", web::delete().to(api::users::unsubscribe)),
                )
                .service(
                    web::scope("/ingredients")
                        .route("", web::get().to(api::ingredients::list_ingredients))
                        .route("/{id}", web::get().to(api::ingredients::get_ingredient)),
                )
                .service(
                    web::scope("/recipes")
                        .route("", web::get().to(api::recipes::list_recipes))
                        .route("", web::post().to(api::recipes::create_recipe))
                        .route(
                            "/download_shopping_cart",
                            web::get().to(api::recipes::download_shopping_cart),
                        )
                        .route("/{id}", web::get().to(api::recipes::get_recipe))
                        .route("/{id}", web::patch().to(api::recipes::update_recipe))
                        .route("/{id}", web::delete().to(api::recipes::delete_recipe))
                        .route("/{id}/favorite", web::post().to(api::recipes::add_favorite))
                        .route(
                            "/{id}/favorite",
                            web::delete().to(api::recipes::remove_favorite),
                        )
                        .route(
                            "/{id}/shopping_cart",
                            web::post().to(api::recipes::add_to_cart),
                        )
                        .route(
                            "/{id}/shopping_cart",
                            web::delete().to(api::recipes::remove_from_cart),
                        )
                        .route("/{id}/get-link", web::get().to(api::recipes::get_link)),
                ),
        )
        .route(
            "/s/{code}",
            web::get().to(api::short_links::redirect_to_recipe),
        )
}

fn signup_payload(test_id: &str, tag: &str) -> Value {
    json!({
        "email": format!("{}{}@example.com", tag, test_id),
        "username": format!("{}{}", tag, test_id),
        "first_name": "Test",
        "last_name": "User",
        "password": "password123"
    })
}

fn recipe_payload(name: &str, ingredients: Value) -> Value {
    json!({
        "name": name,
        "text": "Mix and serve",
        "image": "data:image/png;base64,AAAA",
        "cooking_time": 10,
        "ingredients": ingredients
    })
}

/// Ingredients have no write API; tests seed them directly.
async fn seed_ingredient(pool: &DbPool, name: &str, unit: &str) -> i64 {
    let existing = ingredient::Entity::find()
        .filter(
            Condition::all()
                .add(ingredient::Column::Name.eq(name))
                .add(ingredient::Column::MeasurementUnit.eq(unit)),
        )
        .one(pool)
        .await
        .expect("Failed to query ingredient");
    if let Some(found) = existing {
        return found.id;
    }

    let new_ingredient = ingredient::ActiveModel {
        name: Set(name.to_string()),
        measurement_unit: Set(unit.to_string()),
        ..Default::default()
    };
    ingredient::Entity::insert(new_ingredient)
        .exec(pool)
        .await
        .expect("Failed to seed ingredient")
        .last_insert_id
}

#[actix_web::test]
async fn test_signup() {
    let app = test::init_service(create_test_app().await).await;

    let test_id = generate_test_id();
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(signup_payload(&test_id, "signup"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: AuthResponse = test::read_body_json(resp).await;
    assert!(!body.token.is_empty());
    assert_eq!(body.user.username, format!("signup{}", test_id));
}

#[actix_web::test]
async fn test_signup_duplicate_email() {
    let app = test::init_service(create_test_app().await).await;

    let test_id = generate_test_id();
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(signup_payload(&test_id, "dup"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Same email, different username.
    let mut payload = signup_payload(&test_id, "dup");
    payload["username"] = json!(format!("other{}", test_id));
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_login_wrong_password() {
    let app = test::init_service(create_test_app().await).await;

    let test_id = generate_test_id();
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(signup_payload(&test_id, "wrongpass"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let login_req = json!({
        "email": format!("wrongpass{}@example.com", test_id),
        "password": "not-the-password"
    });
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(&login_req)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_create_recipe_requires_auth() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::post()
        .uri("/api/recipes")
        .set_json(recipe_payload("Anonymous soup", json!([{"id": 1, "amount": 1}])))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_favorite_toggle_conflicts() {
    let pool = create_pool().await;
    let app = test::init_service(create_test_app().await).await;

    let test_id = generate_test_id();
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(signup_payload(&test_id, "fav"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let auth: AuthResponse = test::read_body_json(resp).await;
    let token = auth.token;

    let ing_id = seed_ingredient(&pool, &format!("Pepper {}", test_id), "g").await;
    let req = test::TestRequest::post()
        .uri("/api/recipes")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(recipe_payload(
            "Peppered eggs",
            json!([{"id": ing_id, "amount": 3}]),
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let recipe_id = body["id"].as_i64().expect("recipe id");

    // add -> 201
    let req = test::TestRequest::post()
        .uri(&format!("/api/recipes/{}/favorite", recipe_id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // add again -> 400 already exists
    let req = test::TestRequest::post()
        .uri(&format!("/api/recipes/{}/favorite", recipe_id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // remove -> 204
    let req = test::TestRequest::delete()
        .uri(&format!("/api/recipes/{}/favorite", recipe_id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // remove again -> 400 does not exist
    let req = test::TestRequest::delete()
        .uri(&format!("/api/recipes/{}/favorite", recipe_id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_shopping_cart_aggregation_download() {
    let pool = create_pool().await;
    let app = test::init_service(create_test_app().await).await;

    let test_id = generate_test_id();
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(signup_payload(&test_id, "cart"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let auth: AuthResponse = test::read_body_json(resp).await;
    let token = auth.token;

    let salt_name = format!("Salt {}", test_id);
    let ing_id = seed_ingredient(&pool, &salt_name, "g").await;

    let mut recipe_ids = Vec::new();
    for (name, amount) in [("Recipe A", 10), ("Recipe B", 5)] {
        let req = test::TestRequest::post()
            .uri("/api/recipes")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(recipe_payload(
                name,
                json!([{"id": ing_id, "amount": amount}]),
            ))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        recipe_ids.push(body["id"].as_i64().expect("recipe id"));
    }

    for recipe_id in recipe_ids {
        let req = test::TestRequest::post()
            .uri(&format!("/api/recipes/{}/shopping_cart", recipe_id))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/api/recipes/download_shopping_cart")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp
        .headers()
        .get("Content-Disposition")
        .expect("attachment header")
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("attachment"));

    let body = test::read_body(resp).await;
    let content = String::from_utf8(body.to_vec()).unwrap();
    assert!(
        content.contains(&format!("{} - 15 g", salt_name)),
        "unexpected shopping list: {content}"
    );
}

#[actix_web::test]
async fn test_self_subscription_rejected() {
    let app = test::init_service(create_test_app().await).await;

    let test_id = generate_test_id();
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(signup_payload(&test_id, "selfsub"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let auth: AuthResponse = test::read_body_json(resp).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/users/{}/subscribe", auth.user.id))
        .insert_header(("Authorization", format!("Bearer {}", auth.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_short_link_is_idempotent() {
    let pool = create_pool().await;
    let app = test::init_service(create_test_app().await).await;

    let test_id = generate_test_id();
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(signup_payload(&test_id, "shortlink"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let auth: AuthResponse = test::read_body_json(resp).await;

    let ing_id = seed_ingredient(&pool, &format!("Basil {}", test_id), "g").await;
    let req = test::TestRequest::post()
        .uri("/api/recipes")
        .insert_header(("Authorization", format!("Bearer {}", auth.token)))
        .set_json(recipe_payload("Pesto", json!([{"id": ing_id, "amount": 20}])))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let recipe_id = body["id"].as_i64().expect("recipe id");

    let mut links = Vec::new();
    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri(&format!("/api/recipes/{}/get-link", recipe_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        links.push(body["short-link"].as_str().expect("short-link").to_string());
    }
    assert_eq!(links[0], links[1]);

    // The code redirects to the recipe page.
    let code = links[0].rsplit('/').next().unwrap().to_string();
    let req = test::TestRequest::get()
        .uri(&format!("/s/{}", code))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get("Location").unwrap().to_str().unwrap(),
        format!("/recipes/{}", recipe_id)
    );
}

#[actix_web::test]
async fn test_update_replaces_ingredient_set() {
    let pool = create_pool().await;
    let app = test::init_service(create_test_app().await).await;

    let test_id = generate_test_id();
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(signup_payload(&test_id, "update"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let auth: AuthResponse = test::read_body_json(resp).await;

    let flour_id = seed_ingredient(&pool, &format!("Flour {}", test_id), "g").await;
    let sugar_id = seed_ingredient(&pool, &format!("Sugar {}", test_id), "g").await;

    let req = test::TestRequest::post()
        .uri("/api/recipes")
        .insert_header(("Authorization", format!("Bearer {}", auth.token)))
        .set_json(recipe_payload(
            "Cake",
            json!([
                {"id": flour_id, "amount": 200},
                {"id": sugar_id, "amount": 100}
            ]),
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let recipe_id = body["id"].as_i64().expect("recipe id");

    let update_req = json!({
        "name": "Plain cake",
        "text": "Less sweet",
        "image": "data:image/png;base64,AAAA",
        "cooking_time": 40,
        "ingredients": [{"id": flour_id, "amount": 250}]
    });
    let req = test::TestRequest::patch()
        .uri(&format!("/api/recipes/{}", recipe_id))
        .insert_header(("Authorization", format!("Bearer {}", auth.token)))
        .set_json(&update_req)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let ingredients = body["ingredients"].as_array().expect("ingredients");
    assert_eq!(ingredients.len(), 1);
    assert_eq!(ingredients[0]["id"].as_i64(), Some(flour_id));
    assert_eq!(ingredients[0]["amount"].as_u64(), Some(250));
}

#[actix_web::test]
async fn test_recipe_with_zero_amount_rejected() {
    let pool = create_pool().await;
    let app = test::init_service(create_test_app().await).await;

    let test_id = generate_test_id();
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(signup_payload(&test_id, "zeroamt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let auth: AuthResponse = test::read_body_json(resp).await;

    let ing_id = seed_ingredient(&pool, &format!("Cumin {}", test_id), "g").await;
    let payload = recipe_payload("Invalid", json!([{"id": ing_id, "amount": 0}]));
    let req = test::TestRequest::post()
        .uri("/api/recipes")
        .insert_header(("Authorization", format!("Bearer {}", auth.token)))
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
