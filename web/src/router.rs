//! Route table.

use crate::handlers::{
    cart, categories, health_check, notifications, orders, products, ratings, readiness_check,
    sidebar, users,
};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the application router.
///
/// Layers, outermost first: correlation ID, HTTP tracing, permissive CORS.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/users", user_routes())
        .nest("/categories", category_routes())
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
        .nest("/ratings", rating_routes())
        .nest("/cart", cart_routes())
        .nest("/notifications", notification_routes())
        .nest("/sidebar", sidebar_routes());

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/create-user", post(users::create_user))
        .route("/login", post(users::login))
        .route("/view-users", get(users::list_users))
        .route("/view-customers", get(users::list_customers))
        .route("/view-user/:id", get(users::get_user))
        .route("/update-user/:id", put(users::update_user))
        .route("/delete-user/:id", delete(users::delete_user))
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list_categories))
        .route("/create-category", post(categories::create_category))
        .route("/:id/create-subcategory", post(categories::create_subcategory))
        .route(
            "/:id",
            put(categories::update_category).delete(categories::delete_category),
        )
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list_products))
        .route("/create-product", post(products::create_product))
        .route(
            "/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list_orders))
        .route("/place-order", post(orders::place_order))
        .route("/user/:user_id", get(orders::list_user_orders))
        .route("/:id/status", put(orders::update_status))
}

fn rating_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(ratings::add_rating))
        .route("/product/:product_id", get(ratings::list_product_ratings))
}

fn cart_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:user_id",
            get(cart::get_cart)
                .post(cart::add_item)
                .delete(cart::clear_cart),
        )
        .route(
            "/:user_id/:product_id",
            put(cart::update_quantity).delete(cart::remove_item),
        )
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:id",
            get(notifications::list_notifications).delete(notifications::delete_notification),
        )
        .route("/:id/mark-read", patch(notifications::mark_read))
}

fn sidebar_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(sidebar::list_menus).post(sidebar::create_menu))
        .route(
            "/:id",
            patch(sidebar::update_menu).delete(sidebar::delete_menu),
        )
}
