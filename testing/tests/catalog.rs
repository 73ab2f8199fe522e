//! Categories and products.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use storefront_core::domain::catalog::{
    CategoryPatch, MAX_STOCK, NewProduct, NewSubcategory, ProductPatch, ProductStatus,
};
use storefront_core::{CategoryId, Money, ProductId, ServiceError};
use storefront_testing::TestHarness;

fn new_product(model: &str, category: Option<CategoryId>) -> NewProduct {
    NewProduct {
        product_name: "Desk Lamp".to_string(),
        model_number: model.to_string(),
        description: Some("LED".to_string()),
        category_id: category,
        quantity: 7,
        price: Money::from_cents(2499),
        status: None,
    }
}

#[tokio::test]
async fn test_category_lifecycle() {
    let harness = TestHarness::new();
    let catalog = harness.catalog();
    let lighting = harness.seed_category("Lighting").await;

    let with_sub = catalog
        .add_subcategory(
            lighting.id,
            NewSubcategory {
                sub_category_name: "Desk".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(with_sub.subcategories.len(), 1);

    let renamed = catalog
        .update_category(
            lighting.id,
            CategoryPatch {
                category_name: Some("Lights".to_string()),
                ..CategoryPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.category_name, "Lights");

    let deleted = catalog.delete_category(lighting.id).await.unwrap();
    assert_eq!(deleted.subcategories.len(), 1);
    assert!(catalog.list_categories().await.unwrap().is_empty());

    let not_found = ServiceError::NotFound("Category not found".to_string());
    assert_eq!(catalog.delete_category(lighting.id).await.unwrap_err(), not_found);
    assert_eq!(
        catalog
            .add_subcategory(
                lighting.id,
                NewSubcategory {
                    sub_category_name: "Floor".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap_err(),
        not_found
    );
}

#[tokio::test]
async fn test_product_listing_carries_category_name() {
    let harness = TestHarness::new();
    let catalog = harness.catalog();
    let lighting = harness.seed_category("Lighting").await;

    let product = catalog
        .create_product(new_product("DL-1", Some(lighting.id)))
        .await
        .unwrap();
    assert_eq!(product.status, ProductStatus::Active);

    let listed = catalog.list_products().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].category_name.as_deref(), Some("Lighting"));

    let fetched = catalog.get_product(product.id).await.unwrap();
    assert_eq!(fetched.product, product);
}

#[tokio::test]
async fn test_product_validation() {
    let harness = TestHarness::new();
    let catalog = harness.catalog();
    catalog.create_product(new_product("DL-1", None)).await.unwrap();

    assert_eq!(
        catalog
            .create_product(new_product("DL-1", None))
            .await
            .unwrap_err(),
        ServiceError::Conflict("Model number already exists".to_string())
    );
    assert_eq!(
        catalog
            .create_product(new_product("DL-2", Some(CategoryId::new())))
            .await
            .unwrap_err(),
        ServiceError::NotFound("Category not found".to_string())
    );

    let mut negative = new_product("DL-3", None);
    negative.price = Money::from_cents(-1);
    assert!(matches!(
        catalog.create_product(negative).await,
        Err(ServiceError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_stock_above_column_range_is_rejected() {
    let harness = TestHarness::new();
    let catalog = harness.catalog();

    let mut huge = new_product("DL-9", None);
    huge.quantity = u32::MAX;
    assert_eq!(
        catalog.create_product(huge).await.unwrap_err(),
        ServiceError::InvalidInput(format!("Quantity cannot exceed {MAX_STOCK}"))
    );

    let mut at_limit = new_product("DL-10", None);
    at_limit.quantity = MAX_STOCK;
    let product = catalog.create_product(at_limit).await.unwrap();

    let patch = ProductPatch {
        quantity: Some(MAX_STOCK + 1),
        ..ProductPatch::default()
    };
    assert!(matches!(
        catalog.update_product(product.id, patch).await,
        Err(ServiceError::InvalidInput(_))
    ));
    assert_eq!(harness.stock_of(product.id).await, MAX_STOCK);
}

#[tokio::test]
async fn test_product_update_and_delete() {
    let harness = TestHarness::new();
    let catalog = harness.catalog();
    let product = catalog.create_product(new_product("DL-1", None)).await.unwrap();

    let updated = catalog
        .update_product(
            product.id,
            ProductPatch {
                quantity: Some(0),
                status: Some(ProductStatus::OutOfStock),
                ..ProductPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.quantity, 0);
    assert_eq!(updated.status, ProductStatus::OutOfStock);
    assert_eq!(updated.product_name, "Desk Lamp");

    catalog.delete_product(product.id).await.unwrap();
    let not_found = ServiceError::NotFound("Product not found".to_string());
    assert_eq!(catalog.get_product(product.id).await.unwrap_err(), not_found);
    assert_eq!(
        catalog
            .update_product(ProductId::new(), ProductPatch::default())
            .await
            .unwrap_err(),
        not_found
    );
}
