//! Session cart behavior over HTTP.

use reqwest::{StatusCode, header};

use shopfront_integration_tests::{TestApp, location};

#[tokio::test]
async fn test_add_redirects_back_to_referer() {
    let app = TestApp::spawn().await;
    let mug = app.create_product("Ceramic Mug", "10").await;

    let resp = app
        .client
        .get(app.url(&format!("/add-to-cart/{}", mug.id)))
        .header(header::REFERER, app.url(&format!("/product/{}", mug.id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some(format!("/product/{}", mug.id).as_str()));

    let body = app.page(&format!("/product/{}", mug.id)).await;
    assert!(body.contains("Item added to cart"));
    assert!(body.contains("Cart (1)"));
}

#[tokio::test]
async fn test_foreign_referer_goes_home() {
    let app = TestApp::spawn().await;
    let mug = app.create_product("Ceramic Mug", "10").await;

    let resp = app
        .client
        .get(app.url(&format!("/add-to-cart/{}", mug.id)))
        .header(header::REFERER, "https://elsewhere.test/page")
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), Some("/"));
}

#[tokio::test]
async fn test_cart_page_totals() {
    let app = TestApp::spawn().await;
    let mug = app.create_product("Ceramic Mug", "10").await;
    let pen = app.create_product("Brass Pen", "5").await;

    app.add_to_cart(mug.id, 2).await;
    app.add_to_cart(pen.id, 1).await;

    let body = app.page("/cart").await;
    assert!(body.contains("Ceramic Mug"));
    assert!(body.contains("Brass Pen"));
    assert!(body.contains("$20.00"));
    assert!(body.contains("$25.00"));
    assert!(body.contains("Cart (3)"));
}

#[tokio::test]
async fn test_update_actions() {
    let app = TestApp::spawn().await;
    let mug = app.create_product("Ceramic Mug", "10").await;
    let pid = mug.id.to_string();
    app.add_to_cart(mug.id, 1).await;

    let resp = app
        .post_form("/update-cart", &[("pid", &pid), ("action", "inc")])
        .await;
    assert_eq!(location(&resp), Some("/cart"));
    assert!(app.page("/cart").await.contains("Cart (2)"));

    app.post_form("/update-cart", &[("pid", &pid), ("action", "set"), ("qty", "5")])
        .await;
    assert!(app.page("/cart").await.contains("Cart (5)"));

    app.post_form("/update-cart", &[("pid", &pid), ("action", "dec")])
        .await;
    assert!(app.page("/cart").await.contains("Cart (4)"));

    app.post_form("/update-cart", &[("pid", &pid), ("action", "remove")])
        .await;
    assert!(app.page("/cart").await.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_decrement_last_unit_removes_line() {
    let app = TestApp::spawn().await;
    let mug = app.create_product("Ceramic Mug", "10").await;
    app.add_to_cart(mug.id, 1).await;

    app.post_form(
        "/update-cart",
        &[("pid", &mug.id.to_string()), ("action", "dec")],
    )
    .await;

    let body = app.page("/cart").await;
    assert!(body.contains("Your cart is empty"));
    assert!(!body.contains("Cart ("));
}

#[tokio::test]
async fn test_set_zero_or_negative_removes_line() {
    let app = TestApp::spawn().await;
    let mug = app.create_product("Ceramic Mug", "10").await;
    app.add_to_cart(mug.id, 3).await;

    app.post_form(
        "/update-cart",
        &[("pid", &mug.id.to_string()), ("action", "set"), ("qty", "-2")],
    )
    .await;

    assert!(app.page("/cart").await.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_invalid_input_is_flashed_and_cart_unchanged() {
    let app = TestApp::spawn().await;
    let mug = app.create_product("Ceramic Mug", "10").await;
    let pid = mug.id.to_string();
    app.add_to_cart(mug.id, 2).await;

    let resp = app
        .post_form("/update-cart", &[("pid", &pid), ("action", "set"), ("qty", "lots")])
        .await;
    assert_eq!(location(&resp), Some("/cart"));
    let body = app.page("/cart").await;
    assert!(body.contains("Enter a valid quantity."));
    assert!(body.contains("Cart (2)"));

    app.post_form("/update-cart", &[("pid", "abc"), ("action", "inc")])
        .await;
    assert!(app.page("/cart").await.contains("Invalid product."));

    app.post_form("/update-cart", &[("pid", &pid), ("action", "explode")])
        .await;
    let body = app.page("/cart").await;
    assert!(body.contains("Unknown action."));
    assert!(body.contains("Cart (2)"));
}

#[tokio::test]
async fn test_remove_from_cart() {
    let app = TestApp::spawn().await;
    let mug = app.create_product("Ceramic Mug", "10").await;
    let pen = app.create_product("Brass Pen", "5").await;
    app.add_to_cart(mug.id, 1).await;
    app.add_to_cart(pen.id, 1).await;

    let resp = app.get(&format!("/remove-from-cart/{}", mug.id)).await;
    assert_eq!(location(&resp), Some("/cart"));

    let body = app.page("/cart").await;
    assert!(body.contains("Item removed from cart"));
    assert!(!body.contains("Ceramic Mug"));
    assert!(body.contains("Brass Pen"));
}

#[tokio::test]
async fn test_deleted_product_is_skipped() {
    let app = TestApp::spawn().await;
    let mug = app.create_product("Ceramic Mug", "10").await;
    let pen = app.create_product("Brass Pen", "5").await;
    app.add_to_cart(mug.id, 1).await;
    app.add_to_cart(pen.id, 1).await;

    sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(mug.id)
        .execute(&app.pool)
        .await
        .unwrap();

    let body = app.page("/cart").await;
    assert!(!body.contains("Ceramic Mug"));
    assert!(body.contains("Brass Pen"));
    assert!(body.contains("$5.00"));
}

#[tokio::test]
async fn test_carts_are_per_visitor() {
    let app = TestApp::spawn().await;
    let mug = app.create_product("Ceramic Mug", "10").await;
    app.add_to_cart(mug.id, 1).await;

    let other = TestApp::new_client();
    let body = other
        .get(app.url("/cart"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Your cart is empty"));
}
