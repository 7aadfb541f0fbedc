//! Admin panel: access control, product management and order review.

use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};

use shopfront_core::Price;
use shopfront_integration_tests::{ADMIN_PASSWORD, ADMIN_USERNAME, TestApp, location};
use shopfront_storefront::db::ProductRepository;
use shopfront_storefront::services::auth::AuthService;

fn product_form(name: &str, price: &str) -> Form {
    Form::new()
        .text("name", name.to_owned())
        .text("price", price.to_owned())
}

fn image_part(filename: &str, bytes: &'static [u8]) -> Part {
    Part::bytes(bytes).file_name(filename.to_owned())
}

#[tokio::test]
async fn test_admin_pages_require_admin() {
    let app = TestApp::spawn().await;

    for path in ["/admin", "/admin/orders", "/admin/order/1", "/admin/product/edit/1"] {
        let resp = app.get(path).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&resp), Some("/admin-login"), "{path}");
    }

    let resp = app.post_multipart("/admin", product_form("Mug", "1")).await;
    assert_eq!(location(&resp), Some("/admin-login"));
    assert_eq!(app.count("products").await, 0);
}

#[tokio::test]
async fn test_customer_cannot_log_in_as_admin() {
    let app = TestApp::spawn().await;
    app.login_customer("ada", "correct horse").await;

    let resp = app
        .post_form(
            "/admin-login",
            &[("username", "ada"), ("password", "correct horse")],
        )
        .await;
    assert_eq!(location(&resp), Some("/admin-login"));
    assert!(app.page("/admin-login").await.contains("Invalid admin credentials"));
    assert_eq!(location(&app.get("/admin").await), Some("/admin-login"));
}

#[tokio::test]
async fn test_admin_login_and_logout() {
    let app = TestApp::spawn().await;
    app.create_product("Ceramic Mug", "10").await;
    app.login_admin().await;

    let body = app.page("/admin").await;
    assert!(body.contains("Admin logged in"));
    assert!(body.contains("Ceramic Mug"));

    let resp = app.get("/admin-logout").await;
    assert_eq!(location(&resp), Some("/"));
    assert!(app.page("/").await.contains("Admin logged out"));
    assert_eq!(location(&app.get("/admin").await), Some("/admin-login"));
}

#[tokio::test]
async fn test_admin_session_is_per_visitor() {
    let app = TestApp::spawn().await;
    app.login_admin().await;

    let other = TestApp::new_client();
    let resp = other.get(app.url("/admin")).send().await.unwrap();
    assert_eq!(location(&resp), Some("/admin-login"));
}

#[tokio::test]
async fn test_create_product_with_url_image() {
    let app = TestApp::spawn().await;
    app.login_admin().await;

    let form = product_form("Brass Pen", "24.00")
        .text("description", "Refillable.")
        .text("image", "https://images.example.test/pen.jpg");
    let resp = app.post_multipart("/admin", form).await;
    assert_eq!(location(&resp), Some("/admin"));
    assert!(app.page("/admin").await.contains("Product added successfully."));

    let products = ProductRepository::new(&app.pool).list().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].price, Price::parse("24").unwrap());
    assert_eq!(products[0].description.as_deref(), Some("Refillable."));
    assert_eq!(
        products[0].image.as_deref(),
        Some("https://images.example.test/pen.jpg")
    );
}

#[tokio::test]
async fn test_create_product_with_upload() {
    let app = TestApp::spawn().await;
    app.login_admin().await;

    let form = product_form("Ceramic Mug", "12.50")
        .text("image", "https://ignored.example.test/x.png")
        .part("image_file", image_part("Mug Photo.PNG", b"not-really-a-png"));
    let resp = app.post_multipart("/admin", form).await;
    assert_eq!(location(&resp), Some("/admin"));

    let product = ProductRepository::new(&app.pool)
        .list()
        .await
        .unwrap()
        .pop()
        .unwrap();
    let filename = product.image.clone().unwrap();
    assert!(filename.ends_with("_Mug_Photo.png"));
    assert!(app.upload_dir.join(&filename).exists());

    let url = product.image_url().unwrap();
    assert_eq!(url, format!("/uploads/{filename}"));
    let resp = app.get(&url).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"not-really-a-png");
}

#[tokio::test]
async fn test_disallowed_upload_creates_nothing() {
    let app = TestApp::spawn().await;
    app.login_admin().await;

    let form = product_form("Photo", "5").part("image_file", image_part("photo.webp", b"webp"));
    let resp = app.post_multipart("/admin", form).await;
    assert_eq!(location(&resp), Some("/admin"));

    assert!(
        app.page("/admin")
            .await
            .contains("Invalid image type. Allowed: png, jpg, jpeg, gif.")
    );
    assert_eq!(app.count("products").await, 0);
    assert!(!app.upload_dir.exists() || std::fs::read_dir(&app.upload_dir).unwrap().count() == 0);
}

#[tokio::test]
async fn test_create_product_validation() {
    let app = TestApp::spawn().await;
    app.login_admin().await;

    app.post_multipart("/admin", product_form("   ", "5")).await;
    assert!(app.page("/admin").await.contains("Product name is required."));

    app.post_multipart("/admin", product_form("Mug", "-1")).await;
    assert!(app.page("/admin").await.contains("Enter a valid non-negative price."));

    app.post_multipart("/admin", product_form("Mug", "cheap")).await;
    assert!(app.page("/admin").await.contains("Enter a valid non-negative price."));

    assert_eq!(app.count("products").await, 0);

    app.post_multipart("/admin", product_form("Freebie", "")).await;
    let products = ProductRepository::new(&app.pool).list().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].price, Price::ZERO);
}

#[tokio::test]
async fn test_edit_product() {
    let app = TestApp::spawn().await;
    let mug = app.create_product("Ceramic Mug", "10").await;
    app.login_admin().await;

    let body = app.page(&format!("/admin/product/edit/{}", mug.id)).await;
    assert!(body.contains(r#"value="Ceramic Mug""#));

    let resp = app
        .post_multipart(
            &format!("/admin/product/edit/{}", mug.id),
            product_form("Stoneware Mug", "11.25"),
        )
        .await;
    assert_eq!(location(&resp), Some("/admin"));
    assert!(app.page("/admin").await.contains("Product updated."));

    let updated = ProductRepository::new(&app.pool)
        .get_by_id(mug.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Stoneware Mug");
    assert_eq!(updated.price, Price::parse("11.25").unwrap());
}

#[tokio::test]
async fn test_edit_invalid_returns_to_form() {
    let app = TestApp::spawn().await;
    let mug = app.create_product("Ceramic Mug", "10").await;
    app.login_admin().await;

    let edit_path = format!("/admin/product/edit/{}", mug.id);
    let resp = app.post_multipart(&edit_path, product_form("", "10")).await;
    assert_eq!(location(&resp), Some(edit_path.as_str()));
    assert!(app.page(&edit_path).await.contains("Product name is required."));

    let unchanged = ProductRepository::new(&app.pool)
        .get_by_id(mug.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.name, "Ceramic Mug");
}

#[tokio::test]
async fn test_edit_and_delete_missing_product() {
    let app = TestApp::spawn().await;
    app.login_admin().await;

    assert_eq!(
        app.get("/admin/product/edit/999").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.post_multipart("/admin/product/edit/999", product_form("Mug", "1"))
            .await
            .status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.post_form("/admin/product/delete/999", &[]).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_delete_product_keeps_order_history() {
    let app = TestApp::spawn().await;
    let mug = app.create_product("Ceramic Mug", "10").await;
    app.add_to_cart(mug.id, 3).await;
    let resp = app
        .post_form(
            "/checkout",
            &[("name", "Ada"), ("address", "1 Row"), ("phone", "555")],
        )
        .await;
    let order_path = location(&resp)
        .unwrap()
        .replace("/order-success/", "/admin/order/");

    app.login_admin().await;
    let resp = app
        .post_form(&format!("/admin/product/delete/{}", mug.id), &[])
        .await;
    assert_eq!(location(&resp), Some("/admin"));
    assert!(app.page("/admin").await.contains("Product deleted."));
    assert_eq!(app.count("products").await, 0);

    let body = app.page(&order_path).await;
    assert!(body.contains("Ceramic Mug"));
    assert!(body.contains("$10.00"));
    assert!(body.contains("$30.00"));
}

#[tokio::test]
async fn test_order_list_newest_first() {
    let app = TestApp::spawn().await;
    let mug = app.create_product("Ceramic Mug", "10").await;

    for name in ["First Buyer", "Second Buyer"] {
        app.add_to_cart(mug.id, 1).await;
        let resp = app
            .post_form(
                "/checkout",
                &[("name", name), ("address", "1 Row"), ("phone", "555")],
            )
            .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }

    app.login_admin().await;
    let body = app.page("/admin/orders").await;
    let first = body.find("First Buyer").unwrap();
    let second = body.find("Second Buyer").unwrap();
    assert!(second < first);

    assert_eq!(
        app.get("/admin/order/999").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_bootstrap_admin_credentials_work() {
    let app = TestApp::spawn().await;
    AuthService::new(&app.pool)
        .ensure_bootstrap_admin(Some(&ADMIN_PASSWORD.to_owned().into()))
        .await
        .unwrap();

    let resp = app
        .post_form(
            "/admin-login",
            &[("username", ADMIN_USERNAME), ("password", ADMIN_PASSWORD)],
        )
        .await;
    assert_eq!(location(&resp), Some("/admin"));
}
