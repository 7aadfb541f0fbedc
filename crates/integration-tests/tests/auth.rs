//! Customer registration, login and logout.

use shopfront_integration_tests::{TestApp, location};

#[tokio::test]
async fn test_register_then_login() {
    let app = TestApp::spawn().await;

    let resp = app
        .post_form(
            "/register",
            &[("username", "ada"), ("password", "correct horse")],
        )
        .await;
    assert_eq!(location(&resp), Some("/login"));
    assert!(app.page("/login").await.contains("Registered. Please login."));

    let resp = app
        .post_form("/login", &[("username", "ada"), ("password", "correct horse")])
        .await;
    assert_eq!(location(&resp), Some("/"));

    let body = app.page("/").await;
    assert!(body.contains("Logged in"));
    assert!(body.contains(r#"<span class="who">ada</span>"#));
}

#[tokio::test]
async fn test_duplicate_username() {
    let app = TestApp::spawn().await;
    let form = [("username", "ada"), ("password", "correct horse")];

    app.post_form("/register", &form).await;
    let resp = app.post_form("/register", &form).await;
    assert_eq!(location(&resp), Some("/register"));
    assert!(app.page("/register").await.contains("Username already taken"));
    assert_eq!(app.count("users").await, 1);
}

#[tokio::test]
async fn test_register_rejects_short_password_and_bad_username() {
    let app = TestApp::spawn().await;

    let resp = app
        .post_form("/register", &[("username", "ada"), ("password", "short")])
        .await;
    assert_eq!(location(&resp), Some("/register"));
    assert!(app.page("/register").await.contains("at least 8 characters"));

    app.post_form(
        "/register",
        &[("username", "two words"), ("password", "correct horse")],
    )
    .await;
    assert_eq!(app.count("users").await, 0);
}

#[tokio::test]
async fn test_wrong_password() {
    let app = TestApp::spawn().await;
    app.post_form(
        "/register",
        &[("username", "ada"), ("password", "correct horse")],
    )
    .await;

    let resp = app
        .post_form("/login", &[("username", "ada"), ("password", "wrong horse")])
        .await;
    assert_eq!(location(&resp), Some("/login"));
    assert!(app.page("/login").await.contains("Invalid credentials"));

    let resp = app
        .post_form("/login", &[("username", "nobody"), ("password", "whatever1")])
        .await;
    assert_eq!(location(&resp), Some("/login"));
}

#[tokio::test]
async fn test_logout_keeps_cart() {
    let app = TestApp::spawn().await;
    let mug = app.create_product("Ceramic Mug", "10").await;
    app.login_customer("ada", "correct horse").await;
    app.add_to_cart(mug.id, 1).await;

    let resp = app.get("/logout").await;
    assert_eq!(location(&resp), Some("/"));

    let body = app.page("/cart").await;
    assert!(body.contains("Logged out"));
    assert!(!body.contains(r#"<span class="who">"#));
    assert!(body.contains("Ceramic Mug"));
}

#[tokio::test]
async fn test_password_is_hashed() {
    let app = TestApp::spawn().await;
    app.login_customer("ada", "correct horse").await;

    let hash: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE username = 'ada'")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(!hash.contains("correct horse"));
}
