//! End-to-end test harness for Shopfront.
//!
//! Every [`TestApp`] runs the full router, middleware included, on an
//! ephemeral port with its own `SQLite` file and upload directory in a
//! temporary directory. Requests go through a `reqwest` client that keeps
//! cookies (so the session carries over) and does not follow redirects (so
//! tests can assert on them).
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use reqwest::{Client, Response, StatusCode, header};
use secrecy::SecretString;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tokio::task::JoinHandle;

use shopfront_core::{Price, ProductId};
use shopfront_storefront::config::ShopConfig;
use shopfront_storefront::db::{self, ProductRepository};
use shopfront_storefront::models::{NewProduct, Product};
use shopfront_storefront::services::auth::AuthService;
use shopfront_storefront::state::AppState;
use shopfront_storefront::{app, middleware};

/// Admin account created by [`TestApp::login_admin`].
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "k3Pq9-vLx2-Wm7z";

/// A running shop plus a client pointed at it.
pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    pub pool: SqlitePool,
    pub upload_dir: PathBuf,
    _dir: TempDir,
    _server: JoinHandle<()>,
}

impl TestApp {
    /// Start a shop without debug routes.
    pub async fn spawn() -> Self {
        Self::spawn_with(false).await
    }

    /// Start a shop, optionally with `/debug-products` mounted.
    pub async fn spawn_with(debug_routes: bool) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let upload_dir = dir.path().join("uploads");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr: SocketAddr = listener.local_addr().expect("Listener has no address");
        let base_url = format!("http://{addr}");

        let database_url = format!("sqlite://{}?mode=rwc", dir.path().join("shop.db").display());
        let config = ShopConfig {
            database_url: SecretString::from(database_url),
            host: addr.ip(),
            port: addr.port(),
            base_url: base_url.clone(),
            static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../storefront/static"),
            upload_dir: upload_dir.clone(),
            admin_password: None,
            debug_routes,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let pool = db::create_pool(&config.database_url)
            .await
            .expect("Failed to open test database");
        db::migrate(&pool).await.expect("Failed to migrate test database");

        let store = middleware::create_session_store(&pool)
            .await
            .expect("Failed to create session store");
        let session_layer = middleware::create_session_layer(store, &config);
        let router = app(AppState::new(config, pool.clone()), session_layer);

        let server = tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Test server failed");
        });

        Self {
            base_url,
            client: Self::new_client(),
            pool,
            upload_dir,
            _dir: dir,
            _server: server,
        }
    }

    /// A fresh client with its own cookie jar, i.e. a separate visitor.
    #[must_use]
    pub fn new_client() -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(fields)
            .send()
            .await
            .expect("POST request failed")
    }

    pub async fn post_multipart(&self, path: &str, form: reqwest::multipart::Form) -> Response {
        self.client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("multipart POST request failed")
    }

    /// GET a page and return its body, asserting a 200.
    pub async fn page(&self, path: &str) -> String {
        let resp = self.get(path).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET {path}");
        resp.text().await.expect("Failed to read body")
    }

    /// Insert a product directly.
    pub async fn create_product(&self, name: &str, price: &str) -> Product {
        ProductRepository::new(&self.pool)
            .create(&NewProduct {
                name: name.to_owned(),
                price: Price::parse(price).expect("Invalid test price"),
                description: None,
                image: None,
            })
            .await
            .expect("Failed to insert product")
    }

    /// Create the admin account and log this client in as admin.
    pub async fn login_admin(&self) {
        AuthService::new(&self.pool)
            .create_admin(ADMIN_USERNAME, ADMIN_PASSWORD)
            .await
            .expect("Failed to create admin");

        let resp = self
            .post_form(
                "/admin-login",
                &[("username", ADMIN_USERNAME), ("password", ADMIN_PASSWORD)],
            )
            .await;
        assert_eq!(location(&resp), Some("/admin"));
    }

    /// Register a customer and log this client in.
    pub async fn login_customer(&self, username: &str, password: &str) {
        let resp = self
            .post_form("/register", &[("username", username), ("password", password)])
            .await;
        assert_eq!(location(&resp), Some("/login"));

        let resp = self
            .post_form("/login", &[("username", username), ("password", password)])
            .await;
        assert_eq!(location(&resp), Some("/"));
    }

    /// Add `quantity` units of a product to this client's cart.
    pub async fn add_to_cart(&self, id: ProductId, quantity: u32) {
        for _ in 0..quantity {
            let resp = self.get(&format!("/add-to-cart/{id}")).await;
            assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        }
    }

    /// Number of rows in `table`.
    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await
            .expect("Count query failed")
    }
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(resp: &Response) -> Option<&str> {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}
