//! Session-backed shopping cart.
//!
//! [`CartStore`] moves the [`Cart`] value in and out of the session;
//! [`CartManager`] applies cart operations and joins entries against the
//! catalog to price them. Every mutation is written back to the session
//! before returning.

use thiserror::Error;
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::{Price, PriceError, ProductId};

use crate::db::RepositoryError;
use crate::models::{Cart, Product, session_keys};
use crate::services::catalog::CatalogService;

/// Rejected cart form input. The cart is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartInputError {
    #[error("Invalid product.")]
    InvalidProduct,
    #[error("Unknown action.")]
    UnknownAction,
    #[error("Enter a valid quantity.")]
    InvalidQuantity,
}

/// Errors from cart operations that touch the session or the catalog.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
    #[error("catalog error: {0}")]
    Catalog(#[from] RepositoryError),
    #[error("cart total: {0}")]
    Total(#[from] PriceError),
}

/// Change requested through the cart form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartAction {
    Increment,
    Decrement,
    /// Absolute quantity; 0 removes the entry.
    Set(u32),
    Remove,
}

/// A validated cart form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartUpdate {
    pub product_id: ProductId,
    pub action: CartAction,
}

impl CartUpdate {
    /// Validate raw `pid`, `action` and `qty` form fields.
    ///
    /// For `set`, an empty or non-positive quantity means "remove".
    ///
    /// # Errors
    ///
    /// Returns `CartInputError` for a missing or malformed product id, an
    /// unknown action, or a quantity that is not an integer.
    pub fn parse(
        pid: Option<&str>,
        action: Option<&str>,
        qty: Option<&str>,
    ) -> Result<Self, CartInputError> {
        let product_id = pid
            .filter(|p| !p.trim().is_empty())
            .ok_or(CartInputError::InvalidProduct)?
            .parse::<ProductId>()
            .map_err(|_| CartInputError::InvalidProduct)?;

        let action = match action.map(str::trim).unwrap_or_default() {
            "inc" => CartAction::Increment,
            "dec" => CartAction::Decrement,
            "remove" => CartAction::Remove,
            "set" => CartAction::Set(parse_quantity(qty.unwrap_or_default())?),
            _ => return Err(CartInputError::UnknownAction),
        };

        Ok(Self { product_id, action })
    }
}

fn parse_quantity(raw: &str) -> Result<u32, CartInputError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    let qty = raw
        .parse::<i64>()
        .map_err(|_| CartInputError::InvalidQuantity)?;
    if qty <= 0 {
        return Ok(0);
    }
    u32::try_from(qty).map_err(|_| CartInputError::InvalidQuantity)
}

// =============================================================================
// Session storage
// =============================================================================

/// Loads and saves the cart under the session's `cart` key.
#[derive(Clone, Copy)]
pub struct CartStore<'a> {
    session: &'a Session,
}

impl<'a> CartStore<'a> {
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// The stored cart, or an empty one.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be loaded.
    pub async fn load(&self) -> Result<Cart, tower_sessions::session::Error> {
        Ok(self
            .session
            .get::<Cart>(session_keys::CART)
            .await?
            .unwrap_or_default())
    }

    /// Replace the stored cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn save(&self, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
        self.session.insert(session_keys::CART, cart).await
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// A cart entry resolved against the catalog.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
    pub subtotal: Price,
}

/// Priced view of a cart. Entries whose product no longer exists are left out.
#[derive(Debug, Clone, Default)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    pub total: Price,
}

impl CartSnapshot {
    /// Price every entry of `cart` at current catalog prices.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Catalog` if a product lookup fails and
    /// `CartError::Total` if a subtotal or the total does not fit.
    pub async fn resolve(cart: &Cart, catalog: &CatalogService<'_>) -> Result<Self, CartError> {
        let mut lines = Vec::with_capacity(cart.entries().len());
        for entry in cart.entries() {
            let Some(product) = catalog.get_product(entry.product_id).await? else {
                tracing::debug!(product_id = %entry.product_id, "Skipping stale cart entry");
                continue;
            };
            let subtotal = product.price.times(entry.quantity)?;
            lines.push(CartLine {
                product,
                quantity: entry.quantity,
                subtotal,
            });
        }

        let total = Price::total(lines.iter().map(|l| l.subtotal))?;
        Ok(Self { lines, total })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Manager
// =============================================================================

/// Cart operations for one request's session.
pub struct CartManager<'a> {
    store: CartStore<'a>,
    catalog: CatalogService<'a>,
}

impl<'a> CartManager<'a> {
    #[must_use]
    pub const fn new(session: &'a Session, catalog: CatalogService<'a>) -> Self {
        Self {
            store: CartStore::new(session),
            catalog,
        }
    }

    /// Add one unit of a product. The product is not checked for existence.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session cannot be read or written.
    #[instrument(skip(self))]
    pub async fn add(&self, product_id: ProductId) -> Result<Cart, CartError> {
        self.mutate(|cart| cart.add(product_id)).await
    }

    /// Drop a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session cannot be read or written.
    #[instrument(skip(self))]
    pub async fn remove(&self, product_id: ProductId) -> Result<Cart, CartError> {
        self.mutate(|cart| cart.remove(product_id)).await
    }

    /// Apply a validated cart form submission.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session cannot be read or written.
    #[instrument(skip(self))]
    pub async fn update(&self, update: CartUpdate) -> Result<Cart, CartError> {
        let CartUpdate { product_id, action } = update;
        self.mutate(|cart| match action {
            CartAction::Increment => cart.add(product_id),
            CartAction::Decrement => cart.decrement(product_id),
            CartAction::Set(quantity) => cart.set(product_id, quantity),
            CartAction::Remove => cart.remove(product_id),
        })
        .await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session cannot be written.
    pub async fn clear(&self) -> Result<(), CartError> {
        self.store.save(&Cart::new()).await?;
        Ok(())
    }

    /// The raw stored cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session cannot be read.
    pub async fn cart(&self) -> Result<Cart, CartError> {
        Ok(self.store.load().await?)
    }

    /// Priced lines for every entry whose product still exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the session or the catalog cannot be read.
    pub async fn snapshot(&self) -> Result<CartSnapshot, CartError> {
        let cart = self.store.load().await?;
        CartSnapshot::resolve(&cart, &self.catalog).await
    }

    /// Grand total of [`CartManager::snapshot`].
    ///
    /// # Errors
    ///
    /// Returns an error if the session or the catalog cannot be read.
    pub async fn total(&self) -> Result<Price, CartError> {
        Ok(self.snapshot().await?.total)
    }

    /// Units stored in the cart, stale entries included.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session cannot be read.
    pub async fn count(&self) -> Result<u32, CartError> {
        Ok(self.store.load().await?.item_count())
    }

    async fn mutate(&self, f: impl FnOnce(&mut Cart)) -> Result<Cart, CartError> {
        let mut cart = self.store.load().await?;
        f(&mut cart);
        self.store.save(&cart).await?;
        Ok(cart)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::{ProductRepository, test_pool};
    use crate::models::NewProduct;

    #[test]
    fn test_parse_actions() {
        let update = CartUpdate::parse(Some("3"), Some("inc"), None).unwrap();
        assert_eq!(update.product_id, ProductId::new(3));
        assert_eq!(update.action, CartAction::Increment);

        let update = CartUpdate::parse(Some("3"), Some("dec"), Some("ignored")).unwrap();
        assert_eq!(update.action, CartAction::Decrement);

        let update = CartUpdate::parse(Some("3"), Some("remove"), None).unwrap();
        assert_eq!(update.action, CartAction::Remove);
    }

    #[test]
    fn test_parse_set_quantities() {
        let set = |qty| CartUpdate::parse(Some("1"), Some("set"), qty).map(|u| u.action);

        assert_eq!(set(Some("4")), Ok(CartAction::Set(4)));
        assert_eq!(set(Some(" 7 ")), Ok(CartAction::Set(7)));
        assert_eq!(set(Some("0")), Ok(CartAction::Set(0)));
        assert_eq!(set(Some("-3")), Ok(CartAction::Set(0)));
        assert_eq!(set(Some("")), Ok(CartAction::Set(0)));
        assert_eq!(set(None), Ok(CartAction::Set(0)));
        assert_eq!(set(Some("two")), Err(CartInputError::InvalidQuantity));
        assert_eq!(set(Some("1.5")), Err(CartInputError::InvalidQuantity));
        assert_eq!(
            set(Some("99999999999")),
            Err(CartInputError::InvalidQuantity)
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(
            CartUpdate::parse(None, Some("inc"), None),
            Err(CartInputError::InvalidProduct)
        );
        assert_eq!(
            CartUpdate::parse(Some(""), Some("inc"), None),
            Err(CartInputError::InvalidProduct)
        );
        assert_eq!(
            CartUpdate::parse(Some("abc"), Some("inc"), None),
            Err(CartInputError::InvalidProduct)
        );
        assert_eq!(
            CartUpdate::parse(Some("1"), Some("explode"), None),
            Err(CartInputError::UnknownAction)
        );
        assert_eq!(
            CartUpdate::parse(Some("1"), None, None),
            Err(CartInputError::UnknownAction)
        );
    }

    #[test]
    fn test_input_error_messages() {
        assert_eq!(CartInputError::InvalidProduct.to_string(), "Invalid product.");
        assert_eq!(CartInputError::UnknownAction.to_string(), "Unknown action.");
        assert_eq!(
            CartInputError::InvalidQuantity.to_string(),
            "Enter a valid quantity."
        );
    }

    #[tokio::test]
    async fn test_snapshot_prices_lines_and_skips_stale() {
        let pool = test_pool().await;
        let repo = ProductRepository::new(&pool);
        let product = |name: &str, price: &str| NewProduct {
            name: name.to_owned(),
            price: Price::parse(price).unwrap(),
            description: None,
            image: None,
        };
        let p1 = repo.create(&product("Mug", "10")).await.unwrap();
        let p2 = repo.create(&product("Pen", "5")).await.unwrap();

        let mut cart = Cart::new();
        cart.add(p1.id);
        cart.add(p1.id);
        cart.add(p2.id);
        cart.add(ProductId::new(999));

        let catalog = CatalogService::new(&pool);
        let snapshot = CartSnapshot::resolve(&cart, &catalog).await.unwrap();

        assert_eq!(snapshot.lines.len(), 2);
        assert_eq!(snapshot.lines[0].product.id, p1.id);
        assert_eq!(snapshot.lines[0].subtotal, Price::parse("20").unwrap());
        assert_eq!(snapshot.total, Price::parse("25").unwrap());

        let empty = CartSnapshot::resolve(&Cart::new(), &catalog).await.unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.total, Price::ZERO);
    }

    #[tokio::test]
    async fn test_manager_round_trips_through_session() {
        use std::sync::Arc;

        use tower_sessions::MemoryStore;

        let pool = test_pool().await;
        let mug = ProductRepository::new(&pool)
            .create(&NewProduct {
                name: "Mug".to_owned(),
                price: Price::parse("10").unwrap(),
                description: None,
                image: None,
            })
            .await
            .unwrap();
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let manager = CartManager::new(&session, CatalogService::new(&pool));

        manager.add(mug.id).await.unwrap();
        manager.add(ProductId::new(404)).await.unwrap();
        manager
            .update(CartUpdate::parse(Some(&mug.id.to_string()), Some("set"), Some("3")).unwrap())
            .await
            .unwrap();

        assert_eq!(manager.count().await.unwrap(), 4);
        assert_eq!(manager.total().await.unwrap(), Price::parse("30").unwrap());
        assert_eq!(manager.cart().await.unwrap().quantity_of(mug.id), Some(3));

        manager.clear().await.unwrap();
        assert!(manager.cart().await.unwrap().is_empty());
        assert_eq!(manager.total().await.unwrap(), Price::ZERO);
    }

    #[tokio::test]
    async fn test_extreme_prices_and_quantities_resolve_without_panicking() {
        let pool = test_pool().await;
        let priciest = ProductRepository::new(&pool)
            .create(&NewProduct {
                name: "Yacht".to_owned(),
                price: Price::MAX,
                description: None,
                image: None,
            })
            .await
            .unwrap();
        let catalog = CatalogService::new(&pool);

        let mut cart = Cart::new();
        cart.set(priciest.id, u32::MAX);
        let snapshot = CartSnapshot::resolve(&cart, &catalog).await.unwrap();
        assert_eq!(snapshot.total, Price::MAX.times(u32::MAX).unwrap());

        // A stored price that bypassed form validation overflows as an error.
        sqlx::query("UPDATE products SET price = '50000000000000000000000000000' WHERE id = ?")
            .bind(priciest.id)
            .execute(&pool)
            .await
            .unwrap();
        cart.set(priciest.id, 2);
        assert!(matches!(
            CartSnapshot::resolve(&cart, &catalog).await,
            Err(CartError::Total(PriceError::Overflow))
        ));
    }
}
