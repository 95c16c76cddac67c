//! Cart state: the active cart id and mutations against it.

use tower_sessions::Session;
use tracing::{debug, instrument, warn};

use ecom_core::{Cart, CartId, VariantId};

use super::StoreError;
use crate::api::ApiClient;
use crate::models::session_keys;

/// Session-backed cart state for one visitor.
///
/// Every mutation is followed by a fresh `GET /carts/{id}`; totals are always
/// the backend's.
pub struct CartStore<'a> {
    api: &'a ApiClient,
    session: &'a Session,
}

impl<'a> CartStore<'a> {
    /// `api` should be the visitor's authorized client so carts get
    /// associated with a logged-in user.
    #[must_use]
    pub const fn new(api: &'a ApiClient, session: &'a Session) -> Self {
        Self { api, session }
    }

    /// The persisted cart id, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read.
    pub async fn cart_id(&self) -> Result<Option<CartId>, StoreError> {
        Ok(self.session.get(session_keys::CART_ID).await?)
    }

    /// Fetch the persisted cart.
    ///
    /// An id the backend no longer knows is forgotten and `None` returned.
    ///
    /// # Errors
    ///
    /// Returns an error only if the session cannot be read or written.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<Option<Cart>, StoreError> {
        let Some(id) = self.cart_id().await? else {
            return Ok(None);
        };

        match self.api.cart(&id).await {
            Ok(cart) => Ok(Some(checked(cart))),
            Err(e) => {
                warn!(cart_id = %id, error = %e, "Stored cart unavailable, forgetting it");
                self.clear().await?;
                Ok(None)
            }
        }
    }

    /// Create a fresh cart and make it the active one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call or the session write fails.
    #[instrument(skip(self))]
    pub async fn create(&self) -> Result<Cart, StoreError> {
        let cart = self.api.create_cart().await?;
        self.session.insert(session_keys::CART_ID, &cart.id).await?;
        debug!(cart_id = %cart.id, "Created cart");
        Ok(cart)
    }

    /// Add `qty` units of a variant, creating a cart first when none exists.
    ///
    /// A stale cart id (404) is replaced by a new cart and the add retried once.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the line.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub async fn add_item(&self, variant_id: &VariantId, qty: u32) -> Result<Cart, StoreError> {
        let cart_id = match self.cart_id().await? {
            Some(id) => id,
            None => self.create().await?.id,
        };

        let cart_id = match self.api.add_cart_item(&cart_id, variant_id, qty).await {
            Ok(()) => cart_id,
            Err(e) if e.is_not_found() => {
                warn!(cart_id = %cart_id, "Cart vanished, starting a new one");
                let fresh = self.create().await?.id;
                self.api.add_cart_item(&fresh, variant_id, qty).await?;
                fresh
            }
            Err(e) => return Err(e.into()),
        };

        Ok(checked(self.api.cart(&cart_id).await?))
    }

    /// Set the quantity of a line; zero removes it.
    ///
    /// Returns `None` when there is no active cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub async fn update_item(
        &self,
        variant_id: &VariantId,
        qty: u32,
    ) -> Result<Option<Cart>, StoreError> {
        if qty == 0 {
            return self.remove_item(variant_id).await;
        }

        let Some(cart_id) = self.cart_id().await? else {
            return Ok(None);
        };

        self.api.update_cart_item(&cart_id, variant_id, qty).await?;
        Ok(Some(checked(self.api.cart(&cart_id).await?)))
    }

    /// Remove a line. Returns `None` when there is no active cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub async fn remove_item(&self, variant_id: &VariantId) -> Result<Option<Cart>, StoreError> {
        let Some(cart_id) = self.cart_id().await? else {
            return Ok(None);
        };

        self.api.remove_cart_item(&cart_id, variant_id).await?;
        Ok(Some(checked(self.api.cart(&cart_id).await?)))
    }

    /// Forget the active cart locally. The backend cart is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.session.remove::<CartId>(session_keys::CART_ID).await?;
        Ok(())
    }

    /// Number of units in the active cart, 0 without one.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or written.
    pub async fn item_count(&self) -> Result<u32, StoreError> {
        Ok(self.restore().await?.map_or(0, |cart| cart.item_count))
    }
}

/// Log carts whose totals do not add up. They are still shown as sent.
fn checked(cart: Cart) -> Cart {
    if !cart.totals_are_consistent() {
        warn!(
            cart_id = %cart.id,
            subtotal = %cart.subtotal,
            discount = %cart.discount,
            total = %cart.total,
            "Backend cart totals are inconsistent"
        );
    }
    cart
}
