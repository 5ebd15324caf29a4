//! Cart mutations.
//!
//! The storefront never adjusts the cart count itself; every mutation goes
//! to the backend and the badge re-fetches the count afterwards.

use souq_core::ProductId;

use crate::backend::{
    BackendError, Caller, CartLineRequest, CartRemoveRequest, MarketClient, MutationResponse,
};

/// A change to an existing cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartMutation {
    /// Set the line to a positive quantity.
    Update(CartLineRequest),
    /// Drop the line.
    Remove(CartRemoveRequest),
}

impl CartMutation {
    /// Map a requested quantity to the matching mutation.
    ///
    /// Zero or negative means removal; the update endpoint never sees it.
    #[must_use]
    pub fn for_quantity(product_id: ProductId, quantity: i64) -> Self {
        if quantity <= 0 {
            return Self::Remove(CartRemoveRequest { product_id });
        }
        Self::Update(CartLineRequest {
            product_id,
            quantity: u32::try_from(quantity).unwrap_or(u32::MAX),
        })
    }

    /// Product the mutation applies to.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        match self {
            Self::Update(line) => line.product_id,
            Self::Remove(line) => line.product_id,
        }
    }

    /// Send the mutation to the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails or is rejected.
    pub async fn send(
        self,
        market: &MarketClient,
        caller: &Caller,
    ) -> Result<MutationResponse, BackendError> {
        match self {
            Self::Update(line) => market.update_cart_line(caller, line).await,
            Self::Remove(line) => market.remove_from_cart(caller, line).await,
        }
    }
}

/// An add-to-cart request from a product card or the product page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddToCart(CartLineRequest);

impl AddToCart {
    /// Cards send no quantity (one item); the product page stepper never
    /// goes below one.
    #[must_use]
    pub fn new(product_id: ProductId, quantity: Option<i64>) -> Self {
        let quantity = quantity
            .map_or(1, |q| u32::try_from(q.max(1)).unwrap_or(u32::MAX));
        Self(CartLineRequest {
            product_id,
            quantity,
        })
    }

    /// Quantity that will be added.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.0.quantity
    }

    /// Send to the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails or is rejected.
    pub async fn send(
        self,
        market: &MarketClient,
        caller: &Caller,
    ) -> Result<MutationResponse, BackendError> {
        market.add_to_cart(caller, self.0).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MILK: ProductId = ProductId::new(7);

    #[test]
    fn test_zero_or_negative_quantity_removes() {
        for quantity in [0, -1, -40, i64::MIN] {
            assert_eq!(
                CartMutation::for_quantity(MILK, quantity),
                CartMutation::Remove(CartRemoveRequest { product_id: MILK })
            );
        }
    }

    #[test]
    fn test_positive_quantity_updates() {
        assert_eq!(
            CartMutation::for_quantity(MILK, 3),
            CartMutation::Update(CartLineRequest {
                product_id: MILK,
                quantity: 3
            })
        );
    }

    #[test]
    fn test_huge_quantity_saturates() {
        assert_eq!(
            CartMutation::for_quantity(MILK, i64::MAX),
            CartMutation::Update(CartLineRequest {
                product_id: MILK,
                quantity: u32::MAX
            })
        );
    }

    #[test]
    fn test_add_to_cart_defaults_to_one() {
        assert_eq!(AddToCart::new(MILK, None).quantity(), 1);
    }

    #[test]
    fn test_add_to_cart_never_below_one() {
        assert_eq!(AddToCart::new(MILK, Some(0)).quantity(), 1);
        assert_eq!(AddToCart::new(MILK, Some(-5)).quantity(), 1);
        assert_eq!(AddToCart::new(MILK, Some(4)).quantity(), 4);
    }
}
