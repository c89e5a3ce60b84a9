//! Menu price vs. product sum.
//!
//! ```text
//! MenuProduct(p1, ×1) ──► Product p1: 16000 ──► 16000
//! MenuProduct(p2, ×2) ──► Product p2:  1000 ──►  2000
//!                                             ─────────
//!                                   product sum  18000
//!
//! 0 <= menu price <= 18000   else PriceBelowZero / PriceExceedsProductSum
//! ```
//!
//! Evaluated once, against the product prices current at creation time.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::ports::ProductRepository;
use crate::types::MenuProduct;

#[derive(Clone)]
pub struct MenuPricingValidator {
    products: Arc<dyn ProductRepository>,
}

impl MenuPricingValidator {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        MenuPricingValidator { products }
    }

    /// Checks `price` against the products referenced by `menu_products`.
    ///
    /// ## Returns
    /// * `Ok(Money)` - The product sum the price was checked against
    /// * `Err(ProductNotFound)` - A product id does not resolve
    /// * `Err(PriceBelowZero)` - Price is negative
    /// * `Err(PriceExceedsProductSum)` - Price is above the sum
    pub async fn validate(&self, price: Money, menu_products: &[MenuProduct]) -> CoreResult<Money> {
        debug!(price = %price, lines = menu_products.len(), "Validating menu price");

        let product_sum = self.product_sum(menu_products).await?;

        if price.is_negative() {
            warn!(price = %price, "Menu price below zero");
            return Err(CoreError::PriceBelowZero { price });
        }

        if price > product_sum {
            warn!(price = %price, product_sum = %product_sum, "Menu price exceeds product sum");
            return Err(CoreError::PriceExceedsProductSum { price, product_sum });
        }

        Ok(product_sum)
    }

    async fn product_sum(&self, menu_products: &[MenuProduct]) -> CoreResult<Money> {
        let mut sum = Money::zero();

        for menu_product in menu_products {
            let product = self
                .products
                .find_by_id(&menu_product.product_id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(menu_product.product_id.clone()))?;

            sum += product.price().multiply_quantity(menu_product.quantity);
        }

        Ok(sum)
    }
}
