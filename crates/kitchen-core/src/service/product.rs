//! Product catalog.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::CoreResult;
use crate::money::Money;
use crate::ports::ProductRepository;
use crate::types::Product;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price_cents: i64,
}

#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        ProductService { products }
    }

    pub async fn create(&self, request: CreateProductRequest) -> CoreResult<Product> {
        debug!(name = %request.name, price_cents = request.price_cents, "Creating product");

        let product = Product::new(&request.name, Money::from_cents(request.price_cents))?;
        let product = self.products.save(&product).await?;

        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    pub async fn list(&self) -> CoreResult<Vec<Product>> {
        self.products.find_all().await
    }
}
