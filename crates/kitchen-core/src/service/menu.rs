//! Menu creation and listing.
//!
//! ## Create Flow
//! ```text
//! request ──► name ──► menu group exists? ──► lines present? ──► quantities >= 0?
//!                          MenuGroupNotFound     EmptyMenuProducts  NegativeQuantity
//!         ──► MenuPricingValidator ──► Menu::new (seq 1..n) ──► save (menu + lines)
//!              ProductNotFound / PriceBelowZero / PriceExceedsProductSum
//! ```

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::ports::{MenuGroupRepository, MenuRepository};
use crate::types::{Menu, MenuProduct};
use crate::validation::validate_name;
use crate::validator::MenuPricingValidator;

#[derive(Debug, Clone, Deserialize)]
pub struct MenuProductRequest {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMenuRequest {
    pub name: String,
    pub price_cents: i64,
    pub menu_group_id: String,
    pub menu_products: Vec<MenuProductRequest>,
}

#[derive(Clone)]
pub struct MenuService {
    menus: Arc<dyn MenuRepository>,
    menu_groups: Arc<dyn MenuGroupRepository>,
    pricing: MenuPricingValidator,
}

impl MenuService {
    pub fn new(
        menus: Arc<dyn MenuRepository>,
        menu_groups: Arc<dyn MenuGroupRepository>,
        pricing: MenuPricingValidator,
    ) -> Self {
        MenuService {
            menus,
            menu_groups,
            pricing,
        }
    }

    /// Validates and persists a menu. The price is checked once, here.
    pub async fn create(&self, request: CreateMenuRequest) -> CoreResult<Menu> {
        debug!(
            name = %request.name,
            menu_group_id = %request.menu_group_id,
            lines = request.menu_products.len(),
            "Creating menu"
        );

        validate_name("name", &request.name)?;

        if !self.menu_groups.exists_by_id(&request.menu_group_id).await? {
            warn!(menu_group_id = %request.menu_group_id, "Menu references unknown menu group");
            return Err(CoreError::MenuGroupNotFound(request.menu_group_id));
        }

        if request.menu_products.is_empty() {
            return Err(CoreError::EmptyMenuProducts);
        }

        let menu_products = request
            .menu_products
            .into_iter()
            .map(|line| MenuProduct::new(line.product_id, line.quantity))
            .collect::<CoreResult<Vec<_>>>()?;

        let price = Money::from_cents(request.price_cents);
        self.pricing.validate(price, &menu_products).await?;

        let menu = Menu::new(&request.name, price, request.menu_group_id, menu_products)?;
        let menu = self.menus.save(&menu).await?;

        info!(menu_id = %menu.id, price = %menu.price(), "Menu created");
        Ok(menu)
    }

    /// Returns stored menus; prices are not recomputed.
    pub async fn list(&self) -> CoreResult<Vec<Menu>> {
        self.menus.find_all().await
    }
}
