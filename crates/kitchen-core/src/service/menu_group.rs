//! Menu groups.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::error::CoreResult;
use crate::ports::MenuGroupRepository;
use crate::types::MenuGroup;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMenuGroupRequest {
    pub name: String,
}

#[derive(Clone)]
pub struct MenuGroupService {
    menu_groups: Arc<dyn MenuGroupRepository>,
}

impl MenuGroupService {
    pub fn new(menu_groups: Arc<dyn MenuGroupRepository>) -> Self {
        MenuGroupService { menu_groups }
    }

    pub async fn create(&self, request: CreateMenuGroupRequest) -> CoreResult<MenuGroup> {
        let menu_group = MenuGroup::new(&request.name)?;
        let menu_group = self.menu_groups.save(&menu_group).await?;

        info!(menu_group_id = %menu_group.id, name = %menu_group.name, "Menu group created");
        Ok(menu_group)
    }

    pub async fn list(&self) -> CoreResult<Vec<MenuGroup>> {
        self.menu_groups.find_all().await
    }
}
