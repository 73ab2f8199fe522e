//! Sidebar menu administration.

use crate::domain::sidebar::{NewSidebarMenu, SidebarMenu, SidebarMenuPatch, menus_for_role};
use crate::environment::Environment;
use crate::error::{ServiceError, ServiceResult};
use crate::types::{MenuId, Role};

/// Sidebar operations.
#[derive(Clone)]
pub struct SidebarService {
    env: Environment,
}

impl SidebarService {
    /// Create a new sidebar service.
    #[must_use]
    pub const fn new(env: Environment) -> Self {
        Self { env }
    }

    /// Create a menu entry.
    ///
    /// # Errors
    ///
    /// [`ServiceError::InvalidInput`] when title or route is blank.
    pub async fn create(&self, input: NewSidebarMenu) -> ServiceResult<SidebarMenu> {
        if input.title.trim().is_empty() || input.route.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "Menu title and route are required".to_string(),
            ));
        }
        let menu = input.into_menu(MenuId::new(), self.env.clock.now());
        self.env.sidebar.insert_menu(menu.clone()).await?;
        Ok(menu)
    }

    /// Menus visible to `role`, with submenus filtered to the role.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Unexpected`] on store failure.
    pub async fn list_for_role(&self, role: Role) -> ServiceResult<Vec<SidebarMenu>> {
        let menus = self.env.sidebar.list_menus().await?;
        Ok(menus_for_role(&menus, role))
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] ("Menu not found").
    pub async fn update(&self, id: MenuId, patch: SidebarMenuPatch) -> ServiceResult<SidebarMenu> {
        self.env
            .sidebar
            .update_menu(id, &patch, self.env.clock.now())
            .await?
            .ok_or_else(|| ServiceError::not_found("Menu"))
    }

    /// Delete a menu entry.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] ("Menu not found").
    pub async fn delete(&self, id: MenuId) -> ServiceResult<()> {
        if self.env.sidebar.delete_menu(id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found("Menu"))
        }
    }
}
