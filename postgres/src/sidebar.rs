//! Sidebar menus. Roles, badge and submenu are stored as JSON.

use crate::{PostgresStore, db_err};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use storefront_core::domain::sidebar::{Badge, SidebarMenu, SidebarMenuPatch, Submenu};
use storefront_core::stores::{SidebarStore, StoreResult};
use storefront_core::{MenuId, Role};
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct MenuRow {
    id: Uuid,
    title: String,
    icon: String,
    tooltip: Option<String>,
    route: String,
    roles: Json<Vec<Role>>,
    badge: Json<Badge>,
    submenu: Json<Vec<Submenu>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MenuRow> for SidebarMenu {
    fn from(row: MenuRow) -> Self {
        Self {
            id: MenuId::from_uuid(row.id),
            title: row.title,
            icon: row.icon,
            tooltip: row.tooltip,
            route: row.route,
            roles: row.roles.0,
            badge: row.badge.0,
            submenu: row.submenu.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const MENU_COLUMNS: &str = "SELECT id, title, icon, tooltip, route, roles, badge, submenu,
            created_at, updated_at
     FROM sidebar_menus";

#[async_trait]
impl SidebarStore for PostgresStore {
    async fn insert_menu(&self, menu: SidebarMenu) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO sidebar_menus
                 (id, title, icon, tooltip, route, roles, badge, submenu, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(menu.id.as_uuid())
        .bind(&menu.title)
        .bind(&menu.icon)
        .bind(&menu.tooltip)
        .bind(&menu.route)
        .bind(Json(&menu.roles))
        .bind(Json(&menu.badge))
        .bind(Json(&menu.submenu))
        .bind(menu.created_at)
        .bind(menu.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err("insert menu"))?;
        Ok(())
    }

    async fn list_menus(&self) -> StoreResult<Vec<SidebarMenu>> {
        Ok(
            sqlx::query_as::<_, MenuRow>(&format!("{MENU_COLUMNS} ORDER BY created_at, id"))
                .fetch_all(&self.pool)
                .await
                .map_err(db_err("list menus"))?
                .into_iter()
                .map(SidebarMenu::from)
                .collect(),
        )
    }

    async fn update_menu(
        &self,
        id: MenuId,
        patch: &SidebarMenuPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<SidebarMenu>> {
        let mut tx = self.pool.begin().await.map_err(db_err("begin transaction"))?;

        let Some(row) =
            sqlx::query_as::<_, MenuRow>(&format!("{MENU_COLUMNS} WHERE id = $1 FOR UPDATE"))
                .bind(id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err("load menu"))?
        else {
            return Ok(None);
        };
        let mut menu = SidebarMenu::from(row);
        patch.apply(&mut menu, now);

        sqlx::query(
            "UPDATE sidebar_menus
             SET title = $2, icon = $3, tooltip = $4, route = $5, roles = $6, badge = $7,
                 submenu = $8, updated_at = $9
             WHERE id = $1",
        )
        .bind(menu.id.as_uuid())
        .bind(&menu.title)
        .bind(&menu.icon)
        .bind(&menu.tooltip)
        .bind(&menu.route)
        .bind(Json(&menu.roles))
        .bind(Json(&menu.badge))
        .bind(Json(&menu.submenu))
        .bind(menu.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err("update menu"))?;

        tx.commit().await.map_err(db_err("commit menu"))?;
        Ok(Some(menu))
    }

    async fn delete_menu(&self, id: MenuId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM sidebar_menus WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err("delete menu"))?;
        Ok(result.rows_affected() > 0)
    }
}
