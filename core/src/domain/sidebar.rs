//! Role-based sidebar menus.

use crate::types::{MenuId, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a menu badge is rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeKind {
    /// Notification dot
    #[default]
    Notification,
    /// Numeric counter
    Count,
    /// Informational label
    Info,
}

/// Badge attached to a menu entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    /// Whether the badge is displayed
    #[serde(default)]
    pub show: bool,
    /// Rendering style
    #[serde(default, rename = "type")]
    pub kind: BadgeKind,
    /// Name of the counter feeding the badge (e.g. `unreadNotifications`)
    #[serde(default)]
    pub value_source: Option<String>,
}

/// Entry nested under a [`SidebarMenu`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submenu {
    /// Label
    pub title: String,
    /// Icon name
    pub icon: String,
    /// Hover text
    #[serde(default)]
    pub tooltip: Option<String>,
    /// Client route
    pub route: String,
    /// Roles allowed to see the entry
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// Top-level sidebar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarMenu {
    /// Menu id
    pub id: MenuId,
    /// Label
    pub title: String,
    /// Icon name
    pub icon: String,
    /// Hover text
    pub tooltip: Option<String>,
    /// Client route
    pub route: String,
    /// Roles allowed to see the entry
    pub roles: Vec<Role>,
    /// Badge settings
    pub badge: Badge,
    /// Nested entries
    pub submenu: Vec<Submenu>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl SidebarMenu {
    /// The menu as seen by `role`: `None` when the role may not see it,
    /// otherwise a copy whose submenus are filtered to the role.
    #[must_use]
    pub fn visible_to(&self, role: Role) -> Option<Self> {
        if !self.roles.contains(&role) {
            return None;
        }
        let mut menu = self.clone();
        menu.submenu.retain(|sub| sub.roles.contains(&role));
        Some(menu)
    }
}

/// Filter menus and their submenus down to what `role` may see.
#[must_use]
pub fn menus_for_role(menus: &[SidebarMenu], role: Role) -> Vec<SidebarMenu> {
    menus.iter().filter_map(|m| m.visible_to(role)).collect()
}

/// Input for creating a menu entry.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSidebarMenu {
    /// Label
    pub title: String,
    /// Icon name
    pub icon: String,
    /// Hover text
    #[serde(default)]
    pub tooltip: Option<String>,
    /// Client route
    pub route: String,
    /// Roles allowed to see the entry
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Badge settings
    #[serde(default)]
    pub badge: Badge,
    /// Nested entries
    #[serde(default)]
    pub submenu: Vec<Submenu>,
}

impl NewSidebarMenu {
    /// Build the menu record.
    #[must_use]
    pub fn into_menu(self, id: MenuId, now: DateTime<Utc>) -> SidebarMenu {
        SidebarMenu {
            id,
            title: self.title,
            icon: self.icon,
            tooltip: self.tooltip,
            route: self.route,
            roles: self.roles,
            badge: self.badge,
            submenu: self.submenu,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial menu update. `submenu`, when present, replaces the whole list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SidebarMenuPatch {
    /// New label
    pub title: Option<String>,
    /// New icon
    pub icon: Option<String>,
    /// New hover text
    pub tooltip: Option<String>,
    /// New route
    pub route: Option<String>,
    /// New role list
    pub roles: Option<Vec<Role>>,
    /// New badge
    pub badge: Option<Badge>,
    /// New submenus
    pub submenu: Option<Vec<Submenu>>,
}

impl SidebarMenuPatch {
    /// Apply the patch to a menu.
    pub fn apply(&self, menu: &mut SidebarMenu, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            menu.title.clone_from(title);
        }
        if let Some(icon) = &self.icon {
            menu.icon.clone_from(icon);
        }
        if let Some(tooltip) = &self.tooltip {
            menu.tooltip = Some(tooltip.clone());
        }
        if let Some(route) = &self.route {
            menu.route.clone_from(route);
        }
        if let Some(roles) = &self.roles {
            menu.roles.clone_from(roles);
        }
        if let Some(badge) = &self.badge {
            menu.badge = badge.clone();
        }
        if let Some(submenu) = &self.submenu {
            menu.submenu.clone_from(submenu);
        }
        menu.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submenu(title: &str, roles: &[Role]) -> Submenu {
        Submenu {
            title: title.to_string(),
            icon: "dot".to_string(),
            tooltip: None,
            route: format!("/{title}"),
            roles: roles.to_vec(),
        }
    }

    fn menu(title: &str, roles: &[Role], submenu: Vec<Submenu>) -> SidebarMenu {
        NewSidebarMenu {
            title: title.to_string(),
            icon: "menu".to_string(),
            tooltip: None,
            route: format!("/{title}"),
            roles: roles.to_vec(),
            badge: Badge::default(),
            submenu,
        }
        .into_menu(MenuId::new(), Utc::now())
    }

    #[test]
    fn test_menus_hidden_from_other_roles() {
        let menus = vec![
            menu("dashboard", &[Role::Admin, Role::Customer], vec![]),
            menu("reports", &[Role::Admin], vec![]),
        ];

        let visible = menus_for_role(&menus, Role::Customer);

        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "dashboard");
    }

    #[test]
    fn test_submenus_filtered_by_role() {
        let menus = vec![menu(
            "orders",
            &[Role::Admin, Role::Customer],
            vec![
                submenu("mine", &[Role::Customer]),
                submenu("all", &[Role::Admin]),
                submenu("help", &[Role::Admin, Role::Customer]),
            ],
        )];

        let visible = menus_for_role(&menus, Role::Customer);
        let titles: Vec<_> = visible[0].submenu.iter().map(|s| s.title.as_str()).collect();

        assert_eq!(titles, vec!["mine", "help"]);
    }

    #[test]
    fn test_badge_defaults_from_json() {
        let badge: Badge = serde_json::from_str(r#"{"show": true}"#).unwrap_or_default();
        assert!(badge.show);
        assert_eq!(badge.kind, BadgeKind::Notification);
        assert!(badge.value_source.is_none());
    }
}
