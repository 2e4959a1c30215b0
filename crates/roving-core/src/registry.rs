#![forbid(unsafe_code)]

//! Zone registry: static per-zone configuration, items and callbacks.
//!
//! Zones are registered on mount and removed on unmount. The resolvers only
//! read the registry; registration order of zones drives Tab traversal and
//! registration order of items drives navigation.

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;

use crate::command::{Command, TabDirection};
use crate::id::{ItemId, ZoneId};
use crate::keymap::{Cursor, KeyBinding};

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Interaction pattern a zone implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneRole {
    Listbox,
    Grid,
    Menu,
    Toolbar,
    Tree,
    Tablist,
}

impl ZoneRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Listbox => "listbox",
            Self::Grid => "grid",
            Self::Menu => "menu",
            Self::Toolbar => "toolbar",
            Self::Tree => "tree",
            Self::Tablist => "tablist",
        }
    }

    /// Role given to items registered without an explicit one.
    #[must_use]
    pub const fn default_item_role(self) -> ItemRole {
        match self {
            Self::Listbox => ItemRole::Option,
            Self::Grid => ItemRole::GridCell,
            Self::Menu => ItemRole::MenuItem,
            Self::Toolbar => ItemRole::Button,
            Self::Tree => ItemRole::TreeItem,
            Self::Tablist => ItemRole::Tab,
        }
    }

    /// Configuration conventional for the pattern.
    #[must_use]
    pub const fn default_config(self) -> ZoneConfig {
        let (orientation, wrap, escape) = match self {
            Self::Listbox => (Orientation::Vertical, false, EscapeBehavior::Deselect),
            Self::Grid => (Orientation::Both, false, EscapeBehavior::Deselect),
            Self::Menu => (Orientation::Vertical, true, EscapeBehavior::Close),
            Self::Toolbar => (Orientation::Horizontal, false, EscapeBehavior::None),
            Self::Tree => (Orientation::Vertical, false, EscapeBehavior::Deselect),
            Self::Tablist => (Orientation::Horizontal, true, EscapeBehavior::None),
        };
        let outside_click = match self {
            Self::Menu => OutsideClickBehavior::Close,
            _ => OutsideClickBehavior::None,
        };
        ZoneConfig {
            activate: ActivatePolicy::DEFAULT,
            dismiss: DismissPolicy {
                escape,
                outside_click,
            },
            navigation: NavigationOptions {
                orientation,
                wrap,
                columns: 1,
            },
        }
    }
}

/// Role of one item. Drives the item layer's key contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRole {
    Option,
    Row,
    GridCell,
    MenuItem,
    MenuItemCheckbox,
    MenuItemRadio,
    TreeItem,
    Tab,
    Button,
    Checkbox,
    Switch,
    Generic,
}

impl ItemRole {
    /// Roles whose expansion belongs to the click phase, not the press.
    #[must_use]
    pub const fn expands_on_click(self) -> bool {
        matches!(self, Self::TreeItem | Self::MenuItem)
    }

    /// Roles toggled by Space.
    #[must_use]
    pub const fn toggles_on_space(self) -> bool {
        matches!(
            self,
            Self::Checkbox | Self::Switch | Self::MenuItemCheckbox | Self::MenuItemRadio
        )
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// When clicks activate items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivatePolicy {
    /// Clicks may activate at all.
    pub on_click: bool,
    /// Only a click on the already-focused item activates.
    pub re_click_only: bool,
}

impl ActivatePolicy {
    pub const DEFAULT: Self = Self {
        on_click: true,
        re_click_only: true,
    };
}

impl Default for ActivatePolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What Escape does inside the zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeBehavior {
    /// Escape is not bound; the host sees it.
    None,
    /// Clear focus and selection.
    Deselect,
    /// Dismiss the zone.
    Close,
    /// Focus the parent item; deselect at the root.
    DrillUp,
}

/// What a press outside the zone does while it is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutsideClickBehavior {
    None,
    Deselect,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DismissPolicy {
    pub escape: EscapeBehavior,
    pub outside_click: OutsideClickBehavior,
}

/// Arrow-key axes a zone responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationOptions {
    pub orientation: Orientation,
    /// Moving past either end wraps around.
    pub wrap: bool,
    /// Column count for grids. Values below 1 are treated as 1.
    pub columns: usize,
}

/// Static per-zone configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneConfig {
    pub activate: ActivatePolicy,
    pub dismiss: DismissPolicy,
    pub navigation: NavigationOptions,
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

/// Builds commands from the current cursor.
pub type CommandFactory = Arc<dyn Fn(&Cursor<'_>) -> Vec<Command> + Send + Sync>;

/// Builds reorder commands from the cursor and a signed offset.
pub type ReorderFactory = Arc<dyn Fn(&Cursor<'_>, i32) -> Vec<Command> + Send + Sync>;

/// Decides whether an item takes part in navigation.
pub type ItemFilter = Arc<dyn Fn(&ItemEntry) -> bool + Send + Sync>;

/// Optional zone callbacks. Each one, when present, turns a key into
/// application commands.
#[derive(Clone, Default)]
pub struct ZoneCallbacks {
    pub action: Option<CommandFactory>,
    pub check: Option<CommandFactory>,
    pub delete: Option<CommandFactory>,
    pub copy: Option<CommandFactory>,
    pub cut: Option<CommandFactory>,
    pub paste: Option<CommandFactory>,
    pub reorder: Option<ReorderFactory>,
    pub item_filter: Option<ItemFilter>,
}

impl ZoneCallbacks {
    /// True when the item filter (if any) admits `item`.
    #[must_use]
    pub fn admits(&self, item: &ItemEntry) -> bool {
        self.item_filter.as_ref().is_none_or(|filter| filter(item))
    }
}

impl fmt::Debug for ZoneCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneCallbacks")
            .field("action", &self.action.is_some())
            .field("check", &self.check.is_some())
            .field("delete", &self.delete.is_some())
            .field("copy", &self.copy.is_some())
            .field("cut", &self.cut.is_some())
            .field("paste", &self.paste.is_some())
            .field("reorder", &self.reorder.is_some())
            .field("item_filter", &self.item_filter.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// One registered item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemEntry {
    pub id: ItemId,
    pub role: ItemRole,
    pub parent: Option<ItemId>,
    pub expandable: bool,
    pub editable: bool,
}

impl ItemEntry {
    #[must_use]
    pub fn new(id: impl Into<ItemId>, role: ItemRole) -> Self {
        Self {
            id: id.into(),
            role,
            parent: None,
            expandable: false,
            editable: false,
        }
    }

    #[must_use]
    pub fn child_of(mut self, parent: impl Into<ItemId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub const fn expandable(mut self) -> Self {
        self.expandable = true;
        self
    }

    #[must_use]
    pub const fn editable(mut self) -> Self {
        self.editable = true;
        self
    }
}

/// One registered zone.
#[derive(Clone)]
pub struct ZoneEntry {
    pub id: ZoneId,
    pub role: ZoneRole,
    pub config: ZoneConfig,
    pub callbacks: ZoneCallbacks,
    /// Items in navigation order.
    pub items: Vec<ItemEntry>,
    /// Zone-specific bindings consulted before the role keymap.
    pub keymap: Vec<KeyBinding>,
}

impl fmt::Debug for ZoneEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneEntry")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("config", &self.config)
            .field("callbacks", &self.callbacks)
            .field("items", &self.items.len())
            .field("keymap", &self.keymap.len())
            .finish()
    }
}

impl ZoneEntry {
    /// A zone with the role's default configuration and no items.
    #[must_use]
    pub fn new(id: impl Into<ZoneId>, role: ZoneRole) -> Self {
        Self {
            id: id.into(),
            role,
            config: role.default_config(),
            callbacks: ZoneCallbacks::default(),
            items: Vec::new(),
            keymap: Vec::new(),
        }
    }

    /// Add items with the role's default item role.
    #[must_use]
    pub fn with_items<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ItemId>,
    {
        let role = self.role.default_item_role();
        self.items
            .extend(ids.into_iter().map(|id| ItemEntry::new(id, role)));
        self
    }

    /// Add one fully described item.
    #[must_use]
    pub fn with_item(mut self, item: ItemEntry) -> Self {
        self.items.push(item);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: ZoneConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_escape(mut self, escape: EscapeBehavior) -> Self {
        self.config.dismiss.escape = escape;
        self
    }

    #[must_use]
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.config.navigation.columns = columns;
        self
    }

    #[must_use]
    pub fn on_action(mut self, f: impl Fn(&Cursor<'_>) -> Vec<Command> + Send + Sync + 'static) -> Self {
        self.callbacks.action = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_check(mut self, f: impl Fn(&Cursor<'_>) -> Vec<Command> + Send + Sync + 'static) -> Self {
        self.callbacks.check = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_delete(mut self, f: impl Fn(&Cursor<'_>) -> Vec<Command> + Send + Sync + 'static) -> Self {
        self.callbacks.delete = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_copy(mut self, f: impl Fn(&Cursor<'_>) -> Vec<Command> + Send + Sync + 'static) -> Self {
        self.callbacks.copy = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_cut(mut self, f: impl Fn(&Cursor<'_>) -> Vec<Command> + Send + Sync + 'static) -> Self {
        self.callbacks.cut = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_paste(mut self, f: impl Fn(&Cursor<'_>) -> Vec<Command> + Send + Sync + 'static) -> Self {
        self.callbacks.paste = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_reorder(
        mut self,
        f: impl Fn(&Cursor<'_>, i32) -> Vec<Command> + Send + Sync + 'static,
    ) -> Self {
        self.callbacks.reorder = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn with_item_filter(mut self, f: impl Fn(&ItemEntry) -> bool + Send + Sync + 'static) -> Self {
        self.callbacks.item_filter = Some(Arc::new(f));
        self
    }

    /// Add a zone-scoped binding.
    #[must_use]
    pub fn bind(mut self, binding: KeyBinding) -> Self {
        self.keymap.push(binding);
        self
    }

    /// Look up an item by id.
    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&ItemEntry> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Position of an item in registration order.
    #[must_use]
    pub fn index_of(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.index_of(id).is_some()
    }

    /// Direct children of `parent`, in order.
    pub fn children_of<'a>(&'a self, parent: &'a ItemId) -> impl Iterator<Item = &'a ItemEntry> {
        self.items
            .iter()
            .filter(move |item| item.parent.as_ref() == Some(parent))
    }

    /// True when `id` has at least one child.
    #[must_use]
    pub fn has_children(&self, id: &ItemId) -> bool {
        self.children_of(id).next().is_some()
    }

    /// Remove items by id, returning how many were removed.
    pub fn remove_items(&mut self, ids: &[ItemId]) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !ids.contains(&item.id));
        before - self.items.len()
    }

    /// Move an item by `delta` positions, clamped to the ends.
    /// Returns the new index.
    pub fn move_item(&mut self, id: &ItemId, delta: i32) -> Option<usize> {
        let from = self.index_of(id)?;
        let last = self.items.len().saturating_sub(1) as i64;
        let to = (from as i64 + i64::from(delta)).clamp(0, last) as usize;
        let entry = self.items.remove(from);
        self.items.insert(to, entry);
        Some(to)
    }

    /// Insert items after `after` (at the end when `after` is absent or
    /// unknown). Ids already present are skipped. Returns how many were
    /// inserted.
    pub fn insert_items(
        &mut self,
        after: Option<&ItemId>,
        items: impl IntoIterator<Item = ItemEntry>,
    ) -> usize {
        let mut at = after
            .and_then(|id| self.index_of(id))
            .map_or(self.items.len(), |idx| idx + 1);
        let mut inserted = 0;
        for item in items {
            if self.contains(&item.id) {
                continue;
            }
            self.items.insert(at, item);
            at += 1;
            inserted += 1;
        }
        inserted
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// All mounted zones, keyed by id, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ZoneRegistry {
    zones: AHashMap<ZoneId, ZoneEntry>,
    order: Vec<ZoneId>,
}

impl ZoneRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a zone. Re-registering an id replaces the entry and keeps its
    /// original position.
    pub fn register(&mut self, zone: ZoneEntry) {
        if !self.zones.contains_key(&zone.id) {
            self.order.push(zone.id.clone());
        }
        self.zones.insert(zone.id.clone(), zone);
    }

    /// Unmount a zone.
    pub fn unregister(&mut self, id: &ZoneId) -> Option<ZoneEntry> {
        self.order.retain(|zone| zone != id);
        self.zones.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &ZoneId) -> Option<&ZoneEntry> {
        self.zones.get(id)
    }

    pub fn get_mut(&mut self, id: &ZoneId) -> Option<&mut ZoneEntry> {
        self.zones.get_mut(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Zones in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ZoneEntry> {
        self.order.iter().filter_map(|id| self.zones.get(id))
    }

    /// Zone that owns `item`.
    #[must_use]
    pub fn zone_of_item(&self, item: &ItemId) -> Option<&ZoneEntry> {
        self.iter().find(|zone| zone.contains(item))
    }

    /// Neighbouring zone in registration order, wrapping at the ends.
    /// With no current zone, forward lands on the first and backward on the
    /// last.
    #[must_use]
    pub fn neighbour(&self, from: Option<&ZoneId>, direction: TabDirection) -> Option<&ZoneEntry> {
        let len = self.order.len();
        if len == 0 {
            return None;
        }
        let current = from.and_then(|id| self.order.iter().position(|zone| zone == id));
        let idx = match (current, direction) {
            (None, TabDirection::Forward) => 0,
            (None, TabDirection::Backward) => len - 1,
            (Some(pos), TabDirection::Forward) => (pos + 1) % len,
            (Some(pos), TabDirection::Backward) => (pos + len - 1) % len,
        };
        self.zones.get(&self.order[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruit() -> ZoneEntry {
        ZoneEntry::new("fruit", ZoneRole::Listbox).with_items(["apple", "banana", "cherry"])
    }

    #[test]
    fn items_take_role_default() {
        let zone = fruit();
        assert_eq!(zone.items.len(), 3);
        assert!(zone.items.iter().all(|item| item.role == ItemRole::Option));
        assert_eq!(zone.index_of(&"banana".into()), Some(1));
    }

    #[test]
    fn registry_keeps_registration_order() {
        let mut registry = ZoneRegistry::new();
        registry.register(ZoneEntry::new("b", ZoneRole::Toolbar));
        registry.register(ZoneEntry::new("a", ZoneRole::Menu));
        registry.register(ZoneEntry::new("b", ZoneRole::Tree));

        let ids: Vec<&str> = registry.iter().map(|zone| zone.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(registry.get(&"b".into()).map(|z| z.role), Some(ZoneRole::Tree));
    }

    #[test]
    fn neighbour_wraps() {
        let mut registry = ZoneRegistry::new();
        for id in ["a", "b", "c"] {
            registry.register(ZoneEntry::new(id, ZoneRole::Listbox));
        }
        let c = ZoneId::from("c");
        let a = ZoneId::from("a");
        assert_eq!(
            registry.neighbour(Some(&c), TabDirection::Forward).map(|z| z.id.as_str()),
            Some("a")
        );
        assert_eq!(
            registry.neighbour(Some(&a), TabDirection::Backward).map(|z| z.id.as_str()),
            Some("c")
        );
        assert_eq!(
            registry.neighbour(None, TabDirection::Backward).map(|z| z.id.as_str()),
            Some("c")
        );
    }

    #[test]
    fn move_item_clamps() {
        let mut zone = fruit();
        assert_eq!(zone.move_item(&"apple".into(), 5), Some(2));
        let ids: Vec<&str> = zone.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["banana", "cherry", "apple"]);
        assert_eq!(zone.move_item(&"missing".into(), 1), None);
    }

    #[test]
    fn insert_items_after_anchor_skips_duplicates() {
        let mut zone = fruit();
        let inserted = zone.insert_items(
            Some(&"apple".into()),
            [
                ItemEntry::new("kiwi", ItemRole::Option),
                ItemEntry::new("cherry", ItemRole::Option),
                ItemEntry::new("lime", ItemRole::Option),
            ],
        );
        assert_eq!(inserted, 2);
        let ids: Vec<&str> = zone.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["apple", "kiwi", "lime", "banana", "cherry"]);

        zone.insert_items(None, [ItemEntry::new("plum", ItemRole::Option)]);
        assert_eq!(zone.items.last().map(|i| i.id.as_str()), Some("plum"));
    }

    #[test]
    fn item_filter_admits() {
        let zone = fruit().with_item_filter(|item| item.id != "banana");
        let banana = zone.item(&"banana".into()).unwrap();
        let apple = zone.item(&"apple".into()).unwrap();
        assert!(!zone.callbacks.admits(banana));
        assert!(zone.callbacks.admits(apple));
    }

    #[test]
    fn menu_defaults() {
        let config = ZoneRole::Menu.default_config();
        assert!(config.navigation.wrap);
        assert_eq!(config.dismiss.escape, EscapeBehavior::Close);
        assert_eq!(config.dismiss.outside_click, OutsideClickBehavior::Close);
        assert!(config.activate.re_click_only);
    }

    #[test]
    fn zone_of_item_finds_owner() {
        let mut registry = ZoneRegistry::new();
        registry.register(fruit());
        registry.register(ZoneEntry::new("tools", ZoneRole::Toolbar).with_items(["bold"]));
        assert_eq!(
            registry.zone_of_item(&"bold".into()).map(|z| z.id.as_str()),
            Some("tools")
        );
        assert!(registry.zone_of_item(&"nope".into()).is_none());
    }
}
