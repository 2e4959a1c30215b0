#![forbid(unsafe_code)]

//! Keybinding tables for the zone and global layers.
//!
//! # Lookup order
//!
//! For one key press the zone layer consults, first match wins:
//!
//! 1. the active zone's own bindings ([`ZoneEntry::keymap`]),
//! 2. the built-in bindings for the zone's role ([`role_bindings`]),
//! 3. zone-scoped bindings of the global [`Keymap`] (only with an active
//!    zone),
//! 4. global-scoped bindings of the global [`Keymap`].
//!
//! A binding is either a constant command or a factory over the current
//! [`Cursor`]. Factories are skipped without a cursor, and a factory that
//! returns no commands declines the key so the search continues.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::command::{Command, SelectMode, TabDirection};
use crate::event::{KeyCode, KeyCombo, Modifiers};
use crate::id::{ItemId, ZoneId};
use crate::item;
use crate::navigate::{self, DrillUp};
use crate::registry::{CommandFactory, EscapeBehavior, ItemEntry, Orientation, ZoneEntry, ZoneRole};
use crate::state::ZoneState;

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// The minimal addressable state a dynamic binding needs.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    pub zone: &'a ZoneEntry,
    pub state: &'a ZoneState,
}

impl<'a> Cursor<'a> {
    #[must_use]
    pub const fn new(zone: &'a ZoneEntry, state: &'a ZoneState) -> Self {
        Self { zone, state }
    }

    #[must_use]
    pub fn zone_id(&self) -> &'a ZoneId {
        &self.zone.id
    }

    /// Focused item, if it is registered in the zone.
    #[must_use]
    pub fn focus_id(&self) -> Option<&'a ItemId> {
        self.state
            .focused_item_id
            .as_ref()
            .filter(|id| self.zone.contains(id))
    }

    #[must_use]
    pub fn focused_item(&self) -> Option<&'a ItemEntry> {
        self.focus_id().and_then(|id| self.zone.item(id))
    }

    #[must_use]
    pub fn selection(&self) -> &'a BTreeSet<ItemId> {
        &self.state.selection
    }

    #[must_use]
    pub fn anchor(&self) -> Option<&'a ItemId> {
        self.state.selection_anchor.as_ref()
    }

    /// Items an operation applies to: the selection when non-empty,
    /// otherwise the focused item.
    #[must_use]
    pub fn targets(&self) -> Vec<ItemId> {
        if self.state.selection.is_empty() {
            self.focus_id().cloned().into_iter().collect()
        } else {
            // Selection order follows registration order, not id order.
            self.zone
                .items
                .iter()
                .filter(|item| self.state.selection.contains(&item.id))
                .map(|item| item.id.clone())
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// Bindings
// ---------------------------------------------------------------------------

/// Interaction mode a binding applies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum When {
    #[default]
    Always,
    Navigating,
    Editing,
}

impl When {
    #[must_use]
    pub const fn matches(self, editing: bool) -> bool {
        match self {
            Self::Always => true,
            Self::Navigating => !editing,
            Self::Editing => editing,
        }
    }
}

/// Where a binding lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingScope {
    Global,
    Zone,
}

/// Command factory over the current cursor.
pub type DynamicCommand = Arc<dyn Fn(&Cursor<'_>) -> Vec<Command> + Send + Sync>;

/// What a binding produces.
#[derive(Clone)]
pub enum BindingAction {
    Constant(Command),
    Dynamic(DynamicCommand),
}

impl fmt::Debug for BindingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(command) => f.debug_tuple("Constant").field(command).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub combo: KeyCombo,
    pub when: When,
    pub scope: BindingScope,
    pub action: BindingAction,
}

impl KeyBinding {
    /// Zone-scoped binding to a fixed command.
    #[must_use]
    pub fn constant(combo: KeyCombo, command: Command) -> Self {
        Self {
            combo,
            when: When::Always,
            scope: BindingScope::Zone,
            action: BindingAction::Constant(command),
        }
    }

    /// Zone-scoped binding to a cursor factory.
    #[must_use]
    pub fn dynamic(
        combo: KeyCombo,
        f: impl Fn(&Cursor<'_>) -> Vec<Command> + Send + Sync + 'static,
    ) -> Self {
        Self {
            combo,
            when: When::Always,
            scope: BindingScope::Zone,
            action: BindingAction::Dynamic(Arc::new(f)),
        }
    }

    #[must_use]
    pub const fn when(mut self, when: When) -> Self {
        self.when = when;
        self
    }

    #[must_use]
    pub const fn global(mut self) -> Self {
        self.scope = BindingScope::Global;
        self
    }

    /// True when the binding is eligible for `key` in the current mode.
    #[must_use]
    pub fn matches(&self, key: &KeyCombo, editing: bool) -> bool {
        self.combo == *key && self.when.matches(editing)
    }

    /// Commands for this binding, or `None` when it is skipped (dynamic with
    /// no cursor) or declines (empty factory output).
    #[must_use]
    pub fn apply(&self, cursor: Option<&Cursor<'_>>) -> Option<Vec<Command>> {
        match &self.action {
            BindingAction::Constant(command) => Some(vec![command.clone()]),
            BindingAction::Dynamic(factory) => {
                let commands = factory(cursor?);
                (!commands.is_empty()).then_some(commands)
            }
        }
    }
}

/// Outcome of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingMatch {
    pub commands: Vec<Command>,
    pub scope: BindingScope,
}

/// The application-wide keymap.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    bindings: Vec<KeyBinding>,
}

impl Keymap {
    /// An empty keymap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Undo/redo and zone traversal.
    #[must_use]
    pub fn defaults() -> Self {
        let z = KeyCode::Char('z');
        let mut keymap = Self::new();
        for combo in [KeyCombo::ctrl(z), KeyCombo::meta(z)] {
            keymap.bind(
                KeyBinding::constant(combo, Command::Undo)
                    .when(When::Navigating)
                    .global(),
            );
        }
        for combo in [
            KeyCombo::new(z, Modifiers::CTRL | Modifiers::SHIFT),
            KeyCombo::new(z, Modifiers::SUPER | Modifiers::SHIFT),
            KeyCombo::ctrl(KeyCode::Char('y')),
        ] {
            keymap.bind(
                KeyBinding::constant(combo, Command::Redo)
                    .when(When::Navigating)
                    .global(),
            );
        }
        keymap.bind(
            KeyBinding::constant(
                KeyCombo::plain(KeyCode::Tab),
                Command::Tab {
                    direction: TabDirection::Forward,
                },
            )
            .global(),
        );
        keymap.bind(
            KeyBinding::constant(
                KeyCombo::shift(KeyCode::Tab),
                Command::Tab {
                    direction: TabDirection::Backward,
                },
            )
            .global(),
        );
        keymap
    }

    /// Append a binding. Earlier bindings win.
    pub fn bind(&mut self, binding: KeyBinding) {
        self.bindings.push(binding);
    }

    #[must_use]
    pub fn with(mut self, binding: KeyBinding) -> Self {
        self.bind(binding);
        self
    }

    #[must_use]
    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Run the full zone/global lookup for `key`.
    #[must_use]
    pub fn lookup(
        &self,
        zone: Option<&ZoneEntry>,
        cursor: Option<&Cursor<'_>>,
        key: &KeyCombo,
        editing: bool,
    ) -> Option<BindingMatch> {
        let zone_tables = zone
            .into_iter()
            .flat_map(|zone| zone.keymap.iter().chain(role_bindings(zone.role)));
        let scoped = self
            .bindings
            .iter()
            .filter(|binding| zone.is_some() && binding.scope == BindingScope::Zone);
        let zone_hit = zone_tables
            .chain(scoped)
            .filter(|binding| binding.matches(key, editing))
            .find_map(|binding| binding.apply(cursor));
        if let Some(commands) = zone_hit {
            return Some(BindingMatch {
                commands,
                scope: BindingScope::Zone,
            });
        }

        self.bindings
            .iter()
            .filter(|binding| binding.scope == BindingScope::Global)
            .filter(|binding| binding.matches(key, editing))
            .find_map(|binding| binding.apply(cursor))
            .map(|commands| BindingMatch {
                commands,
                scope: BindingScope::Global,
            })
    }
}

// ---------------------------------------------------------------------------
// Role keymaps
// ---------------------------------------------------------------------------

/// Built-in bindings implementing the role's keyboard pattern.
#[must_use]
pub fn role_bindings(role: ZoneRole) -> &'static [KeyBinding] {
    static LISTBOX: OnceLock<Vec<KeyBinding>> = OnceLock::new();
    static GRID: OnceLock<Vec<KeyBinding>> = OnceLock::new();
    static MENU: OnceLock<Vec<KeyBinding>> = OnceLock::new();
    static TOOLBAR: OnceLock<Vec<KeyBinding>> = OnceLock::new();
    static TREE: OnceLock<Vec<KeyBinding>> = OnceLock::new();
    static TABLIST: OnceLock<Vec<KeyBinding>> = OnceLock::new();

    match role {
        ZoneRole::Listbox => LISTBOX.get_or_init(|| {
            let mut bindings = linear_bindings();
            bindings.extend(selection_bindings());
            bindings.extend(action_bindings());
            bindings
        }),
        ZoneRole::Grid => GRID.get_or_init(|| {
            let mut bindings = grid_bindings();
            bindings.extend(select_all_bindings());
            bindings.extend(action_bindings());
            bindings
        }),
        ZoneRole::Menu => MENU.get_or_init(|| {
            let mut bindings = linear_bindings();
            bindings.push(space_activates());
            bindings.extend(action_bindings());
            bindings
        }),
        ZoneRole::Toolbar => TOOLBAR.get_or_init(|| {
            let mut bindings = linear_bindings();
            bindings.extend(action_bindings());
            bindings
        }),
        ZoneRole::Tree => TREE.get_or_init(|| {
            let mut bindings = linear_bindings();
            bindings.extend(tree_bindings());
            bindings.extend(selection_bindings());
            bindings.extend(action_bindings());
            bindings
        }),
        ZoneRole::Tablist => TABLIST.get_or_init(|| {
            let mut bindings = linear_bindings();
            bindings.push(space_activates());
            bindings.extend(action_bindings());
            bindings
        }),
    }
}

fn focus(cursor: &Cursor<'_>, target: Option<ItemId>) -> Vec<Command> {
    target
        .map(|item| Command::Focus {
            zone: cursor.zone_id().clone(),
            item,
        })
        .into_iter()
        .collect()
}

fn axis_enabled(orientation: Orientation, vertical: bool) -> bool {
    match orientation {
        Orientation::Both => true,
        Orientation::Vertical => vertical,
        Orientation::Horizontal => !vertical,
    }
}

/// Arrow key that moves `delta` when the zone's orientation covers its axis.
fn arrow(code: KeyCode, vertical: bool, delta: isize) -> KeyBinding {
    KeyBinding::dynamic(KeyCombo::plain(code), move |cursor| {
        if !axis_enabled(cursor.zone.config.navigation.orientation, vertical) {
            return Vec::new();
        }
        focus(cursor, navigate::step(cursor.zone, cursor.state, delta))
    })
}

fn linear_bindings() -> Vec<KeyBinding> {
    vec![
        arrow(KeyCode::Up, true, -1),
        arrow(KeyCode::Down, true, 1),
        arrow(KeyCode::Left, false, -1),
        arrow(KeyCode::Right, false, 1),
        KeyBinding::dynamic(KeyCombo::plain(KeyCode::Home), |cursor| {
            focus(cursor, navigate::first(cursor.zone, cursor.state))
        }),
        KeyBinding::dynamic(KeyCombo::plain(KeyCode::End), |cursor| {
            focus(cursor, navigate::last(cursor.zone, cursor.state))
        }),
    ]
}

fn grid_bindings() -> Vec<KeyBinding> {
    let cell = |code, dx: isize, dy: isize| {
        KeyBinding::dynamic(KeyCombo::plain(code), move |cursor| {
            focus(cursor, navigate::grid_move(cursor.zone, cursor.state, dx, dy))
        })
    };
    vec![
        cell(KeyCode::Up, 0, -1),
        cell(KeyCode::Down, 0, 1),
        cell(KeyCode::Left, -1, 0),
        cell(KeyCode::Right, 1, 0),
        KeyBinding::dynamic(KeyCombo::plain(KeyCode::Home), |cursor| {
            focus(cursor, navigate::row_start(cursor.zone, cursor.state))
        }),
        KeyBinding::dynamic(KeyCombo::plain(KeyCode::End), |cursor| {
            focus(cursor, navigate::row_end(cursor.zone, cursor.state))
        }),
        KeyBinding::dynamic(KeyCombo::ctrl(KeyCode::Home), |cursor| {
            focus(cursor, navigate::first(cursor.zone, cursor.state))
        }),
        KeyBinding::dynamic(KeyCombo::ctrl(KeyCode::End), |cursor| {
            focus(cursor, navigate::last(cursor.zone, cursor.state))
        }),
    ]
}

fn tree_bindings() -> Vec<KeyBinding> {
    vec![
        KeyBinding::dynamic(KeyCombo::plain(KeyCode::Right), |cursor| {
            let Some(item) = cursor.focus_id() else {
                return Vec::new();
            };
            if !cursor.state.is_expanded(item) {
                return Vec::new();
            }
            focus(cursor, navigate::first_child(cursor.zone, item).cloned())
        }),
        KeyBinding::dynamic(KeyCombo::plain(KeyCode::Left), |cursor| {
            let Some(item) = cursor.focus_id() else {
                return Vec::new();
            };
            focus(cursor, navigate::parent(cursor.zone, item).cloned())
        }),
    ]
}

fn extend_range(code: KeyCode, delta: isize) -> KeyBinding {
    KeyBinding::dynamic(KeyCombo::shift(code), move |cursor| {
        let Some(target) = navigate::step(cursor.zone, cursor.state, delta) else {
            return Vec::new();
        };
        let zone = cursor.zone_id().clone();
        vec![
            Command::Focus {
                zone: zone.clone(),
                item: target.clone(),
            },
            Command::Select {
                zone,
                item: target,
                mode: SelectMode::Range,
            },
        ]
    })
}

fn select_all_bindings() -> Vec<KeyBinding> {
    let a = KeyCode::Char('a');
    [KeyCombo::ctrl(a), KeyCombo::meta(a)]
        .into_iter()
        .map(|combo| {
            KeyBinding::dynamic(combo, |cursor| {
                vec![Command::SelectAll {
                    zone: cursor.zone_id().clone(),
                }]
            })
            .when(When::Navigating)
        })
        .collect()
}

fn selection_bindings() -> Vec<KeyBinding> {
    let mut bindings = vec![
        extend_range(KeyCode::Up, -1),
        extend_range(KeyCode::Down, 1),
        KeyBinding::dynamic(KeyCombo::plain(KeyCode::SPACE), |cursor| {
            cursor
                .focus_id()
                .map(|item| Command::Select {
                    zone: cursor.zone_id().clone(),
                    item: item.clone(),
                    mode: SelectMode::Toggle,
                })
                .into_iter()
                .collect()
        })
        .when(When::Navigating),
    ];
    bindings.extend(select_all_bindings());
    bindings
}

fn activate_focused(cursor: &Cursor<'_>) -> Vec<Command> {
    match cursor.focused_item() {
        Some(item) => item::activation(cursor, &item.id, item.expandable, item.editable),
        None => Vec::new(),
    }
}

fn space_activates() -> KeyBinding {
    KeyBinding::dynamic(KeyCombo::plain(KeyCode::SPACE), activate_focused).when(When::Navigating)
}

fn escape(cursor: &Cursor<'_>) -> Vec<Command> {
    let zone = cursor.zone_id().clone();
    let idle = cursor.focus_id().is_none() && cursor.selection().is_empty();
    match cursor.zone.config.dismiss.escape {
        EscapeBehavior::None => Vec::new(),
        EscapeBehavior::Close => vec![Command::Dismiss { zone }],
        EscapeBehavior::Deselect if idle => Vec::new(),
        EscapeBehavior::Deselect => vec![Command::Deselect { zone }],
        EscapeBehavior::DrillUp => match navigate::drill_up(cursor.zone, cursor.state) {
            Some(DrillUp::Parent(item)) => vec![Command::Focus { zone, item }],
            Some(DrillUp::Root) => vec![Command::Deselect { zone }],
            None if idle => Vec::new(),
            None => vec![Command::Deselect { zone }],
        },
    }
}

fn callback(cursor: &Cursor<'_>, pick: fn(&ZoneEntry) -> Option<&CommandFactory>) -> Vec<Command> {
    pick(cursor.zone).map_or_else(Vec::new, |factory| factory(cursor))
}

fn reorder(delta: i32) -> impl Fn(&Cursor<'_>) -> Vec<Command> + Send + Sync + 'static {
    move |cursor: &Cursor<'_>| {
        if cursor.focus_id().is_none() {
            return Vec::new();
        }
        cursor
            .zone
            .callbacks
            .reorder
            .as_ref()
            .map_or_else(Vec::new, |factory| factory(cursor, delta))
    }
}

fn action_bindings() -> Vec<KeyBinding> {
    let mut bindings = vec![
        KeyBinding::dynamic(KeyCombo::plain(KeyCode::Enter), activate_focused).when(When::Navigating),
        KeyBinding::dynamic(KeyCombo::plain(KeyCode::F(2)), |cursor| {
            cursor
                .focused_item()
                .filter(|item| item.editable)
                .map(|item| Command::StartEdit {
                    zone: cursor.zone_id().clone(),
                    item: item.id.clone(),
                })
                .into_iter()
                .collect()
        })
        .when(When::Navigating),
        KeyBinding::dynamic(KeyCombo::plain(KeyCode::Escape), escape).when(When::Navigating),
        KeyBinding::dynamic(KeyCombo::alt(KeyCode::Up), reorder(-1)).when(When::Navigating),
        KeyBinding::dynamic(KeyCombo::alt(KeyCode::Down), reorder(1)).when(When::Navigating),
    ];
    for code in [KeyCode::Delete, KeyCode::Backspace] {
        bindings.push(
            KeyBinding::dynamic(KeyCombo::plain(code), |cursor| {
                callback(cursor, |zone| zone.callbacks.delete.as_ref())
            })
            .when(When::Navigating),
        );
    }
    for modifiers in [Modifiers::CTRL, Modifiers::SUPER] {
        let key = |c| KeyCombo::new(KeyCode::Char(c), modifiers);
        bindings.push(
            KeyBinding::dynamic(key('c'), |cursor| {
                callback(cursor, |zone| zone.callbacks.copy.as_ref())
            })
            .when(When::Navigating),
        );
        bindings.push(
            KeyBinding::dynamic(key('x'), |cursor| {
                callback(cursor, |zone| zone.callbacks.cut.as_ref())
            })
            .when(When::Navigating),
        );
        bindings.push(
            KeyBinding::dynamic(key('v'), |cursor| {
                callback(cursor, |zone| zone.callbacks.paste.as_ref())
            })
            .when(When::Navigating),
        );
    }
    bindings
}
