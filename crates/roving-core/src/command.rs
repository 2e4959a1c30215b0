#![forbid(unsafe_code)]

//! Commands emitted by the resolvers and the result envelope around them.
//!
//! A [`ResolveResult`] is the only thing a resolver hands back. The dispatcher
//! applies `commands` atomically and in order, then honors `prevent_default`
//! and `fallback` against the host input pipeline.

use crate::event::{KeyCombo, Modifiers};
use crate::id::{ItemId, ZoneId};

/// How a select command combines with the existing selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectMode {
    /// Selection becomes exactly the target.
    Replace,
    /// Target is added or removed.
    Toggle,
    /// Everything between the anchor and the target.
    Range,
}

impl SelectMode {
    /// Derive the mode from held modifiers.
    ///
    /// Shift wins over everything; Meta or Ctrl toggles; Alt alone (and no
    /// modifier) replaces.
    #[must_use]
    pub const fn from_modifiers(modifiers: Modifiers) -> Self {
        if modifiers.contains(Modifiers::SHIFT) {
            Self::Range
        } else if modifiers.intersects(Modifiers::CTRL.union(Modifiers::SUPER)) {
            Self::Toggle
        } else {
            Self::Replace
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Toggle => "toggle",
            Self::Range => "range",
        }
    }
}

/// Expansion change requested for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpandAction {
    Toggle,
    Expand,
    Collapse,
}

/// Direction of zone traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabDirection {
    Forward,
    Backward,
}

/// A state-mutating command for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Move focus to `item`, activating `zone` if needed.
    Focus { zone: ZoneId, item: ItemId },
    Select {
        zone: ZoneId,
        item: ItemId,
        mode: SelectMode,
    },
    SelectAll { zone: ZoneId },
    /// Clear focus, selection and editing in `zone`.
    Deselect { zone: ZoneId },
    Activate { zone: ZoneId, item: ItemId },
    Expand {
        zone: ZoneId,
        item: ItemId,
        action: ExpandAction,
    },
    Check { zone: ZoneId, item: ItemId },
    StartEdit { zone: ZoneId, item: ItemId },
    CommitEdit {
        zone: ZoneId,
        item: ItemId,
        value: String,
    },
    CancelEdit { zone: ZoneId, item: ItemId },
    /// Close the zone (menus, popovers).
    Dismiss { zone: ZoneId },
    Tab { direction: TabDirection },
    Delete { zone: ZoneId, items: Vec<ItemId> },
    Copy { zone: ZoneId, items: Vec<ItemId> },
    Cut { zone: ZoneId, items: Vec<ItemId> },
    /// Paste clipboard contents after `after` (or at the end).
    Paste {
        zone: ZoneId,
        after: Option<ItemId>,
    },
    /// Reorder `item` by `delta` positions.
    Move {
        zone: ZoneId,
        item: ItemId,
        delta: i32,
    },
    Undo,
    Redo,
    /// Application-defined command from a keymap entry.
    Custom {
        name: String,
        zone: Option<ZoneId>,
        item: Option<ItemId>,
    },
}

impl Command {
    /// Stable command name for logs and traces.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Focus { .. } => "focus",
            Self::Select { .. } => "select",
            Self::SelectAll { .. } => "select_all",
            Self::Deselect { .. } => "deselect",
            Self::Activate { .. } => "activate",
            Self::Expand { .. } => "expand",
            Self::Check { .. } => "check",
            Self::StartEdit { .. } => "start_edit",
            Self::CommitEdit { .. } => "commit_edit",
            Self::CancelEdit { .. } => "cancel_edit",
            Self::Dismiss { .. } => "dismiss",
            Self::Tab { .. } => "tab",
            Self::Delete { .. } => "delete",
            Self::Copy { .. } => "copy",
            Self::Cut { .. } => "cut",
            Self::Paste { .. } => "paste",
            Self::Move { .. } => "move",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Custom { .. } => "custom",
        }
    }

    /// Zone the command targets, if any.
    #[must_use]
    pub fn zone(&self) -> Option<&ZoneId> {
        match self {
            Self::Focus { zone, .. }
            | Self::Select { zone, .. }
            | Self::SelectAll { zone }
            | Self::Deselect { zone }
            | Self::Activate { zone, .. }
            | Self::Expand { zone, .. }
            | Self::Check { zone, .. }
            | Self::StartEdit { zone, .. }
            | Self::CommitEdit { zone, .. }
            | Self::CancelEdit { zone, .. }
            | Self::Dismiss { zone }
            | Self::Delete { zone, .. }
            | Self::Copy { zone, .. }
            | Self::Cut { zone, .. }
            | Self::Paste { zone, .. }
            | Self::Move { zone, .. } => Some(zone),
            Self::Custom { zone, .. } => zone.as_ref(),
            Self::Tab { .. } | Self::Undo | Self::Redo => None,
        }
    }

    /// Single item the command targets, if any.
    #[must_use]
    pub fn item(&self) -> Option<&ItemId> {
        match self {
            Self::Focus { item, .. }
            | Self::Select { item, .. }
            | Self::Activate { item, .. }
            | Self::Expand { item, .. }
            | Self::Check { item, .. }
            | Self::StartEdit { item, .. }
            | Self::CommitEdit { item, .. }
            | Self::CancelEdit { item, .. }
            | Self::Move { item, .. } => Some(item),
            Self::Paste { after, .. } => after.as_ref(),
            Self::Custom { item, .. } => item.as_ref(),
            _ => None,
        }
    }

    /// True for commands that only move focus or traverse zones and leave
    /// application data untouched.
    #[must_use]
    pub const fn is_navigation(&self) -> bool {
        matches!(self, Self::Focus { .. } | Self::Tab { .. })
    }
}

/// Which layer produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveLayer {
    Guard,
    Field,
    Item,
    Zone,
    Global,
    Mouse,
    Click,
}

impl ResolveLayer {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Guard => "guard",
            Self::Field => "field",
            Self::Item => "item",
            Self::Zone => "zone",
            Self::Global => "global",
            Self::Mouse => "mouse",
            Self::Click => "click",
        }
    }
}

/// Diagnostic facts about a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolveMeta {
    /// Layer that claimed the event. `None` for fallback.
    pub layer: Option<ResolveLayer>,
    /// Key that was resolved (keyboard only).
    pub key: Option<KeyCombo>,
}

/// Output of every resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveResult {
    pub commands: Vec<Command>,
    /// Host should suppress its default action for the event.
    pub prevent_default: bool,
    /// No layer claimed the event; native behavior should proceed.
    pub fallback: bool,
    pub meta: ResolveMeta,
}

impl ResolveResult {
    /// No layer claimed the event.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            commands: Vec::new(),
            prevent_default: false,
            fallback: true,
            meta: ResolveMeta::default(),
        }
    }

    /// `layer` claimed the event and deliberately does nothing. Native
    /// behavior is not suppressed (text fields keep their own editing).
    #[must_use]
    pub fn absorbed(layer: ResolveLayer) -> Self {
        Self {
            commands: Vec::new(),
            prevent_default: false,
            fallback: false,
            meta: ResolveMeta {
                layer: Some(layer),
                key: None,
            },
        }
    }

    /// `layer` claimed the event and emits `commands`.
    #[must_use]
    pub fn handled(layer: ResolveLayer, commands: Vec<Command>) -> Self {
        Self {
            commands,
            prevent_default: true,
            fallback: false,
            meta: ResolveMeta {
                layer: Some(layer),
                key: None,
            },
        }
    }

    /// Emit `commands` but leave the host default alone.
    #[must_use]
    pub fn passive(layer: ResolveLayer, commands: Vec<Command>) -> Self {
        Self {
            prevent_default: false,
            ..Self::handled(layer, commands)
        }
    }

    /// Attach the resolved key.
    #[must_use]
    pub fn with_key(mut self, key: KeyCombo) -> Self {
        self.meta.key = Some(key);
        self
    }

    /// True when the result carries no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
