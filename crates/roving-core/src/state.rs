#![forbid(unsafe_code)]

//! Focus, selection, editing and expansion state per zone.
//!
//! This is data only. The dispatcher owns a [`FocusStore`] and mutates it by
//! applying commands; resolvers read it through a shared reference.
//!
//! # Invariants
//!
//! 1. `editing_item_id`, if present, equals `focused_item_id`.
//! 2. `selection_anchor` is only meaningful while a range gesture is in
//!    progress; a replace or toggle selection resets it to the touched item.
//! 3. At most one zone is active at a time.

use std::collections::{BTreeMap, BTreeSet};

use crate::id::{ItemId, ZoneId};

/// Per-zone interaction state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneState {
    pub focused_item_id: Option<ItemId>,
    /// Sticky focus used when the zone is re-entered.
    pub last_focused_id: Option<ItemId>,
    pub editing_item_id: Option<ItemId>,
    pub selection: BTreeSet<ItemId>,
    /// Pivot for range selection.
    pub selection_anchor: Option<ItemId>,
    pub expanded_items: BTreeSet<ItemId>,
    /// Caret offsets remembered per editable item.
    pub caret_positions: BTreeMap<ItemId, usize>,
}

static EMPTY_ZONE_STATE: ZoneState = ZoneState::EMPTY;

impl ZoneState {
    /// State of a zone nobody has touched yet.
    pub const EMPTY: Self = Self {
        focused_item_id: None,
        last_focused_id: None,
        editing_item_id: None,
        selection: BTreeSet::new(),
        selection_anchor: None,
        expanded_items: BTreeSet::new(),
        caret_positions: BTreeMap::new(),
    };

    #[inline]
    #[must_use]
    pub fn is_focused(&self, item: &ItemId) -> bool {
        self.focused_item_id.as_ref() == Some(item)
    }

    #[inline]
    #[must_use]
    pub fn is_selected(&self, item: &ItemId) -> bool {
        self.selection.contains(item)
    }

    #[inline]
    #[must_use]
    pub fn is_expanded(&self, item: &ItemId) -> bool {
        self.expanded_items.contains(item)
    }

    #[inline]
    #[must_use]
    pub fn is_editing(&self, item: &ItemId) -> bool {
        self.editing_item_id.as_ref() == Some(item)
    }

    /// Check the editing/focus invariant.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        match &self.editing_item_id {
            Some(editing) => self.focused_item_id.as_ref() == Some(editing),
            None => true,
        }
    }
}

/// Process-wide focus state: every zone's [`ZoneState`] plus the active zone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusStore {
    active_zone: Option<ZoneId>,
    zones: BTreeMap<ZoneId, ZoneState>,
}

impl FocusStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The single active zone, if any.
    #[inline]
    #[must_use]
    pub fn active_zone(&self) -> Option<&ZoneId> {
        self.active_zone.as_ref()
    }

    /// Make `zone` the active zone (or clear it).
    pub fn set_active_zone(&mut self, zone: Option<ZoneId>) {
        self.active_zone = zone;
    }

    /// State of `zone`, if it was ever touched.
    #[must_use]
    pub fn zone(&self, zone: &ZoneId) -> Option<&ZoneState> {
        self.zones.get(zone)
    }

    /// State of `zone`, or the empty state.
    #[must_use]
    pub fn zone_or_empty(&self, zone: &ZoneId) -> &ZoneState {
        self.zones.get(zone).unwrap_or(&EMPTY_ZONE_STATE)
    }

    /// Mutable state of `zone`, created on first use.
    pub fn zone_mut(&mut self, zone: &ZoneId) -> &mut ZoneState {
        self.zones.entry(zone.clone()).or_default()
    }

    /// Drop the state of an unmounted zone.
    pub fn remove_zone(&mut self, zone: &ZoneId) -> Option<ZoneState> {
        if self.active_zone.as_ref() == Some(zone) {
            self.active_zone = None;
        }
        self.zones.remove(zone)
    }

    /// The active zone together with its state.
    #[must_use]
    pub fn active(&self) -> Option<(&ZoneId, &ZoneState)> {
        let zone = self.active_zone.as_ref()?;
        Some((zone, self.zone_or_empty(zone)))
    }

    /// Focused item of the active zone.
    #[must_use]
    pub fn focused(&self) -> Option<(&ZoneId, &ItemId)> {
        let (zone, state) = self.active()?;
        state.focused_item_id.as_ref().map(|item| (zone, item))
    }

    /// Item being edited in the active zone.
    #[must_use]
    pub fn editing(&self) -> Option<(&ZoneId, &ItemId)> {
        let (zone, state) = self.active()?;
        state.editing_item_id.as_ref().map(|item| (zone, item))
    }

    /// Iterate over every touched zone in id order.
    pub fn zones(&self) -> impl Iterator<Item = (&ZoneId, &ZoneState)> {
        self.zones.iter()
    }

    /// True when every zone satisfies its invariants.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.zones.values().all(ZoneState::is_consistent)
    }
}
