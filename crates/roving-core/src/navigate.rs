#![forbid(unsafe_code)]

//! Pure navigation over a zone's items.
//!
//! All moves read the registration order of [`ZoneEntry::items`], narrowed by
//! the zone's item filter and, for trees, by visibility (children of
//! collapsed parents are skipped). Moves never fail: with nothing focused a
//! forward move lands on the first candidate and a backward move on the last.
//! Without wrapping a move past either end stays on the boundary item.

use crate::id::ItemId;
use crate::registry::{ItemEntry, ZoneEntry, ZoneRole};
use crate::state::ZoneState;

/// Items that take part in navigation, in order.
#[must_use]
pub fn candidates<'a>(zone: &'a ZoneEntry, state: &ZoneState) -> Vec<&'a ItemEntry> {
    zone.items
        .iter()
        .filter(|item| zone.callbacks.admits(item))
        .filter(|item| zone.role != ZoneRole::Tree || is_visible(zone, state, &item.id))
        .collect()
}

/// True when every ancestor of `id` is expanded.
///
/// Parent chains are followed at most `items.len()` steps so a malformed
/// (cyclic) hierarchy cannot loop.
#[must_use]
pub fn is_visible(zone: &ZoneEntry, state: &ZoneState, id: &ItemId) -> bool {
    let mut current = zone.item(id).and_then(|item| item.parent.as_ref());
    for _ in 0..zone.items.len() {
        let Some(parent) = current else {
            return true;
        };
        if !state.is_expanded(parent) {
            return false;
        }
        current = zone.item(parent).and_then(|item| item.parent.as_ref());
    }
    current.is_none()
}

#[must_use]
pub fn first(zone: &ZoneEntry, state: &ZoneState) -> Option<ItemId> {
    candidates(zone, state).first().map(|item| item.id.clone())
}

#[must_use]
pub fn last(zone: &ZoneEntry, state: &ZoneState) -> Option<ItemId> {
    candidates(zone, state).last().map(|item| item.id.clone())
}

fn focused_index(items: &[&ItemEntry], state: &ZoneState) -> Option<usize> {
    let focused = state.focused_item_id.as_ref()?;
    items.iter().position(|item| &item.id == focused)
}

/// Move `delta` candidates away from the focused item.
#[must_use]
pub fn step(zone: &ZoneEntry, state: &ZoneState, delta: isize) -> Option<ItemId> {
    let items = candidates(zone, state);
    let len = items.len() as isize;
    if len == 0 {
        return None;
    }
    let target = match focused_index(&items, state) {
        None if delta >= 0 => 0,
        None => len - 1,
        Some(idx) => {
            let raw = idx as isize + delta;
            if zone.config.navigation.wrap {
                raw.rem_euclid(len)
            } else {
                raw.clamp(0, len - 1)
            }
        }
    };
    items.get(target as usize).map(|item| item.id.clone())
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

fn columns(zone: &ZoneEntry) -> usize {
    zone.config.navigation.columns.max(1)
}

/// Move within a grid laid out row-major with the zone's column count.
///
/// Horizontal moves stay inside the current row; vertical moves stay in the
/// same column and do nothing past the first or last row.
#[must_use]
pub fn grid_move(zone: &ZoneEntry, state: &ZoneState, dx: isize, dy: isize) -> Option<ItemId> {
    let items = candidates(zone, state);
    if items.is_empty() {
        return None;
    }
    let Some(idx) = focused_index(&items, state) else {
        return items.first().map(|item| item.id.clone());
    };
    let cols = columns(zone);
    let (row, col) = (idx / cols, idx % cols);
    let row_len = cols.min(items.len() - row * cols);

    let new_col = (col as isize + dx).clamp(0, row_len as isize - 1) as usize;
    let new_row = row as isize + dy;
    let target = if new_row < 0 {
        idx
    } else {
        let candidate = new_row as usize * cols + if dy == 0 { new_col } else { col };
        if candidate < items.len() { candidate } else { idx }
    };
    items.get(target).map(|item| item.id.clone())
}

/// First item of the focused row.
#[must_use]
pub fn row_start(zone: &ZoneEntry, state: &ZoneState) -> Option<ItemId> {
    let items = candidates(zone, state);
    let idx = focused_index(&items, state).unwrap_or(0);
    let cols = columns(zone);
    items.get(idx / cols * cols).map(|item| item.id.clone())
}

/// Last item of the focused row.
#[must_use]
pub fn row_end(zone: &ZoneEntry, state: &ZoneState) -> Option<ItemId> {
    let items = candidates(zone, state);
    if items.is_empty() {
        return None;
    }
    let idx = focused_index(&items, state).unwrap_or(0);
    let cols = columns(zone);
    let end = (idx / cols * cols + cols - 1).min(items.len() - 1);
    items.get(end).map(|item| item.id.clone())
}

// ---------------------------------------------------------------------------
// Hierarchy
// ---------------------------------------------------------------------------

/// Registered parent of `id`. Parents missing from the zone count as none.
#[must_use]
pub fn parent<'a>(zone: &'a ZoneEntry, id: &ItemId) -> Option<&'a ItemId> {
    let parent = zone.item(id)?.parent.as_ref()?;
    zone.contains(parent).then_some(parent)
}

/// First child of `id` admitted by the item filter.
#[must_use]
pub fn first_child<'a>(zone: &'a ZoneEntry, id: &'a ItemId) -> Option<&'a ItemId> {
    zone.children_of(id)
        .find(|item| zone.callbacks.admits(item))
        .map(|item| &item.id)
}

/// Outcome of one drill-up step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrillUp {
    /// Move focus to the parent.
    Parent(ItemId),
    /// Already at the root; the zone should deselect.
    Root,
}

/// One escalating-escape step from the focused item. `None` when nothing is
/// focused.
#[must_use]
pub fn drill_up(zone: &ZoneEntry, state: &ZoneState) -> Option<DrillUp> {
    let focused = state.focused_item_id.as_ref()?;
    Some(match parent(zone, focused) {
        Some(parent) => DrillUp::Parent(parent.clone()),
        None => DrillUp::Root,
    })
}
