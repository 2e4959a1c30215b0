#![forbid(unsafe_code)]

//! Item-level contracts: the role key table and activation.

use crate::command::{Command, ExpandAction};
use crate::event::{KeyCode, KeyCombo};
use crate::id::ItemId;
use crate::keymap::Cursor;
use crate::registry::ItemRole;

/// Commands produced by activating `item`.
///
/// In precedence order an expandable item toggles its expansion, an editable
/// item starts editing, a zone action callback runs, and anything else emits
/// a plain activate.
#[must_use]
pub fn activation(cursor: &Cursor<'_>, item: &ItemId, expandable: bool, editable: bool) -> Vec<Command> {
    let zone = cursor.zone_id().clone();
    if expandable {
        return vec![Command::Expand {
            zone,
            item: item.clone(),
            action: ExpandAction::Toggle,
        }];
    }
    if editable {
        return vec![Command::StartEdit {
            zone,
            item: item.clone(),
        }];
    }
    if let Some(action) = &cursor.zone.callbacks.action {
        let commands = action(cursor);
        if !commands.is_empty() {
            return commands;
        }
    }
    vec![Command::Activate {
        zone,
        item: item.clone(),
    }]
}

/// Role-specific response of the focused item to `key`.
///
/// A zone check callback claims plain Space on the logically focused item
/// before the role contract is consulted, so Space never both checks and
/// toggles.
#[must_use]
pub fn role_commands(cursor: &Cursor<'_>, key: &KeyCombo) -> Option<Vec<Command>> {
    let item = cursor.focused_item()?;
    let zone = cursor.zone_id();

    if key.is_plain(KeyCode::SPACE) {
        if let Some(check) = &cursor.zone.callbacks.check {
            return Some(check(cursor));
        }
        if item.role.toggles_on_space() {
            return Some(vec![Command::Check {
                zone: zone.clone(),
                item: item.id.clone(),
            }]);
        }
        return None;
    }

    if item.expandable && item.role == ItemRole::TreeItem {
        let expanded = cursor.state.is_expanded(&item.id);
        let action = if key.is_plain(KeyCode::Right) && !expanded {
            ExpandAction::Expand
        } else if key.is_plain(KeyCode::Left) && expanded {
            ExpandAction::Collapse
        } else {
            return None;
        };
        return Some(vec![Command::Expand {
            zone: zone.clone(),
            item: item.id.clone(),
            action,
        }]);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ItemEntry, ZoneEntry, ZoneRole};
    use crate::state::ZoneState;

    fn focused(id: &str) -> ZoneState {
        ZoneState {
            focused_item_id: Some(id.into()),
            ..ZoneState::default()
        }
    }

    fn space() -> KeyCombo {
        KeyCombo::plain(KeyCode::SPACE)
    }

    #[test]
    fn activation_precedence() {
        let zone = ZoneEntry::new("z", ZoneRole::Listbox)
            .with_items(["a"])
            .on_action(|_| vec![Command::Undo]);
        let state = focused("a");
        let cursor = Cursor::new(&zone, &state);
        let a = ItemId::from("a");

        assert_eq!(activation(&cursor, &a, true, true)[0].name(), "expand");
        assert_eq!(activation(&cursor, &a, false, true)[0].name(), "start_edit");
        assert_eq!(activation(&cursor, &a, false, false), vec![Command::Undo]);

        let plain = ZoneEntry::new("z", ZoneRole::Listbox).with_items(["a"]);
        let cursor = Cursor::new(&plain, &state);
        assert_eq!(
            activation(&cursor, &a, false, false),
            vec![Command::Activate {
                zone: "z".into(),
                item: a.clone(),
            }]
        );
    }

    #[test]
    fn space_toggles_checkbox_role() {
        let zone = ZoneEntry::new("opts", ZoneRole::Toolbar)
            .with_item(ItemEntry::new("wrap", ItemRole::Checkbox));
        let state = focused("wrap");
        let cursor = Cursor::new(&zone, &state);
        assert_eq!(
            role_commands(&cursor, &space()),
            Some(vec![Command::Check {
                zone: "opts".into(),
                item: "wrap".into(),
            }])
        );
    }

    #[test]
    fn zone_check_wins_over_role_toggle() {
        let zone = ZoneEntry::new("opts", ZoneRole::Toolbar)
            .with_item(ItemEntry::new("wrap", ItemRole::Switch))
            .on_check(|cursor| {
                vec![Command::Custom {
                    name: "zone-check".into(),
                    zone: None,
                    item: cursor.focus_id().cloned(),
                }]
            });
        let state = focused("wrap");
        let cursor = Cursor::new(&zone, &state);
        let commands = role_commands(&cursor, &space()).unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].name(), "custom");
    }

    #[test]
    fn tree_item_expand_collapse() {
        let zone = ZoneEntry::new("t", ZoneRole::Tree)
            .with_item(ItemEntry::new("root", ItemRole::TreeItem).expandable());
        let mut state = focused("root");
        let right = KeyCombo::plain(KeyCode::Right);
        let left = KeyCombo::plain(KeyCode::Left);

        let cursor = Cursor::new(&zone, &state);
        assert!(matches!(
            role_commands(&cursor, &right).as_deref(),
            Some([Command::Expand { action: ExpandAction::Expand, .. }])
        ));
        assert_eq!(role_commands(&cursor, &left), None);

        state.expanded_items.insert("root".into());
        let cursor = Cursor::new(&zone, &state);
        assert_eq!(role_commands(&cursor, &right), None);
        assert!(matches!(
            role_commands(&cursor, &left).as_deref(),
            Some([Command::Expand { action: ExpandAction::Collapse, .. }])
        ));
    }

    #[test]
    fn unregistered_focus_has_no_contract() {
        let zone = ZoneEntry::new("opts", ZoneRole::Toolbar)
            .with_item(ItemEntry::new("wrap", ItemRole::Checkbox));
        let state = focused("ghost");
        let cursor = Cursor::new(&zone, &state);
        assert_eq!(role_commands(&cursor, &space()), None);
    }

    #[test]
    fn plain_option_leaves_space_to_zone() {
        let zone = ZoneEntry::new("fruit", ZoneRole::Listbox).with_items(["apple"]);
        let state = focused("apple");
        let cursor = Cursor::new(&zone, &state);
        assert_eq!(role_commands(&cursor, &space()), None);
    }
}
