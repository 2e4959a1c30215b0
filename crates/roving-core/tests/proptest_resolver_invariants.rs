//! Property-based invariant tests for the resolvers.
//!
//! 1. Keyboard resolution is deterministic for identical inputs
//! 2. Linear navigation never leaves the registered items
//! 3. Every release returns the gesture machine to Idle
//! 4. Movement within the threshold never starts a drag
//! 5. Select mode is total over modifier combinations
//! 6. A field never both delegates and commits the same key
//! 7. Press resolution emits focus before selection

use proptest::prelude::*;
use roving_core::{
    Command, FieldRegistry, FieldType, FocusStore, GestureState, KeyCode, KeyCombo, KeyboardInput,
    Keymap, Modifiers, MouseInput, PointerInput, ResolveContext, SelectMode, ZoneEntry,
    ZoneRegistry, ZoneRole, pointer_down, pointer_move, pointer_up, resolve_keyboard,
    resolve_mouse,
};

// ── Strategies ──────────────────────────────────────────────────────────

fn role_strategy() -> impl Strategy<Value = ZoneRole> {
    prop_oneof![
        Just(ZoneRole::Listbox),
        Just(ZoneRole::Grid),
        Just(ZoneRole::Menu),
        Just(ZoneRole::Toolbar),
        Just(ZoneRole::Tree),
        Just(ZoneRole::Tablist),
    ]
}

fn code_strategy() -> impl Strategy<Value = KeyCode> {
    prop_oneof![
        Just(KeyCode::Up),
        Just(KeyCode::Down),
        Just(KeyCode::Left),
        Just(KeyCode::Right),
        Just(KeyCode::Home),
        Just(KeyCode::End),
        Just(KeyCode::Enter),
        Just(KeyCode::Escape),
        Just(KeyCode::Tab),
        Just(KeyCode::SPACE),
        Just(KeyCode::Delete),
        Just(KeyCode::F(2)),
        (b'a'..=b'z').prop_map(|c| KeyCode::Char(c as char)),
    ]
}

fn modifiers_strategy() -> impl Strategy<Value = Modifiers> {
    (0u8..16).prop_map(Modifiers::from_bits_truncate)
}

fn combo_strategy() -> impl Strategy<Value = KeyCombo> {
    (code_strategy(), modifiers_strategy()).prop_map(|(code, mods)| KeyCombo::new(code, mods))
}

fn field_type_strategy() -> impl Strategy<Value = FieldType> {
    prop_oneof![
        Just(FieldType::Inline),
        Just(FieldType::Tokens),
        Just(FieldType::Block),
        Just(FieldType::Editor),
    ]
}

#[derive(Debug, Clone)]
enum PointerOp {
    Down { x: f64, y: f64, handle: bool },
    Move { x: f64, y: f64 },
}

fn pointer_op_strategy() -> impl Strategy<Value = PointerOp> {
    prop_oneof![
        (-200.0f64..200.0, -200.0f64..200.0, any::<bool>())
            .prop_map(|(x, y, handle)| PointerOp::Down { x, y, handle }),
        (-200.0f64..200.0, -200.0f64..200.0).prop_map(|(x, y)| PointerOp::Move { x, y }),
    ]
}

/// One zone of `len` items named `i0..`, active, focused on `focus`.
fn fixture(role: ZoneRole, len: usize, focus: usize) -> (ZoneRegistry, FocusStore) {
    let mut zones = ZoneRegistry::new();
    let ids: Vec<String> = (0..len).map(|i| format!("i{i}")).collect();
    zones.register(ZoneEntry::new("z", role).with_items(ids.iter().map(String::as_str)));
    let mut store = FocusStore::new();
    store.set_active_zone(Some("z".into()));
    store.zone_mut(&"z".into()).focused_item_id = ids.get(focus).map(|id| id.as_str().into());
    (zones, store)
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Determinism
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn keyboard_resolution_is_deterministic(
        role in role_strategy(),
        len in 1usize..12,
        focus in 0usize..12,
        combo in combo_strategy(),
    ) {
        let (zones, store) = fixture(role, len, focus);
        let fields = FieldRegistry::new();
        let keymap = Keymap::defaults();
        let ctx = ResolveContext::new(&zones, &fields, &store, &keymap);
        let input = KeyboardInput::new(combo);

        let first = resolve_keyboard(&input, &ctx);
        let second = resolve_keyboard(&input, &ctx);
        prop_assert_eq!(first.clone(), second);
        prop_assert_eq!(first.meta.key, Some(combo));
        prop_assert!(!(first.fallback && first.prevent_default));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Navigation stays inside the zone
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn arrow_focus_targets_registered_items(
        role in prop_oneof![Just(ZoneRole::Listbox), Just(ZoneRole::Menu), Just(ZoneRole::Tree)],
        len in 1usize..12,
        focus in 0usize..12,
        down in any::<bool>(),
    ) {
        let (zones, store) = fixture(role, len, focus);
        let fields = FieldRegistry::new();
        let keymap = Keymap::new();
        let ctx = ResolveContext::new(&zones, &fields, &store, &keymap);
        let code = if down { KeyCode::Down } else { KeyCode::Up };

        let result = resolve_keyboard(&KeyboardInput::new(KeyCombo::plain(code)), &ctx);
        prop_assert!(result.prevent_default);
        prop_assert_eq!(result.commands.len(), 1);
        match &result.commands[0] {
            Command::Focus { zone, item } => {
                prop_assert_eq!(zone.as_str(), "z");
                prop_assert!(zones.zone_of_item(item).is_some());
            }
            other => prop_assert!(false, "unexpected command {other:?}"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3-4. Gesture machine
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn release_always_returns_to_idle(
        ops in prop::collection::vec(pointer_op_strategy(), 0..20),
        threshold in 1.0f64..20.0,
    ) {
        let mut state = GestureState::Idle;
        for op in &ops {
            state = match op {
                PointerOp::Down { x, y, handle } => {
                    let mut input = PointerInput::at(*x, *y).over_item("z", "a");
                    if *handle {
                        input = input.with_drag_handle();
                    }
                    pointer_down(state, &input)
                }
                PointerOp::Move { x, y } => pointer_move(state, &PointerInput::at(*x, *y), threshold),
            };
        }
        let (_, after) = pointer_up(state);
        prop_assert_eq!(after, GestureState::Idle);
    }

    #[test]
    fn movement_within_threshold_stays_pending(
        dx in -5.0f64..=5.0,
        dy in -5.0f64..=5.0,
    ) {
        let press = PointerInput::at(100.0, 100.0).over_item("z", "a").with_drag_handle();
        let state = pointer_down(GestureState::Idle, &press);
        let state = pointer_move(state, &PointerInput::at(100.0 + dx, 100.0 + dy), 5.0);
        prop_assert!(!state.is_dragging());
        prop_assert!(state.track().is_some());
    }

    #[test]
    fn movement_without_handle_never_drags(dx in -500.0f64..500.0, dy in -500.0f64..500.0) {
        let press = PointerInput::at(0.0, 0.0).over_item("z", "a");
        let state = pointer_down(GestureState::Idle, &press);
        let state = pointer_move(state, &PointerInput::at(dx, dy), 5.0);
        prop_assert!(!state.is_dragging());
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5. Select mode totality
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn select_mode_follows_modifier_precedence(mods in modifiers_strategy()) {
        let mode = SelectMode::from_modifiers(mods);
        if mods.contains(Modifiers::SHIFT) {
            prop_assert_eq!(mode, SelectMode::Range);
        } else if mods.intersects(Modifiers::CTRL | Modifiers::SUPER) {
            prop_assert_eq!(mode, SelectMode::Toggle);
        } else {
            prop_assert_eq!(mode, SelectMode::Replace);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 6. Field key ownership
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn field_never_delegates_its_commit_key(ty in field_type_strategy(), combo in combo_strategy()) {
        prop_assert!(!(ty.commits_on(&combo) && roving_core::field::is_delegated(&combo, ty)));
        if ty == FieldType::Editor {
            prop_assert!(!roving_core::field::is_delegated(&combo, ty));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 7. Press ordering
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn press_focuses_before_selecting(
        role in role_strategy(),
        len in 1usize..8,
        target in 0usize..8,
        mods in modifiers_strategy(),
    ) {
        let (zones, store) = fixture(role, len, 0);
        let fields = FieldRegistry::new();
        let keymap = Keymap::new();
        let ctx = ResolveContext::new(&zones, &fields, &store, &keymap);
        let item = format!("i{}", target.min(len - 1));

        let result = resolve_mouse(
            &MouseInput::on_item("z", item.as_str()).with_modifiers(mods),
            &ctx,
        );
        prop_assert!(!result.fallback);
        let focus_at = result.commands.iter().position(|c| matches!(c, Command::Focus { .. }));
        let select_at = result.commands.iter().position(|c| matches!(c, Command::Select { .. }));
        prop_assert_eq!(focus_at, Some(0));
        prop_assert_eq!(select_at, Some(1));
        let mode_matches = matches!(
            &result.commands[1],
            Command::Select { mode, .. } if *mode == SelectMode::from_modifiers(mods)
        );
        prop_assert!(mode_matches);
    }
}
