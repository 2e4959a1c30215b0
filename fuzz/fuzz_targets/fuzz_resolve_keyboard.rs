#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use roving_core::{
    Command, FieldRegistry, FocusStore, ItemEntry, ItemRole, KeyCode, KeyCombo, KeyboardInput,
    Keymap, Modifiers, ResolveContext, ZoneEntry, ZoneRegistry, ZoneRole, resolve_keyboard,
};

const KEYS: [KeyCode; 16] = [
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Home,
    KeyCode::End,
    KeyCode::PageUp,
    KeyCode::PageDown,
    KeyCode::Enter,
    KeyCode::Escape,
    KeyCode::Tab,
    KeyCode::BackTab,
    KeyCode::Delete,
    KeyCode::F(2),
    KeyCode::Char(' '),
    KeyCode::Char('a'),
];

const ROLES: [ZoneRole; 5] = [
    ZoneRole::Listbox,
    ZoneRole::Menu,
    ZoneRole::Tree,
    ZoneRole::Toolbar,
    ZoneRole::Grid,
];

#[derive(Arbitrary, Debug)]
struct Press {
    key: u8,
    modifiers: u8,
    composing: bool,
}

#[derive(Arbitrary, Debug)]
struct Script {
    role: u8,
    items: u8,
    presses: Vec<Press>,
}

fuzz_target!(|script: Script| {
    let role = ROLES[usize::from(script.role) % ROLES.len()];
    let count = usize::from(script.items % 12) + 1;
    let mut zone = ZoneEntry::new("z", role).with_columns(3);
    for i in 0..count {
        let mut item = ItemEntry::new(format!("i{i}"), ItemRole::Option);
        if role == ZoneRole::Tree && i > 0 {
            item = item.child_of(format!("i{}", (i - 1) / 2));
        }
        zone = zone.with_item(item);
    }
    let mut zones = ZoneRegistry::new();
    zones.register(zone);
    let fields = FieldRegistry::new();
    let keymap = Keymap::defaults();
    let mut store = FocusStore::new();

    for press in script.presses.iter().take(64) {
        let code = KEYS[usize::from(press.key) % KEYS.len()];
        let modifiers = Modifiers::from_bits_truncate(press.modifiers);
        let mut input = KeyboardInput::new(KeyCombo::new(code, modifiers));
        if press.composing {
            input = input.composing();
        }
        let result = resolve_keyboard(&input, &ResolveContext::new(&zones, &fields, &store, &keymap));

        // A declined press never asks the host to suppress its default.
        assert!(!(result.fallback && result.prevent_default));
        if press.composing {
            assert!(result.commands.is_empty());
        }

        for command in &result.commands {
            if let Command::Focus { zone, item } = command {
                let entry = zones.get(zone).expect("focus names a registered zone");
                assert!(entry.contains(item), "focus targets a registered item");
                store.zone_mut(zone).focused_item_id = Some(item.clone());
                store.set_active_zone(Some(zone.clone()));
            }
        }
    }
});
