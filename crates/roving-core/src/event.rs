#![forbid(unsafe_code)]

//! Input records consumed by the resolvers.
//!
//! Every record here is an immutable snapshot built by the host while sensing
//! its own element tree. The resolvers read them and never mutate them.
//!
//! # Design Notes
//!
//! - [`KeyCombo`] is normalized on construction: `BackTab` becomes
//!   `Tab`+`SHIFT` and ASCII letters are lowercased, so `"Shift+A"` and a
//!   sensed `Char('A')` with `SHIFT` compare equal.
//! - `Modifiers` use bitflags for easy combination.
//! - Pointer coordinates are host pixels (`f64`); the gesture thresholds are
//!   expressed in the same unit.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use crate::error::KeyParseError;
use crate::id::{ItemId, ZoneId};
use crate::registry::ItemRole;
use crate::state::FocusStore;

bitflags! {
    /// Modifier keys that can be held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Key codes for keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key. Space is `Char(' ')`.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Backspace key.
    Backspace,

    /// Tab key.
    Tab,

    /// Shift+Tab as reported by some hosts. Normalized away by [`KeyCombo`].
    BackTab,

    /// Delete key.
    Delete,

    /// Insert key.
    Insert,

    /// Home key.
    Home,

    /// End key.
    End,

    /// Page Up key.
    PageUp,

    /// Page Down key.
    PageDown,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,

    /// Function key (F1-F24).
    F(u8),
}

impl KeyCode {
    /// The space bar.
    pub const SPACE: Self = Self::Char(' ');

    /// True for the four arrow keys.
    #[must_use]
    pub const fn is_arrow(self) -> bool {
        matches!(self, Self::Up | Self::Down | Self::Left | Self::Right)
    }
}

/// A key plus the modifiers held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    /// Create a normalized combo.
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        match code {
            KeyCode::BackTab => Self {
                code: KeyCode::Tab,
                modifiers: modifiers.union(Modifiers::SHIFT),
            },
            KeyCode::Char(c) => Self {
                code: KeyCode::Char(c.to_ascii_lowercase()),
                modifiers,
            },
            _ => Self { code, modifiers },
        }
    }

    /// A combo without modifiers.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::NONE)
    }

    /// A combo with Shift held.
    #[must_use]
    pub const fn shift(code: KeyCode) -> Self {
        Self::new(code, Modifiers::SHIFT)
    }

    /// A combo with Ctrl held.
    #[must_use]
    pub const fn ctrl(code: KeyCode) -> Self {
        Self::new(code, Modifiers::CTRL)
    }

    /// A combo with Super/Meta held.
    #[must_use]
    pub const fn meta(code: KeyCode) -> Self {
        Self::new(code, Modifiers::SUPER)
    }

    /// A combo with Alt held.
    #[must_use]
    pub const fn alt(code: KeyCode) -> Self {
        Self::new(code, Modifiers::ALT)
    }

    /// True when `code` was pressed with no modifiers.
    #[must_use]
    pub fn is_plain(&self, code: KeyCode) -> bool {
        self.modifiers.is_empty() && self.code == KeyCode::plain_normalized(code)
    }

    /// Parse a combo such as `"Shift+Tab"`, `"Ctrl+A"` or `"ArrowDown"`.
    pub fn parse(input: &str) -> Result<Self, KeyParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(KeyParseError::Empty);
        }

        let (mods_part, key_part) = if trimmed == "+" {
            ("", "+")
        } else if let Some(stripped) = trimmed.strip_suffix("++") {
            (stripped, "+")
        } else {
            match trimmed.rfind('+') {
                Some(idx) => (&trimmed[..idx], &trimmed[idx + 1..]),
                None => ("", trimmed),
            }
        };

        if key_part.is_empty() {
            return Err(KeyParseError::MissingKey(trimmed.to_string()));
        }

        let mut modifiers = Modifiers::NONE;
        for name in mods_part.split('+').filter(|part| !part.is_empty()) {
            modifiers |= parse_modifier(name)?;
        }

        Ok(Self::new(parse_key(key_part)?, modifiers))
    }
}

impl KeyCode {
    const fn plain_normalized(code: KeyCode) -> KeyCode {
        match code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        }
    }
}

fn parse_modifier(name: &str) -> Result<Modifiers, KeyParseError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "shift" => Ok(Modifiers::SHIFT),
        "alt" | "option" | "opt" => Ok(Modifiers::ALT),
        "ctrl" | "control" => Ok(Modifiers::CTRL),
        "meta" | "cmd" | "command" | "super" | "win" => Ok(Modifiers::SUPER),
        _ => Err(KeyParseError::UnknownModifier(name.to_string())),
    }
}

fn parse_key(name: &str) -> Result<KeyCode, KeyParseError> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    let code = match name.to_ascii_lowercase().as_str() {
        "enter" | "return" => KeyCode::Enter,
        "escape" | "esc" => KeyCode::Escape,
        "backspace" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "delete" | "del" => KeyCode::Delete,
        "insert" | "ins" => KeyCode::Insert,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "arrowup" | "up" => KeyCode::Up,
        "arrowdown" | "down" => KeyCode::Down,
        "arrowleft" | "left" => KeyCode::Left,
        "arrowright" | "right" => KeyCode::Right,
        "space" | "spacebar" => KeyCode::SPACE,
        "plus" => KeyCode::Char('+'),
        lower => {
            let function = lower
                .strip_prefix('f')
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|n| (1..=24).contains(n));
            match function {
                Some(n) => KeyCode::F(n),
                None => return Err(KeyParseError::UnknownKey(name.to_string())),
            }
        }
    };
    Ok(code)
}

impl FromStr for KeyCombo {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(Modifiers::CTRL) {
            f.write_str("Ctrl+")?;
        }
        if self.modifiers.contains(Modifiers::ALT) {
            f.write_str("Alt+")?;
        }
        if self.modifiers.contains(Modifiers::SHIFT) {
            f.write_str("Shift+")?;
        }
        if self.modifiers.contains(Modifiers::SUPER) {
            f.write_str("Meta+")?;
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("Space"),
            KeyCode::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            KeyCode::Enter => f.write_str("Enter"),
            KeyCode::Escape => f.write_str("Escape"),
            KeyCode::Backspace => f.write_str("Backspace"),
            KeyCode::Tab | KeyCode::BackTab => f.write_str("Tab"),
            KeyCode::Delete => f.write_str("Delete"),
            KeyCode::Insert => f.write_str("Insert"),
            KeyCode::Home => f.write_str("Home"),
            KeyCode::End => f.write_str("End"),
            KeyCode::PageUp => f.write_str("PageUp"),
            KeyCode::PageDown => f.write_str("PageDown"),
            KeyCode::Up => f.write_str("ArrowUp"),
            KeyCode::Down => f.write_str("ArrowDown"),
            KeyCode::Left => f.write_str("ArrowLeft"),
            KeyCode::Right => f.write_str("ArrowRight"),
            KeyCode::F(n) => write!(f, "F{n}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Keyboard
// ---------------------------------------------------------------------------

/// What kind of editable surface, if any, holds host focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditableTarget {
    /// A field registered in the field registry under this item id.
    Registered(ItemId),
    /// An editable surface the registry knows nothing about.
    Unregistered,
}

/// Snapshot of one key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardInput {
    /// The normalized key combo.
    pub combo: KeyCombo,
    /// An IME composition session is active.
    pub is_composing: bool,
    /// Another handler already consumed the event.
    pub consumed: bool,
    /// Host focus sits inside a surface the resolver must leave alone
    /// (inspector panels, combobox popups).
    pub excluded_surface: bool,
    /// Editable surface holding host focus.
    pub editable_target: Option<EditableTarget>,
}

impl KeyboardInput {
    /// Create a key press with no guard flags set.
    #[must_use]
    pub const fn new(combo: KeyCombo) -> Self {
        Self {
            combo,
            is_composing: false,
            consumed: false,
            excluded_surface: false,
            editable_target: None,
        }
    }

    /// Parse the combo from a string such as `"Shift+ArrowDown"`.
    pub fn parse(combo: &str) -> Result<Self, KeyParseError> {
        KeyCombo::parse(combo).map(Self::new)
    }

    /// Mark the press as part of an IME composition.
    #[must_use]
    pub const fn composing(mut self) -> Self {
        self.is_composing = true;
        self
    }

    /// Mark the press as already consumed upstream.
    #[must_use]
    pub const fn already_consumed(mut self) -> Self {
        self.consumed = true;
        self
    }

    /// Mark the press as originating inside an excluded surface.
    #[must_use]
    pub const fn in_excluded_surface(mut self) -> Self {
        self.excluded_surface = true;
        self
    }

    /// Attach the editable surface that holds host focus.
    #[must_use]
    pub fn with_editable_target(mut self, target: EditableTarget) -> Self {
        self.editable_target = Some(target);
        self
    }
}

// ---------------------------------------------------------------------------
// Mouse
// ---------------------------------------------------------------------------

/// Mouse button identifiers. `Left` is the primary button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    /// Left (primary) mouse button.
    #[default]
    Left,

    /// Right mouse button.
    Right,

    /// Middle mouse button (scroll wheel click).
    Middle,
}

impl MouseButton {
    /// True for the primary button.
    #[must_use]
    pub const fn is_primary(self) -> bool {
        matches!(self, Self::Left)
    }
}

/// Snapshot of the press phase of a click (mousedown).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MouseInput {
    /// Zone under the pointer.
    pub zone: Option<ZoneId>,
    /// Item under the pointer.
    pub item: Option<ItemId>,
    pub button: MouseButton,
    pub modifiers: Modifiers,
    /// A `<label>`-style element redirected the click to another target.
    pub label_redirect: bool,
    /// The target declares expandability.
    pub expandable: bool,
    /// Role the target declares.
    pub role: Option<ItemRole>,
}

impl MouseInput {
    /// Press on an item inside a zone.
    #[must_use]
    pub fn on_item(zone: impl Into<ZoneId>, item: impl Into<ItemId>) -> Self {
        Self {
            zone: Some(zone.into()),
            item: Some(item.into()),
            ..Self::default()
        }
    }

    /// Press on a zone's background (no item).
    #[must_use]
    pub fn on_zone(zone: impl Into<ZoneId>) -> Self {
        Self {
            zone: Some(zone.into()),
            ..Self::default()
        }
    }

    /// Press outside any zone.
    #[must_use]
    pub fn outside() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    #[must_use]
    pub const fn with_role(mut self, role: ItemRole) -> Self {
        self.role = Some(role);
        self
    }

    #[must_use]
    pub const fn expandable(mut self, expandable: bool) -> Self {
        self.expandable = expandable;
        self
    }

    #[must_use]
    pub const fn label_redirected(mut self) -> Self {
        self.label_redirect = true;
        self
    }
}

/// Focus facts captured when the click sequence began, before the press
/// phase was dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PriorFocus {
    /// Item focused in the target zone before the press.
    pub focused: Option<ItemId>,
    /// Item being edited (any zone) before the press.
    pub editing: Option<ItemId>,
}

impl PriorFocus {
    /// Capture prior focus for `zone` from a store snapshot.
    ///
    /// A zone that is not active has no focused item, even if it still
    /// remembers one from before focus left it.
    #[must_use]
    pub fn capture(store: &FocusStore, zone: &ZoneId) -> Self {
        Self {
            focused: store
                .zone(zone)
                .filter(|_| store.active_zone() == Some(zone))
                .and_then(|state| state.focused_item_id.clone()),
            editing: store.editing().map(|(_, item)| item.clone()),
        }
    }
}

/// Snapshot of the click phase (after mouseup on the same target).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClickInput {
    pub zone: Option<ZoneId>,
    pub item: Option<ItemId>,
    pub modifiers: Modifiers,
    /// Target is marked as the current page/route.
    pub current_page: bool,
    /// Target is an editable item.
    pub editable: bool,
    /// The target declares expandability.
    pub expandable: bool,
    pub role: Option<ItemRole>,
    pub prior: PriorFocus,
}

impl ClickInput {
    /// Click on an item inside a zone.
    #[must_use]
    pub fn on_item(zone: impl Into<ZoneId>, item: impl Into<ItemId>) -> Self {
        Self {
            zone: Some(zone.into()),
            item: Some(item.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_prior(mut self, prior: PriorFocus) -> Self {
        self.prior = prior;
        self
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn current_page(mut self) -> Self {
        self.current_page = true;
        self
    }

    #[must_use]
    pub const fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    #[must_use]
    pub const fn expandable(mut self, expandable: bool) -> Self {
        self.expandable = expandable;
        self
    }

    #[must_use]
    pub const fn with_role(mut self, role: ItemRole) -> Self {
        self.role = Some(role);
        self
    }
}

// ---------------------------------------------------------------------------
// Pointer
// ---------------------------------------------------------------------------

/// Snapshot of one pointer event (down, move or up).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointerInput {
    pub x: f64,
    pub y: f64,
    pub button: MouseButton,
    pub zone: Option<ZoneId>,
    pub item: Option<ItemId>,
    /// The target declared a drag handle.
    pub drag_handle: bool,
}

impl PointerInput {
    /// Pointer at a position with no identified target.
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn over_item(mut self, zone: impl Into<ZoneId>, item: impl Into<ItemId>) -> Self {
        self.zone = Some(zone.into());
        self.item = Some(item.into());
        self
    }

    #[must_use]
    pub fn over_zone(mut self, zone: impl Into<ZoneId>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    #[must_use]
    pub const fn with_drag_handle(mut self) -> Self {
        self.drag_handle = true;
        self
    }

    #[must_use]
    pub const fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    /// True when the pointer carries an item or zone identity.
    #[must_use]
    pub fn has_identity(&self) -> bool {
        self.item.is_some() || self.zone.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_tab_normalizes_to_shift_tab() {
        let combo = KeyCombo::plain(KeyCode::BackTab);
        assert_eq!(combo, KeyCombo::shift(KeyCode::Tab));
    }

    #[test]
    fn letters_normalize_to_lowercase() {
        let sensed = KeyCombo::new(KeyCode::Char('A'), Modifiers::SHIFT);
        assert_eq!(sensed, KeyCombo::parse("Shift+A").unwrap());
    }

    #[test]
    fn parse_named_keys() {
        assert_eq!(
            KeyCombo::parse("ArrowDown").unwrap(),
            KeyCombo::plain(KeyCode::Down)
        );
        assert_eq!(
            KeyCombo::parse("Space").unwrap(),
            KeyCombo::plain(KeyCode::SPACE)
        );
        assert_eq!(
            KeyCombo::parse("f2").unwrap(),
            KeyCombo::plain(KeyCode::F(2))
        );
        assert_eq!(
            KeyCombo::parse("Cmd+Shift+z").unwrap(),
            KeyCombo::new(KeyCode::Char('z'), Modifiers::SUPER | Modifiers::SHIFT)
        );
    }

    #[test]
    fn parse_plus_key() {
        assert_eq!(
            KeyCombo::parse("Ctrl++").unwrap(),
            KeyCombo::ctrl(KeyCode::Char('+'))
        );
        assert_eq!(KeyCombo::parse("+").unwrap(), KeyCombo::plain(KeyCode::Char('+')));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(KeyCombo::parse("  "), Err(KeyParseError::Empty));
        assert!(matches!(
            KeyCombo::parse("Ctrl+"),
            Err(KeyParseError::MissingKey(_))
        ));
        assert!(matches!(
            KeyCombo::parse("Hyper+A"),
            Err(KeyParseError::UnknownModifier(_))
        ));
        assert!(matches!(
            KeyCombo::parse("Banana"),
            Err(KeyParseError::UnknownKey(_))
        ));
        assert!(matches!(
            KeyCombo::parse("F25"),
            Err(KeyParseError::UnknownKey(_))
        ));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for text in ["Shift+Tab", "Ctrl+A", "ArrowDown", "Space", "Alt+ArrowUp", "Meta+F2"] {
            let combo = KeyCombo::parse(text).unwrap();
            assert_eq!(combo.to_string(), text);
        }
    }

    #[test]
    fn is_plain_ignores_case() {
        let combo = KeyCombo::plain(KeyCode::Char('a'));
        assert!(combo.is_plain(KeyCode::Char('A')));
        assert!(!KeyCombo::ctrl(KeyCode::Char('a')).is_plain(KeyCode::Char('a')));
    }

    #[test]
    fn prior_focus_ignores_inactive_zone() {
        let mut store = FocusStore::new();
        let list = ZoneId::from("list");
        store.zone_mut(&list).focused_item_id = Some("apple".into());
        store.set_active_zone(Some(list.clone()));
        assert_eq!(
            PriorFocus::capture(&store, &list).focused,
            Some(ItemId::from("apple"))
        );

        store.set_active_zone(Some("tools".into()));
        assert_eq!(PriorFocus::capture(&store, &list), PriorFocus::default());
    }

    #[test]
    fn pointer_identity() {
        assert!(!PointerInput::at(0.0, 0.0).has_identity());
        assert!(PointerInput::at(0.0, 0.0).over_zone("z").has_identity());
    }
}
