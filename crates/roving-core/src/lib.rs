#![forbid(unsafe_code)]

//! Core: pure input resolution for roving-focus zones.
//!
//! # Role
//! `roving-core` turns keyboard, mouse and pointer events into ordered lists
//! of [`Command`]s. It never mutates state: every resolver reads a
//! [`ResolveContext`] (zone registry, field registry, focus store, global
//! keymap) and returns a [`ResolveResult`]. A dispatcher applies the commands.
//!
//! # Primary responsibilities
//! - **Keyboard**: a responder chain (Guard, Field, Item, Zone) where the
//!   first layer to claim a key wins, plus global bindings.
//! - **Field ownership**: which keys an editing field keeps and which it
//!   hands back to navigation, per [`FieldType`].
//! - **Mouse**: the press phase (focus and selection) and the click phase
//!   (activation) resolved separately.
//! - **Gestures**: the idle/pending/drag state machine that separates clicks
//!   from drags.
//! - **State**: per-zone focus, selection, expansion and editing.
//!
//! # Example
//! ```
//! use roving_core::{
//!     Command, FieldRegistry, FocusStore, KeyboardInput, Keymap, ResolveContext, ZoneEntry,
//!     ZoneRegistry, ZoneRole, resolve_keyboard,
//! };
//!
//! let mut zones = ZoneRegistry::new();
//! zones.register(ZoneEntry::new("fruit", ZoneRole::Listbox).with_items(["apple", "banana"]));
//!
//! let mut store = FocusStore::new();
//! store.set_active_zone(Some("fruit".into()));
//! store.zone_mut(&"fruit".into()).focused_item_id = Some("apple".into());
//!
//! let fields = FieldRegistry::new();
//! let keymap = Keymap::defaults();
//! let ctx = ResolveContext::new(&zones, &fields, &store, &keymap);
//!
//! let result = resolve_keyboard(&KeyboardInput::parse("ArrowDown").unwrap(), &ctx);
//! assert!(result.prevent_default);
//! assert!(matches!(&result.commands[0], Command::Focus { item, .. } if item == "banana"));
//! ```

pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod field;
pub mod gesture;
pub mod id;
pub mod item;
pub mod keyboard;
pub mod keymap;
pub mod logging;
pub mod mouse;
pub mod navigate;
pub mod registry;
pub mod state;

pub use command::{
    Command, ExpandAction, ResolveLayer, ResolveMeta, ResolveResult, SelectMode, TabDirection,
};
pub use config::{KeymapEntry, ResolverConfig};
pub use context::ResolveContext;
pub use error::{ConfigError, Error, KeyParseError, Result};
pub use event::{
    ClickInput, EditableTarget, KeyCode, KeyCombo, KeyboardInput, Modifiers, MouseButton,
    MouseInput, PointerInput, PriorFocus,
};
pub use field::{FieldEntry, FieldRegistry, FieldType};
pub use gesture::{
    Gesture, GestureConfig, GestureRecognizer, GestureSignal, GestureState, pointer_down,
    pointer_move, pointer_up,
};
pub use id::{ItemId, ZoneId};
pub use keyboard::{ResponderChain, ResponderLayer, resolve_keyboard};
pub use keymap::{BindingScope, Cursor, KeyBinding, Keymap, When};
pub use mouse::{resolve_click, resolve_mouse};
pub use registry::{
    ActivatePolicy, DismissPolicy, EscapeBehavior, ItemEntry, ItemRole, NavigationOptions,
    Orientation, OutsideClickBehavior, ZoneConfig, ZoneEntry, ZoneRegistry, ZoneRole,
};
pub use state::{FocusStore, ZoneState};
