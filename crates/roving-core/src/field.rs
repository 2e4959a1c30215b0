#![forbid(unsafe_code)]

//! Editable fields and the key-ownership policy.
//!
//! While a field holds keyboard input it absorbs every key except a small
//! allow-list it delegates back to the responder chain:
//!
//! | Field type | Delegated keys |
//! |------------|----------------|
//! | `inline`   | Tab, Shift+Tab, ArrowUp, ArrowDown, Shift+ArrowUp, Shift+ArrowDown |
//! | `tokens`   | same as `inline` |
//! | `block`    | Tab |
//! | `editor`   | nothing |
//!
//! Editable surfaces that are not registered absorb all keys.

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;

use crate::command::Command;
use crate::event::{KeyCode, KeyCombo, Modifiers};
use crate::id::{ItemId, ZoneId};

/// Kind of editable surface. Governs delegation and commit keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Single-line text.
    Inline,
    /// Token/chip input.
    Tokens,
    /// Multi-line plain text.
    Block,
    /// Rich editor that owns every key.
    Editor,
}

const LINE_DELEGATED: &[KeyCombo] = &[
    KeyCombo {
        code: KeyCode::Tab,
        modifiers: Modifiers::NONE,
    },
    KeyCombo {
        code: KeyCode::Tab,
        modifiers: Modifiers::SHIFT,
    },
    KeyCombo {
        code: KeyCode::Up,
        modifiers: Modifiers::NONE,
    },
    KeyCombo {
        code: KeyCode::Down,
        modifiers: Modifiers::NONE,
    },
    KeyCombo {
        code: KeyCode::Up,
        modifiers: Modifiers::SHIFT,
    },
    KeyCombo {
        code: KeyCode::Down,
        modifiers: Modifiers::SHIFT,
    },
];

const BLOCK_DELEGATED: &[KeyCombo] = &[KeyCombo {
    code: KeyCode::Tab,
    modifiers: Modifiers::NONE,
}];

impl FieldType {
    /// Keys this field type hands back to the responder chain.
    #[must_use]
    pub const fn delegated_keys(self) -> &'static [KeyCombo] {
        match self {
            Self::Inline | Self::Tokens => LINE_DELEGATED,
            Self::Block => BLOCK_DELEGATED,
            Self::Editor => &[],
        }
    }

    /// True when `key` commits the field.
    ///
    /// Single-line fields commit on Enter. Multi-line fields keep Enter for
    /// newlines and commit on Ctrl+Enter or Meta+Enter.
    #[must_use]
    pub fn commits_on(self, key: &KeyCombo) -> bool {
        if key.code != KeyCode::Enter {
            return false;
        }
        match self {
            Self::Inline | Self::Tokens => key.modifiers.is_empty(),
            Self::Block | Self::Editor => {
                key.modifiers == Modifiers::CTRL || key.modifiers == Modifiers::SUPER
            }
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Tokens => "tokens",
            Self::Block => "block",
            Self::Editor => "editor",
        }
    }
}

/// True when a field of `field_type` delegates `key` to the lower layers.
#[must_use]
pub fn is_delegated(key: &KeyCombo, field_type: FieldType) -> bool {
    field_type.delegated_keys().contains(key)
}

/// Delegation for a surface that may not be registered. Unregistered
/// surfaces (`None`) delegate nothing.
#[must_use]
pub fn is_delegated_for(key: &KeyCombo, field_type: Option<FieldType>) -> bool {
    field_type.is_some_and(|ty| is_delegated(key, ty))
}

/// Builds commit/cancel commands from the field's current contents.
pub type FieldCommandFactory = Arc<dyn Fn(&FieldEntry) -> Vec<Command> + Send + Sync>;

/// One registered editable field.
#[derive(Clone)]
pub struct FieldEntry {
    /// Zone owning the item that hosts the field.
    pub zone: ZoneId,
    /// Item hosting the field; also the registry key.
    pub id: ItemId,
    pub field_type: FieldType,
    pub value: String,
    /// Caret offset in characters.
    pub caret: usize,
    pub error: Option<String>,
    on_commit: Option<FieldCommandFactory>,
    on_cancel: Option<FieldCommandFactory>,
}

impl fmt::Debug for FieldEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldEntry")
            .field("zone", &self.zone)
            .field("id", &self.id)
            .field("field_type", &self.field_type)
            .field("value", &self.value)
            .field("caret", &self.caret)
            .field("error", &self.error)
            .field("on_commit", &self.on_commit.is_some())
            .field("on_cancel", &self.on_cancel.is_some())
            .finish()
    }
}

impl FieldEntry {
    #[must_use]
    pub fn new(zone: impl Into<ZoneId>, id: impl Into<ItemId>, field_type: FieldType) -> Self {
        Self {
            zone: zone.into(),
            id: id.into(),
            field_type,
            value: String::new(),
            caret: 0,
            error: None,
            on_commit: None,
            on_cancel: None,
        }
    }

    /// Set the initial value; the caret goes to the end.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self.caret = self.value.chars().count();
        self
    }

    #[must_use]
    pub fn on_commit(mut self, f: impl Fn(&FieldEntry) -> Vec<Command> + Send + Sync + 'static) -> Self {
        self.on_commit = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_cancel(mut self, f: impl Fn(&FieldEntry) -> Vec<Command> + Send + Sync + 'static) -> Self {
        self.on_cancel = Some(Arc::new(f));
        self
    }

    /// Commands for committing the current value.
    #[must_use]
    pub fn commit_commands(&self) -> Vec<Command> {
        match &self.on_commit {
            Some(factory) => factory(self),
            None => vec![Command::CommitEdit {
                zone: self.zone.clone(),
                item: self.id.clone(),
                value: self.value.clone(),
            }],
        }
    }

    /// Commands for abandoning the edit.
    #[must_use]
    pub fn cancel_commands(&self) -> Vec<Command> {
        match &self.on_cancel {
            Some(factory) => factory(self),
            None => vec![Command::CancelEdit {
                zone: self.zone.clone(),
                item: self.id.clone(),
            }],
        }
    }

    /// Commands the field itself defines for `key`, if any.
    #[must_use]
    pub fn key_commands(&self, key: &KeyCombo) -> Option<Vec<Command>> {
        if key.is_plain(KeyCode::Escape) {
            Some(self.cancel_commands())
        } else if self.field_type.commits_on(key) {
            Some(self.commit_commands())
        } else {
            None
        }
    }
}

/// All mounted fields, keyed by hosting item.
///
/// Besides registration the only mutators are the caret/value bridge used
/// while editing.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: AHashMap<ItemId, FieldEntry>,
}

impl FieldRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, field: FieldEntry) {
        self.fields.insert(field.id.clone(), field);
    }

    pub fn unregister(&mut self, id: &ItemId) -> Option<FieldEntry> {
        self.fields.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&FieldEntry> {
        self.fields.get(id)
    }

    #[must_use]
    pub fn field_type(&self, id: &ItemId) -> Option<FieldType> {
        self.fields.get(id).map(|field| field.field_type)
    }

    /// Replace the value. The caret is clamped to the new length.
    /// Returns false for unknown fields.
    pub fn set_value(&mut self, id: &ItemId, value: impl Into<String>) -> bool {
        let Some(field) = self.fields.get_mut(id) else {
            return false;
        };
        field.value = value.into();
        field.caret = field.caret.min(field.value.chars().count());
        true
    }

    /// Move the caret, clamped to the value length.
    pub fn set_caret(&mut self, id: &ItemId, caret: usize) -> bool {
        let Some(field) = self.fields.get_mut(id) else {
            return false;
        };
        field.caret = caret.min(field.value.chars().count());
        true
    }

    /// Insert text at the caret and advance it.
    pub fn insert_at_caret(&mut self, id: &ItemId, text: &str) -> bool {
        let Some(field) = self.fields.get_mut(id) else {
            return false;
        };
        let byte_idx = field
            .value
            .char_indices()
            .nth(field.caret)
            .map_or(field.value.len(), |(idx, _)| idx);
        field.value.insert_str(byte_idx, text);
        field.caret += text.chars().count();
        true
    }

    pub fn set_error(&mut self, id: &ItemId, error: Option<String>) -> bool {
        let Some(field) = self.fields.get_mut(id) else {
            return false;
        };
        field.error = error;
        true
    }
}
