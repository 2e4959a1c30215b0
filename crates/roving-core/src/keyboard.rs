#![forbid(unsafe_code)]

//! Keyboard responder chain.
//!
//! A key press is offered to an ordered list of named layers. Each layer
//! either claims the press by returning a [`ResolveResult`] or passes it on by
//! returning `None`. The standard chain is:
//!
//! | Layer | Claims |
//! |-------|--------|
//! | Guard | IME composition, consumed events, excluded surfaces (no-op) |
//! | Field | every key an editing or focused field does not delegate |
//! | Item  | role contracts of the focused item (check, expand/collapse) |
//! | Zone  | zone, role and global keymap bindings |
//!
//! When no layer claims the press the result is a fallback and the host's
//! default behavior proceeds.
//!
//! Resolution is total and pure: the same input and the same context always
//! yield the same result.

use std::fmt;

use crate::command::{Command, ResolveLayer, ResolveResult};
use crate::context::ResolveContext;
use crate::event::{EditableTarget, KeyCode, KeyboardInput};
use crate::field::{self, FieldEntry};
use crate::item;
use crate::keymap::BindingScope;

/// Uniform layer signature.
pub type LayerFn = fn(&KeyboardInput, &ResolveContext<'_>) -> Option<ResolveResult>;

/// One named layer of the chain.
#[derive(Clone, Copy)]
pub struct ResponderLayer {
    pub name: ResolveLayer,
    pub resolve: LayerFn,
}

impl fmt::Debug for ResponderLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponderLayer")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl ResponderLayer {
    #[must_use]
    pub const fn new(name: ResolveLayer, resolve: LayerFn) -> Self {
        Self { name, resolve }
    }
}

/// Ordered responder layers; first claim wins.
#[derive(Debug, Clone)]
pub struct ResponderChain {
    layers: Vec<ResponderLayer>,
}

impl Default for ResponderChain {
    fn default() -> Self {
        Self::standard()
    }
}

impl ResponderChain {
    /// Guard, Field, Item, Zone.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            layers: vec![
                ResponderLayer::new(ResolveLayer::Guard, guard_layer),
                ResponderLayer::new(ResolveLayer::Field, field_layer),
                ResponderLayer::new(ResolveLayer::Item, item_layer),
                ResponderLayer::new(ResolveLayer::Zone, zone_layer),
            ],
        }
    }

    /// A chain with no layers; every press falls back.
    #[must_use]
    pub fn empty() -> Self {
        Self { layers: Vec::new() }
    }

    /// Append a layer at the lowest priority.
    #[must_use]
    pub fn with(mut self, layer: ResponderLayer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Drop every layer called `name`.
    #[must_use]
    pub fn without(mut self, name: ResolveLayer) -> Self {
        self.layers.retain(|layer| layer.name != name);
        self
    }

    #[must_use]
    pub fn layers(&self) -> &[ResponderLayer] {
        &self.layers
    }

    /// Offer `input` to each layer in order.
    #[must_use]
    pub fn resolve(&self, input: &KeyboardInput, ctx: &ResolveContext<'_>) -> ResolveResult {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "roving.keyboard",
            key = %input.combo,
            active_zone = ctx.store.active_zone().map(|zone| zone.as_str()),
            editing = ctx.editing().is_some()
        )
        .entered();

        for layer in &self.layers {
            if let Some(result) = (layer.resolve)(input, ctx) {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    layer = layer.name.as_str(),
                    commands = result.commands.len(),
                    prevent_default = result.prevent_default,
                    "key claimed"
                );
                return result.with_key(input.combo);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("key fell back");
        ResolveResult::fallback().with_key(input.combo)
    }
}

/// Resolve one key press with the standard chain.
#[must_use]
pub fn resolve_keyboard(input: &KeyboardInput, ctx: &ResolveContext<'_>) -> ResolveResult {
    ResponderChain::standard().resolve(input, ctx)
}

// ---------------------------------------------------------------------------
// Layers
// ---------------------------------------------------------------------------

/// Presses that belong to someone else entirely.
pub fn guard_layer(input: &KeyboardInput, _ctx: &ResolveContext<'_>) -> Option<ResolveResult> {
    (input.is_composing || input.consumed || input.excluded_surface)
        .then(|| ResolveResult::absorbed(ResolveLayer::Guard))
}

/// Field key ownership.
///
/// The field in charge is the one being edited, otherwise the editable
/// surface holding host focus. Enter and Escape never pass this layer while
/// a field is in charge.
pub fn field_layer(input: &KeyboardInput, ctx: &ResolveContext<'_>) -> Option<ResolveResult> {
    let key = &input.combo;
    let field: Option<&FieldEntry> = match (ctx.editing(), &input.editable_target) {
        (Some(item), _) => match ctx.fields.get(item) {
            Some(field) => Some(field),
            None => {
                // An edit session without a registered field can still end.
                if key.is_plain(KeyCode::Escape)
                    && let Some(cursor) = ctx.cursor()
                {
                    return Some(ResolveResult::handled(
                        ResolveLayer::Field,
                        vec![Command::CancelEdit {
                            zone: cursor.zone_id().clone(),
                            item: item.clone(),
                        }],
                    ));
                }
                None
            }
        },
        (None, Some(EditableTarget::Registered(id))) => ctx.fields.get(id),
        (None, Some(EditableTarget::Unregistered)) => None,
        (None, None) => return None,
    };

    let Some(field) = field else {
        return Some(ResolveResult::absorbed(ResolveLayer::Field));
    };

    if let Some(commands) = field.key_commands(key) {
        return Some(ResolveResult::handled(ResolveLayer::Field, commands));
    }
    if matches!(key.code, KeyCode::Enter | KeyCode::Escape) {
        return Some(ResolveResult::absorbed(ResolveLayer::Field));
    }
    if field::is_delegated(key, field.field_type) {
        return None;
    }
    Some(ResolveResult::absorbed(ResolveLayer::Field))
}

/// Role contracts of the logically focused item.
pub fn item_layer(input: &KeyboardInput, ctx: &ResolveContext<'_>) -> Option<ResolveResult> {
    if ctx.editing().is_some() || input.editable_target.is_some() {
        return None;
    }
    let cursor = ctx.cursor()?;
    item::role_commands(&cursor, &input.combo)
        .map(|commands| ResolveResult::handled(ResolveLayer::Item, commands))
}

/// Zone, role and global bindings.
pub fn zone_layer(input: &KeyboardInput, ctx: &ResolveContext<'_>) -> Option<ResolveResult> {
    let cursor = ctx.cursor();
    let editing = ctx.editing().is_some() || input.editable_target.is_some();
    let hit = ctx
        .keymap
        .lookup(ctx.active_zone(), cursor.as_ref(), &input.combo, editing)?;
    let layer = match hit.scope {
        BindingScope::Zone => ResolveLayer::Zone,
        BindingScope::Global => ResolveLayer::Global,
    };
    Some(ResolveResult::handled(layer, hit.commands))
}
