#![forbid(unsafe_code)]

//! Pointer gesture recognition: click versus drag on one pointer stream.
//!
//! A press can start either a click or a drag and both share the same first
//! event. The recognizer defers the decision until movement or release.
//!
//! # State Machine
//!
//! ```text
//!            down over item/zone            move > threshold
//! ┌──────┐ ─────────────────────▶ ┌─────────┐ (drag handle only) ┌──────┐
//! │ Idle │                        │ Pending │ ──────────────────▶│ Drag │
//! └──────┘ ◀───────────────────── └─────────┘                    └──────┘
//!     ▲           up: Click                                          │
//!     └──────────────────────────────────────────────────────────────┘
//!                              up: DragEnd
//! ```
//!
//! # Invariants
//!
//! 1. Only the primary button starts a gesture.
//! 2. A press with neither item nor zone identity leaves the machine idle.
//! 3. Escalation needs a declared drag handle and movement strictly beyond
//!    the threshold on either axis, measured from the press position.
//! 4. Every release returns the machine to `Idle`; Click and DragEnd never
//!    both fire for one press.
//!
//! The transition functions are pure. [`GestureRecognizer`] wraps them for
//! callers that want to own one state value.

use crate::event::PointerInput;
use crate::id::{ItemId, ZoneId};

/// Drag threshold in host pixels.
pub const DEFAULT_DRAG_THRESHOLD_PX: f64 = 5.0;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Facts captured at press time.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureTrack {
    pub start_x: f64,
    pub start_y: f64,
    pub item: Option<ItemId>,
    pub zone: Option<ZoneId>,
    pub has_drag_handle: bool,
}

/// The single gesture state value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Pending(GestureTrack),
    Drag(GestureTrack),
}

impl GestureState {
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self, Self::Drag(_))
    }

    /// Press-time facts of an active gesture.
    #[must_use]
    pub const fn track(&self) -> Option<&GestureTrack> {
        match self {
            Self::Idle => None,
            Self::Pending(track) | Self::Drag(track) => Some(track),
        }
    }

    #[must_use]
    pub const fn phase(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending(_) => "pending",
            Self::Drag(_) => "drag",
        }
    }
}

/// What a release produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture {
    None,
    Click {
        zone: Option<ZoneId>,
        item: Option<ItemId>,
    },
    DragEnd {
        zone: Option<ZoneId>,
        item: Option<ItemId>,
    },
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Press. Starts a pending gesture over an identified target.
#[must_use]
pub fn pointer_down(state: GestureState, input: &PointerInput) -> GestureState {
    if !input.button.is_primary() {
        return state;
    }
    if !input.has_identity() {
        return GestureState::Idle;
    }
    GestureState::Pending(GestureTrack {
        start_x: input.x,
        start_y: input.y,
        item: input.item.clone(),
        zone: input.zone.clone(),
        has_drag_handle: input.drag_handle,
    })
}

/// Movement. Escalates a pending gesture to a drag past `threshold`.
#[must_use]
pub fn pointer_move(state: GestureState, input: &PointerInput, threshold: f64) -> GestureState {
    match state {
        GestureState::Pending(track) if track.has_drag_handle && exceeds(&track, input, threshold) => {
            GestureState::Drag(track)
        }
        other => other,
    }
}

/// Release. Always returns to `Idle`.
#[must_use]
pub fn pointer_up(state: GestureState) -> (Gesture, GestureState) {
    let gesture = match state {
        GestureState::Idle => Gesture::None,
        GestureState::Pending(track) => Gesture::Click {
            zone: track.zone,
            item: track.item,
        },
        GestureState::Drag(track) => Gesture::DragEnd {
            zone: track.zone,
            item: track.item,
        },
    };
    (gesture, GestureState::Idle)
}

fn exceeds(track: &GestureTrack, input: &PointerInput, threshold: f64) -> bool {
    (input.x - track.start_x).abs() > threshold || (input.y - track.start_y).abs() > threshold
}

// ---------------------------------------------------------------------------
// GestureRecognizer
// ---------------------------------------------------------------------------

/// Recognizer configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Movement beyond this many pixels on either axis starts a drag.
    pub drag_threshold_px: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: DEFAULT_DRAG_THRESHOLD_PX,
        }
    }
}

/// Feedback emitted while the pointer moves.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureSignal {
    /// The pending gesture just became a drag.
    DragStart {
        zone: Option<ZoneId>,
        item: Option<ItemId>,
    },
    /// The drag moved over a (possibly different) target.
    DragOver {
        x: f64,
        y: f64,
        zone: Option<ZoneId>,
        item: Option<ItemId>,
    },
}

/// Owns one [`GestureState`] and drives it through the pure transitions.
#[derive(Debug, Clone, Default)]
pub struct GestureRecognizer {
    config: GestureConfig,
    state: GestureState,
}

impl GestureRecognizer {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: GestureState::Idle,
        }
    }

    #[must_use]
    pub fn state(&self) -> &GestureState {
        &self.state
    }

    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GestureConfig) {
        self.config = config;
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.state.is_dragging()
    }

    pub fn down(&mut self, input: &PointerInput) {
        self.state = pointer_down(std::mem::take(&mut self.state), input);
        self.trace("down");
    }

    /// Feed a move; reports drag start and drag-over feedback.
    pub fn move_to(&mut self, input: &PointerInput) -> Option<GestureSignal> {
        let was_dragging = self.state.is_dragging();
        self.state = pointer_move(
            std::mem::take(&mut self.state),
            input,
            self.config.drag_threshold_px,
        );
        match (&self.state, was_dragging) {
            (GestureState::Drag(track), false) => {
                self.trace("drag_start");
                Some(GestureSignal::DragStart {
                    zone: track.zone.clone(),
                    item: track.item.clone(),
                })
            }
            (GestureState::Drag(_), true) => Some(GestureSignal::DragOver {
                x: input.x,
                y: input.y,
                zone: input.zone.clone(),
                item: input.item.clone(),
            }),
            _ => None,
        }
    }

    pub fn up(&mut self) -> Gesture {
        let (gesture, state) = pointer_up(std::mem::take(&mut self.state));
        self.state = state;
        self.trace("up");
        gesture
    }

    /// Abandon any gesture without emitting anything (focus loss).
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }

    #[cfg(feature = "tracing")]
    fn trace(&self, transition: &'static str) {
        tracing::trace!(transition, phase = self.state.phase(), "gesture transition");
    }

    #[cfg(not(feature = "tracing"))]
    fn trace(&self, _transition: &'static str) {}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
