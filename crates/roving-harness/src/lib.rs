#![forbid(unsafe_code)]

//! No-render test harness for `roving-core`.
//!
//! # Role
//! The core only resolves input into commands. This crate supplies the
//! pieces a host would: a reference [`Dispatcher`] that applies command
//! batches to an in-memory store, a [`ReentryGuard`] that keeps
//! program-driven focus from echoing back as user input, a
//! [`SnapshotHistory`] for undo/redo, and a [`Page`] that scripts clicks,
//! key presses and drags and records a JSONL [`Trace`].
//!
//! Two runs of the same script over the same registries must produce the
//! same trace digest; the integration tests rely on that to prove the
//! resolvers carry no hidden state.

pub mod dispatcher;
pub mod guard;
pub mod history;
pub mod page;
pub mod trace;

pub use dispatcher::{AppModel, Dispatcher, Snapshot};
pub use guard::{CauseId, FocusOrigin, ReentryGuard};
pub use history::SnapshotHistory;
pub use page::{ClickOptions, ClickOutcome, Page};
pub use trace::{Trace, TraceEntry};
