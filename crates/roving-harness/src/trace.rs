#![forbid(unsafe_code)]

//! JSONL interaction traces.
//!
//! Every input the page drives is recorded with the result it resolved to
//! and the focus it left behind. Two runs of the same script must produce
//! byte-identical traces; [`Trace::digest`] makes that cheap to compare.

use roving_core::{ResolveResult, ZoneId};
use serde_json::{Value, json};

/// One resolved input.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    pub seq: u64,
    /// Input kind: `key`, `press`, `click`, `pointer_up`, ...
    pub kind: &'static str,
    /// Human-readable input (`"Shift+Tab"`, an item id).
    pub input: String,
    /// Layer that answered, if any.
    pub layer: Option<&'static str>,
    pub commands: Vec<&'static str>,
    pub prevent_default: bool,
    pub fallback: bool,
    /// `zone/item` focused after dispatch.
    pub focused: Option<String>,
}

impl TraceEntry {
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "seq": self.seq,
            "kind": self.kind,
            "input": self.input,
            "layer": self.layer,
            "commands": self.commands,
            "prevent_default": self.prevent_default,
            "fallback": self.fallback,
            "focused": self.focused,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Trace {
    entries: Vec<TraceEntry>,
}

impl Trace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the outcome of one input.
    pub fn record(
        &mut self,
        kind: &'static str,
        input: impl Into<String>,
        result: &ResolveResult,
        focused: Option<(&ZoneId, &roving_core::ItemId)>,
    ) {
        let entry = TraceEntry {
            seq: self.entries.len() as u64,
            kind,
            input: input.into(),
            layer: result.meta.layer.map(|layer| layer.as_str()),
            commands: result.commands.iter().map(|c| c.name()).collect(),
            prevent_default: result.prevent_default,
            fallback: result.fallback,
            focused: focused.map(|(zone, item)| format!("{zone}/{item}")),
        };
        tracing::info!(
            seq = entry.seq,
            kind,
            input = %entry.input,
            layer = entry.layer,
            commands = entry.commands.len(),
            "trace"
        );
        self.entries.push(entry);
    }

    #[must_use]
    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One JSON object per line, newline-terminated.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.to_json().to_string());
            out.push('\n');
        }
        out
    }

    /// `blake3:<hex>` digest of [`to_jsonl`](Self::to_jsonl).
    #[must_use]
    pub fn digest(&self) -> String {
        let hash = blake3::hash(self.to_jsonl().as_bytes());
        format!("blake3:{}", hash.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roving_core::{Command, ResolveLayer};

    fn focus_result() -> ResolveResult {
        ResolveResult::handled(
            ResolveLayer::Zone,
            vec![Command::Focus {
                zone: "fruit".into(),
                item: "banana".into(),
            }],
        )
    }

    #[test]
    fn jsonl_lines_parse() {
        let mut trace = Trace::new();
        let zone = ZoneId::from("fruit");
        let item = roving_core::ItemId::from("banana");
        trace.record("key", "ArrowDown", &focus_result(), Some((&zone, &item)));
        trace.record("key", "F7", &ResolveResult::fallback(), Some((&zone, &item)));

        let jsonl = trace.to_jsonl();
        let lines: Vec<&str> = jsonl.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["seq"], 0);
        assert_eq!(first["layer"], "zone");
        assert_eq!(first["commands"][0], "focus");
        assert_eq!(first["focused"], "fruit/banana");

        let second: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["fallback"], true);
        assert!(second["layer"].is_null());
    }

    #[test]
    fn digest_is_stable_and_content_sensitive() {
        let mut a = Trace::new();
        let mut b = Trace::new();
        a.record("key", "ArrowDown", &focus_result(), None);
        b.record("key", "ArrowDown", &focus_result(), None);
        assert_eq!(a.digest(), b.digest());
        assert!(a.digest().starts_with("blake3:"));

        b.record("key", "F7", &ResolveResult::fallback(), None);
        assert_ne!(a.digest(), b.digest());
    }
}
