//! Clipboard contract and payload format.
//!
//! Copy writes a JSON array of tagged records under the editor's own
//! format tag; paste reads it back. The clipboard itself is an injected
//! collaborator so hosts can bridge to the system clipboard.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use lattice_core::SerializedNode;

use crate::error::{EditError, EditResult};

/// Format tag for scene-object payloads.
pub const CLIPBOARD_FORMAT: &str = "lattice/game-objects";

pub trait Clipboard {
    fn write(&self, text: String, format: &str);
    fn read(&self, format: &str) -> Option<String>;
}

/// One copied object subtree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipboardEntry {
    /// Always `"gameObject"` for entries produced here; unknown kinds
    /// are rejected on paste.
    pub kind: String,
    #[serde(rename = "serializedData")]
    pub serialized_data: SerializedNode,
}

impl ClipboardEntry {
    pub fn game_object(node: SerializedNode) -> Self {
        Self {
            kind: "gameObject".to_owned(),
            serialized_data: node,
        }
    }
}

/// Encodes copied subtrees as the clipboard JSON payload.
pub fn encode_payload(nodes: &[SerializedNode]) -> EditResult<String> {
    let entries: Vec<ClipboardEntry> = nodes
        .iter()
        .cloned()
        .map(ClipboardEntry::game_object)
        .collect();
    serde_json::to_string(&entries).map_err(|e| EditError::Clipboard(e.to_string()))
}

/// Decodes a clipboard JSON payload back into subtree snapshots.
pub fn decode_payload(text: &str) -> EditResult<Vec<SerializedNode>> {
    let entries: Vec<ClipboardEntry> =
        serde_json::from_str(text).map_err(|e| EditError::Clipboard(e.to_string()))?;
    entries
        .into_iter()
        .map(|entry| {
            if entry.kind == "gameObject" {
                Ok(entry.serialized_data)
            } else {
                Err(EditError::Clipboard(format!(
                    "unknown entry kind: {}",
                    entry.kind
                )))
            }
        })
        .collect()
}

/// In-process clipboard keyed by format tag.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for MemoryClipboard {
    fn write(&self, text: String, format: &str) {
        self.slots.lock().unwrap().insert(format.to_owned(), text);
    }

    fn read(&self, format: &str) -> Option<String> {
        self.slots.lock().unwrap().get(format).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_core::{Scene, snapshot_node};

    #[test]
    fn payload_round_trips_through_json() {
        let mut scene = Scene::new();
        let root = scene.spawn("copied");
        let child = scene.spawn("child");
        scene.insert_at(child, Some(root), 0).unwrap();
        let snap = snapshot_node(&scene, root).unwrap();

        let text = encode_payload(&[snap.clone()]).unwrap();
        let decoded = decode_payload(&text).unwrap();
        assert_eq!(decoded, vec![snap]);
    }

    #[test]
    fn payload_entries_carry_the_kind_tag() {
        let mut scene = Scene::new();
        let root = scene.spawn("obj");
        let snap = snapshot_node(&scene, root).unwrap();
        let text = encode_payload(&[snap]).unwrap();
        assert!(text.contains("\"kind\":\"gameObject\""));
        assert!(text.contains("\"serializedData\""));
    }

    #[test]
    fn malformed_payload_is_a_clipboard_error() {
        assert!(matches!(
            decode_payload("not json"),
            Err(EditError::Clipboard(_))
        ));
        assert!(matches!(
            decode_payload(r#"[{"kind":"image","serializedData":null}]"#),
            Err(EditError::Clipboard(_))
        ));
    }

    #[test]
    fn memory_clipboard_is_keyed_by_format() {
        let clipboard = MemoryClipboard::new();
        clipboard.write("abc".into(), CLIPBOARD_FORMAT);
        assert_eq!(clipboard.read(CLIPBOARD_FORMAT), Some("abc".into()));
        assert_eq!(clipboard.read("text/plain"), None);
    }
}
