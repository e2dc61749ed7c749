use std::fmt;

use serde_json::Value;
use similar::TextDiff;

use objmatch_merge::is_empty_patch;

/// Everything one patch calculation produced.
///
/// `current` and `modified` are the documents actually compared, after
/// options and null pruning. `original` is the last-applied snapshot read
/// from the live object (`{}` if there was none).
#[derive(Clone, Debug)]
pub struct PatchResult<O> {
    /// The patch to send to the store; `{}` when nothing needs to change.
    pub patch: Vec<u8>,
    pub current: Vec<u8>,
    pub modified: Vec<u8>,
    pub original: Vec<u8>,
    /// The live object with the patch applied and a fresh last-applied
    /// annotation.
    pub patched: O,
    effective: Vec<u8>,
}

impl<O> PatchResult<O> {
    pub(crate) fn new(
        patch: Vec<u8>,
        current: Vec<u8>,
        modified: Vec<u8>,
        original: Vec<u8>,
        patched: O,
        effective: Vec<u8>,
    ) -> Self {
        Self {
            patch,
            current,
            modified,
            original,
            patched,
            effective,
        }
    }

    /// Returns `true` if applying the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        is_empty_patch(&self.patch)
    }

    /// Unified diff of the compared current document against that document
    /// with the patch applied, both pretty-printed.
    ///
    /// Returns an empty string for an empty patch.
    pub fn render_diff(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let before = pretty(&self.current);
        let after = pretty(&self.effective);
        TextDiff::from_lines(&before, &after)
            .unified_diff()
            .context_radius(3)
            .header("current", "patched")
            .to_string()
    }
}

impl<O> fmt::Display for PatchResult<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Patch: {}", String::from_utf8_lossy(&self.patch))?;
        writeln!(f, "Current: {}", String::from_utf8_lossy(&self.current))?;
        writeln!(f, "Modified: {}", String::from_utf8_lossy(&self.modified))?;
        write!(f, "Original: {}", String::from_utf8_lossy(&self.original))
    }
}

/// Pretty-print a JSON document, falling back to the raw text.
fn pretty(document: &[u8]) -> String {
    let mut text = serde_json::from_slice::<Value>(document)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| String::from_utf8_lossy(document).into_owned());
    text.push('\n');
    text
}
