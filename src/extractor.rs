// extractor.rs - Embedded File Metadata Extraction
// Purpose: Pull the per-file metadata object out of a hosting page's inline script data
// The page has no dedicated data endpoint, so the `"files":` object is delimited by
// balanced-brace scanning from the first marker occurrence.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key that introduces the embedded file map
pub const FILES_MARKER: &str = "\"files\":";

/// Metadata for one file listed on a resolved page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub link: String,
    pub md5: String,
    pub created: String,
}

impl FileRecord {
    /// Build a record from one entry of the file map, defaulting absent fields
    fn from_entry(entry: &serde_json::Map<String, Value>) -> Self {
        Self {
            name: string_field(entry, "name", "Unknown"),
            size: size_field(entry),
            mime_type: string_field(entry, "mimeType", "Unknown"),
            link: string_field(entry, "link", ""),
            md5: string_field(entry, "md5", ""),
            created: string_field(entry, "created", ""),
        }
    }
}

fn string_field(entry: &serde_json::Map<String, Value>, key: &str, default: &str) -> String {
    match entry.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

fn size_field(entry: &serde_json::Map<String, Value>) -> u64 {
    match entry.get("size") {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        _ => 0,
    }
}

/// Byte offset just past the brace that closes the first object after `start`.
///
/// Depth starts at zero, `{` increments and `}` decrements; the end is the first
/// `}` at which depth returns to zero. Returns `None` when no such point exists.
pub fn matching_brace_end(text: &str, start: usize) -> Option<usize> {
    let mut depth: i64 = 0;
    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extract every file record embedded in the page.
///
/// Any structural problem (missing marker, unbalanced braces, malformed JSON,
/// unexpected shape) yields an empty list rather than an error.
pub fn extract_files(page: &str) -> Vec<FileRecord> {
    let Some(start) = page.find(FILES_MARKER) else {
        return Vec::new();
    };
    let Some(end) = matching_brace_end(page, start) else {
        return Vec::new();
    };

    let wrapped = format!("{{{}}}", &page[start..end]);
    let parsed: Value = match serde_json::from_str(&wrapped) {
        Ok(value) => value,
        Err(_) => return Vec::new(),
    };

    match parsed.get("files") {
        Some(Value::Object(files)) => files
            .values()
            .filter_map(Value::as_object)
            .map(FileRecord::from_entry)
            .collect(),
        _ => Vec::new(),
    }
}
