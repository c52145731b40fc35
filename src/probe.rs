// probe.rs - Single Identifier Lookup & Classification
// Purpose: Issue one GET per candidate identifier and classify the response
// Classification:
//  - network failure / unexpected status / non-genuine page -> no signal (None)
//  - 404                                                     -> NotFound
//  - genuine page with file records                         -> Found
//  - genuine page without parseable records                 -> ValidPageUnparsed

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::extractor::{extract_files, FileRecord};

/// Public host of the file-hosting service
pub const DEFAULT_BASE_URL: &str = "https://gofile.io";

/// Browser user-agent; the service gates requests without one
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Per-request timeout for lookups and webhook deliveries
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Both markers must appear for a 200 page to count as a genuine hosting page
pub const GENUINE_PAGE_MARKERS: [&str; 2] = ["gofile.io", "contentId"];

pub const UNPARSED_MESSAGE: &str = "GoFile page found but content could not be parsed";

/// Result of probing one identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ProbeOutcome {
    #[serde(rename = "NOT_FOUND")]
    NotFound { url: String },
    #[serde(rename = "VALID_PAGE")]
    ValidPageUnparsed { url: String, message: String },
    #[serde(rename = "FOUND")]
    Found {
        url: String,
        files: Vec<FileRecord>,
        total_files: usize,
        total_size: u64,
    },
}

impl ProbeOutcome {
    /// Build a `Found` outcome, deriving the totals from the records
    pub fn found(url: String, files: Vec<FileRecord>) -> Self {
        let total_files = files.len();
        let total_size = files.iter().map(|f| f.size).sum();
        ProbeOutcome::Found {
            url,
            files,
            total_files,
            total_size,
        }
    }

    pub fn unparsed(url: String) -> Self {
        ProbeOutcome::ValidPageUnparsed {
            url,
            message: UNPARSED_MESSAGE.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            ProbeOutcome::NotFound { url }
            | ProbeOutcome::ValidPageUnparsed { url, .. }
            | ProbeOutcome::Found { url, .. } => url,
        }
    }

    /// Whether this outcome is retained and notified (everything but NotFound)
    pub fn is_hit(&self) -> bool {
        !matches!(self, ProbeOutcome::NotFound { .. })
    }
}

/// Whether a 200 body looks like a real hosting page
pub fn is_genuine_page(body: &str) -> bool {
    GENUINE_PAGE_MARKERS.iter().all(|marker| body.contains(marker))
}

/// Classify an HTTP response for `url`
pub fn classify(url: &str, status: u16, body: &str) -> Option<ProbeOutcome> {
    match status {
        404 => Some(ProbeOutcome::NotFound {
            url: url.to_string(),
        }),
        200 if is_genuine_page(body) => {
            let files = extract_files(body);
            if files.is_empty() {
                Some(ProbeOutcome::unparsed(url.to_string()))
            } else {
                Some(ProbeOutcome::found(url.to_string(), files))
            }
        }
        _ => None,
    }
}

/// Build the HTTP client shared by every probe of one scan
pub fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

/// Looks up identifiers against the hosting service
#[derive(Debug, Clone)]
pub struct ProbeClient {
    client: Client,
    base_url: String,
}

impl ProbeClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resource URL for an identifier
    pub fn url_for(&self, id: &str) -> String {
        format!("{}/d/{}", self.base_url, id)
    }

    /// Probe one identifier; `None` means no signal
    pub async fn probe(&self, id: &str) -> Option<ProbeOutcome> {
        let url = self.url_for(id);

        let response = self.client.get(&url).send().await.ok()?;
        let status = response.status().as_u16();

        // Only 200 bodies are inspected
        let body = if status == 200 {
            response.text().await.ok()?
        } else {
            String::new()
        };

        classify(&url, status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://gofile.io/d/AbC123";

    fn record(name: &str, size: u64) -> FileRecord {
        FileRecord {
            name: name.to_string(),
            size,
            mime_type: "Unknown".to_string(),
            link: String::new(),
            md5: String::new(),
            created: String::new(),
        }
    }

    #[test]
    fn test_classify_404_is_not_found() {
        let outcome = classify(URL, 404, "").unwrap();
        assert_eq!(outcome, ProbeOutcome::NotFound { url: URL.to_string() });
        assert!(!outcome.is_hit());
    }

    #[test]
    fn test_classify_other_status_is_no_signal() {
        for status in [301, 403, 429, 500, 503] {
            assert!(classify(URL, status, "gofile.io contentId").is_none());
        }
    }

    #[test]
    fn test_classify_non_genuine_page_is_no_signal() {
        assert!(classify(URL, 200, "<html>gofile.io</html>").is_none());
        assert!(classify(URL, 200, "<html>contentId</html>").is_none());
    }

    #[test]
    fn test_classify_genuine_unparsed() {
        let outcome = classify(URL, 200, "<html>gofile.io {\"contentId\":\"x\"}</html>").unwrap();
        assert_eq!(outcome, ProbeOutcome::unparsed(URL.to_string()));
        assert!(outcome.is_hit());
    }

    #[test]
    fn test_classify_found_totals() {
        let body = r#"gofile.io {"contentId":"x","files":{"a":{"name":"a.bin","size":100},"b":{"name":"b.bin","size":23}}}"#;
        match classify(URL, 200, body).unwrap() {
            ProbeOutcome::Found {
                url,
                files,
                total_files,
                total_size,
            } => {
                assert_eq!(url, URL);
                assert_eq!(total_files, files.len());
                assert_eq!(total_files, 2);
                assert_eq!(total_size, 123);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_found_serialization() {
        let outcome = ProbeOutcome::found(URL.to_string(), vec![record("x.txt", 5)]);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "FOUND");
        assert_eq!(json["url"], URL);
        assert_eq!(json["total_files"], 1);
        assert_eq!(json["total_size"], 5);
        assert_eq!(json["files"][0]["type"], "Unknown");
    }

    #[test]
    fn test_unparsed_serialization() {
        let json = serde_json::to_value(ProbeOutcome::unparsed(URL.to_string())).unwrap();
        assert_eq!(json["status"], "VALID_PAGE");
        assert_eq!(json["message"], UNPARSED_MESSAGE);
    }

    #[test]
    fn test_url_for_trims_trailing_slash() {
        let probe = ProbeClient::new(Client::new(), "http://127.0.0.1:9999/");
        assert_eq!(probe.url_for("xyz"), "http://127.0.0.1:9999/d/xyz");
    }
}
