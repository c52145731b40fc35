//! gofscan - concurrent scanner for publicly reachable GoFile identifiers.
//!
//! Candidates are generated (or supplied), probed with bounded concurrency,
//! genuine pages are mined for their embedded file metadata and every hit is
//! forwarded to an optional Discord webhook.

pub mod api;
pub mod config;
pub mod discord_notifier;
pub mod extractor;
pub mod id_source;
pub mod probe;
pub mod report;
pub mod scanner;

pub use config::{EffectiveParameters, ScanConfig, ScanParams};
pub use extractor::{extract_files, FileRecord};
pub use probe::{ProbeClient, ProbeOutcome};
pub use report::ScanReport;
pub use scanner::{run_scan, ScanAggregate, Scanner};
