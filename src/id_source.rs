// id_source.rs - Candidate Identifier Generation
// Purpose: Produce the identifiers probed against the hosting service
// Modes:
//  - Random tokens over the 62-char alphanumeric alphabet
//  - Built-in list of common/memorable patterns
//  - Externally supplied list (CLI, file or request body)

use anyhow::{Context, Result};
use rand::Rng;
use std::path::Path;

/// Alphabet used for random identifiers (upper, lower, digits)
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Default identifier length used by the hosting service
pub const DEFAULT_ID_LENGTH: usize = 6;

/// Common short tokens tried in "pattern scan" mode
pub const COMMON_PATTERNS: &[&str] = &[
    "IIAxbd", "ABCDEF", "123456", "TEST01", "DEMO01",
    "FILE01", "DATA01", "DOC001", "IMG001", "VID001",
    "WORK01", "PROJ01", "TEMP01", "BACKUP", "CONFIG",
];

/// Where the candidates of one scan come from
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateSource {
    Random { count: usize, length: usize },
    Patterns,
    List(Vec<String>),
}

impl CandidateSource {
    /// Materialize the full candidate sequence
    pub fn candidates(&self) -> Vec<String> {
        match self {
            CandidateSource::Random { count, length } => {
                (0..*count).map(|_| generate_id(*length)).collect()
            }
            CandidateSource::Patterns => COMMON_PATTERNS.iter().map(|p| p.to_string()).collect(),
            CandidateSource::List(ids) => from_list(ids),
        }
    }

    /// Number of candidates this source will produce
    pub fn len(&self) -> usize {
        match self {
            CandidateSource::Random { count, .. } => *count,
            CandidateSource::Patterns => COMMON_PATTERNS.len(),
            CandidateSource::List(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn label(&self) -> &'static str {
        match self {
            CandidateSource::Random { .. } => "random",
            CandidateSource::Patterns => "patterns",
            CandidateSource::List(_) => "list",
        }
    }
}

/// Generate one random identifier of the given length
pub fn generate_id(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Pass supplied identifiers through unchanged (malformed ones fail at probe time)
pub fn from_list(ids: &[String]) -> Vec<String> {
    ids.to_vec()
}

/// Read identifiers from file, one per line (# for comments)
pub fn read_ids_from_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .context(format!("Failed to read identifier list {:?}", path))?;
    Ok(content
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect())
}

/// Split a comma separated identifier list (CLI `--ids`)
pub fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
