// config.rs - Scan Configuration & Parameter Validation
// Purpose: Turn loosely-typed parameters (CLI flags, query string, JSON body)
//          into one clamped, immutable ScanConfig

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::discord_notifier::Branding;
use crate::id_source::{parse_id_list, CandidateSource, DEFAULT_ID_LENGTH};
use crate::probe::DEFAULT_BASE_URL;

pub const DEFAULT_COUNT: i64 = 100;
pub const MIN_COUNT: i64 = 1;
pub const MAX_COUNT: i64 = 1000;

pub const DEFAULT_THREADS: i64 = 50;
pub const MIN_THREADS: i64 = 1;
pub const MAX_THREADS: i64 = 100;

pub const DEFAULT_DELAY: f64 = 0.1;
pub const MIN_DELAY: f64 = 0.01;
pub const MAX_DELAY: f64 = 5.0;

pub const MAX_ID_LENGTH: i64 = 32;

/// Raw, unclamped scan parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanParams {
    pub webhook: Option<String>,
    pub count: Option<i64>,
    pub threads: Option<i64>,
    pub delay: Option<f64>,
    pub patterns: bool,
    pub ids: Option<Vec<String>>,
    pub id_length: Option<i64>,
}

fn parse_int(key: &str, value: &Value) -> Result<Option<i64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Some(i)),
            None => match n.as_f64() {
                Some(f) if f.is_finite() => Ok(Some(f.trunc() as i64)),
                _ => bail!("invalid value for '{}': {}", key, n),
            },
        },
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(i) => Ok(Some(i)),
            Err(_) => bail!("invalid integer for '{}': {:?}", key, s),
        },
        other => bail!("invalid value for '{}': {}", key, other),
    }
}

fn parse_float(key: &str, value: &Value) -> Result<Option<f64>> {
    let parsed = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(f) if f.is_finite() => Ok(Some(f)),
        _ => bail!("invalid number for '{}': {}", key, value),
    }
}

fn parse_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn parse_ids(value: &Value) -> Option<Vec<String>> {
    let ids: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => parse_id_list(s),
        _ => return None,
    };
    if ids.is_empty() { None } else { Some(ids) }
}

impl ScanParams {
    /// Read parameters from a merged JSON object (query string values arrive as strings)
    pub fn from_json_map(map: &Map<String, Value>) -> Result<Self> {
        let webhook = map
            .get("webhook")
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            webhook,
            count: map.get("count").map(|v| parse_int("count", v)).transpose()?.flatten(),
            threads: map.get("threads").map(|v| parse_int("threads", v)).transpose()?.flatten(),
            delay: map.get("delay").map(|v| parse_float("delay", v)).transpose()?.flatten(),
            patterns: map.get("patterns").map(parse_flag).unwrap_or(false),
            ids: map.get("ids").and_then(parse_ids),
            id_length: map
                .get("id_length")
                .map(|v| parse_int("id_length", v))
                .transpose()?
                .flatten(),
        })
    }
}

/// Effective configuration echoed back with every report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveParameters {
    pub count: usize,
    pub threads: usize,
    pub delay: f64,
    pub patterns: bool,
    pub webhook: bool,
}

/// Validated configuration of one scan
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub webhook_url: Option<String>,
    pub concurrency: usize,
    pub delay_secs: f64,
    pub count: usize,
    pub patterns: bool,
    pub source: CandidateSource,
    pub base_url: String,
    pub branding: Branding,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            concurrency: DEFAULT_THREADS as usize,
            delay_secs: DEFAULT_DELAY,
            count: DEFAULT_COUNT as usize,
            patterns: false,
            source: CandidateSource::Random {
                count: DEFAULT_COUNT as usize,
                length: DEFAULT_ID_LENGTH,
            },
            base_url: DEFAULT_BASE_URL.to_string(),
            branding: Branding::default(),
        }
    }
}

impl ScanConfig {
    /// Validate and clamp raw parameters
    pub fn from_params(params: &ScanParams) -> Result<Self> {
        let count = params.count.unwrap_or(DEFAULT_COUNT).clamp(MIN_COUNT, MAX_COUNT) as usize;
        let concurrency = params
            .threads
            .unwrap_or(DEFAULT_THREADS)
            .clamp(MIN_THREADS, MAX_THREADS) as usize;

        let delay_secs = params.delay.unwrap_or(DEFAULT_DELAY);
        if !delay_secs.is_finite() {
            bail!("invalid delay: {}", delay_secs);
        }
        let delay_secs = delay_secs.clamp(MIN_DELAY, MAX_DELAY);

        let length = params
            .id_length
            .unwrap_or(DEFAULT_ID_LENGTH as i64)
            .clamp(1, MAX_ID_LENGTH) as usize;

        let source = match &params.ids {
            Some(ids) if !ids.is_empty() => CandidateSource::List(ids.clone()),
            _ if params.patterns => CandidateSource::Patterns,
            _ => CandidateSource::Random { count, length },
        };

        Ok(Self {
            webhook_url: params.webhook.clone().filter(|w| !w.trim().is_empty()),
            concurrency,
            delay_secs,
            count,
            patterns: params.patterns,
            source,
            ..Self::default()
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_branding(mut self, branding: Branding) -> Self {
        self.branding = branding;
        self
    }

    /// Pacing delay applied after each completed probe
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_secs)
    }

    pub fn parameters(&self) -> EffectiveParameters {
        EffectiveParameters {
            count: self.count,
            threads: self.concurrency,
            delay: self.delay_secs,
            patterns: self.patterns,
            webhook: self.webhook_url.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> ScanParams {
        ScanParams::from_json_map(value.as_object().unwrap()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = ScanConfig::from_params(&ScanParams::default()).unwrap();
        assert_eq!(config.count, 100);
        assert_eq!(config.concurrency, 50);
        assert_eq!(config.delay_secs, 0.1);
        assert!(!config.patterns);
        assert_eq!(config.source, CandidateSource::Random { count: 100, length: 6 });
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_clamping_bounds() {
        let config = ScanConfig::from_params(&ScanParams {
            count: Some(1001),
            threads: Some(0),
            delay: Some(0.0),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.count, 1000);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.delay_secs, 0.01);

        let config = ScanConfig::from_params(&ScanParams {
            count: Some(-4),
            threads: Some(-7),
            delay: Some(100.0),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.count, 1);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.delay_secs, 5.0);

        let config = ScanConfig::from_params(&ScanParams {
            threads: Some(500),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.concurrency, 100);
    }

    #[test]
    fn test_non_finite_delay_rejected() {
        let err = ScanConfig::from_params(&ScanParams {
            delay: Some(f64::NAN),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("delay"));
    }

    #[test]
    fn test_json_values_as_strings_or_numbers() {
        let p = params(json!({"count": "10", "threads": 20, "delay": "0.5", "patterns": "True"}));
        assert_eq!(p.count, Some(10));
        assert_eq!(p.threads, Some(20));
        assert_eq!(p.delay, Some(0.5));
        assert!(p.patterns);

        let p = params(json!({"count": 12.9, "patterns": true, "delay": 1}));
        assert_eq!(p.count, Some(12));
        assert_eq!(p.delay, Some(1.0));
        assert!(p.patterns);

        let p = params(json!({"patterns": "yes"}));
        assert!(!p.patterns);
    }

    #[test]
    fn test_unparseable_values_are_errors() {
        let map = json!({"count": "lots"});
        let err = ScanParams::from_json_map(map.as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("count"));

        let map = json!({"delay": "fast"});
        assert!(ScanParams::from_json_map(map.as_object().unwrap()).is_err());

        let map = json!({"threads": [1, 2]});
        assert!(ScanParams::from_json_map(map.as_object().unwrap()).is_err());
    }

    #[test]
    fn test_webhook_normalization() {
        let p = params(json!({"webhook": "   "}));
        assert_eq!(p.webhook, None);
        let p = params(json!({"webhook": "https://discord.com/api/webhooks/1/abc"}));
        let config = ScanConfig::from_params(&p).unwrap();
        assert!(config.parameters().webhook);
    }

    #[test]
    fn test_source_selection() {
        let config = ScanConfig::from_params(&params(json!({"patterns": "true", "count": 3}))).unwrap();
        assert_eq!(config.source, CandidateSource::Patterns);
        assert_eq!(config.parameters().count, 3);

        let config =
            ScanConfig::from_params(&params(json!({"patterns": "true", "ids": ["a1", "b2"]}))).unwrap();
        assert_eq!(
            config.source,
            CandidateSource::List(vec!["a1".to_string(), "b2".to_string()])
        );

        let config = ScanConfig::from_params(&params(json!({"ids": "x,y,z"}))).unwrap();
        assert_eq!(config.source.len(), 3);

        let config = ScanConfig::from_params(&params(json!({"count": 7, "id_length": 99}))).unwrap();
        assert_eq!(config.source, CandidateSource::Random { count: 7, length: 32 });
    }

    #[test]
    fn test_effective_parameters_echo() {
        let config = ScanConfig::from_params(&ScanParams {
            count: Some(5),
            threads: Some(5),
            delay: Some(0.01),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            config.parameters(),
            EffectiveParameters {
                count: 5,
                threads: 5,
                delay: 0.01,
                patterns: false,
                webhook: false,
            }
        );
        assert_eq!(config.delay(), Duration::from_millis(10));
    }
}
