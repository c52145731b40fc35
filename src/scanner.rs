// scanner.rs - Scan Coordinator
// Purpose: Dispatch every candidate through the probe client with bounded
//          concurrency, pace completions, forward hits to the notifier and
//          keep the aggregate counters

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::*;
use indicatif::ProgressBar;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::sleep;

use crate::config::ScanConfig;
use crate::discord_notifier::Notifier;
use crate::probe::{build_client, ProbeClient, ProbeOutcome};

/// Counters and retained outcomes of one scan.
///
/// Only the coordinating task mutates it; once returned from [`Scanner::run`]
/// it is read-only.
#[derive(Debug, Clone)]
pub struct ScanAggregate {
    dispatched: usize,
    completed: usize,
    outcomes: Vec<ProbeOutcome>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl Default for ScanAggregate {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanAggregate {
    pub fn new() -> Self {
        Self {
            dispatched: 0,
            completed: 0,
            outcomes: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    fn record_dispatch(&mut self) {
        self.dispatched += 1;
    }

    /// Count one completed probe; only hits are retained
    fn record_completion(&mut self, outcome: Option<ProbeOutcome>) {
        debug_assert!(self.completed < self.dispatched);
        self.completed += 1;
        if let Some(outcome) = outcome.filter(ProbeOutcome::is_hit) {
            self.outcomes.push(outcome);
        }
    }

    fn finalize(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    /// Probes that finished, whatever their result
    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn outcomes(&self) -> &[ProbeOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<ProbeOutcome> {
        self.outcomes
    }

    pub fn found_count(&self) -> usize {
        self.outcomes.len()
    }

    /// Percentage of completed probes that produced a hit (0 when nothing ran)
    pub fn success_rate(&self) -> f64 {
        if self.completed == 0 {
            0.0
        } else {
            self.found_count() as f64 / self.completed as f64 * 100.0
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn duration_seconds(&self) -> f64 {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds() as f64 / 1000.0)
            .unwrap_or(0.0)
    }
}

/// Runs one scan for a fixed configuration
pub struct Scanner {
    config: ScanConfig,
    probe: ProbeClient,
    notifier: Notifier,
    progress: ProgressBar,
}

impl Scanner {
    /// Build the scanner and the HTTP client shared by all of its probes
    pub fn new(config: ScanConfig) -> Result<Self> {
        let client = build_client()?;
        let probe = ProbeClient::new(client.clone(), &config.base_url);
        let notifier = Notifier::new(client, config.webhook_url.clone(), config.branding.clone());
        Ok(Self {
            config,
            probe,
            notifier,
            progress: ProgressBar::hidden(),
        })
    }

    /// Report progress on a visible bar instead of plain log lines
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    // Status lines never go to stdout, which may carry a JSON report
    fn log(&self, line: String) {
        if self.progress.is_hidden() {
            eprintln!("{}", line);
        } else {
            self.progress.println(line);
        }
    }

    /// Scan the configured candidate source
    pub async fn run(&self) -> ScanAggregate {
        let candidates = self.config.source.candidates();
        self.run_candidates(candidates).await
    }

    /// Scan an explicit candidate sequence; returns once every probe completed
    pub async fn run_candidates(&self, candidates: Vec<String>) -> ScanAggregate {
        self.log(format!(
            "{}",
            format!(
                "[*] Scanning {} {} identifiers | workers: {} | delay: {:.2}s | webhook: {}",
                candidates.len(),
                self.config.source.label(),
                self.config.concurrency,
                self.config.delay_secs,
                if self.notifier.is_enabled() { "on" } else { "off" }
            )
            .cyan()
        ));

        let mut aggregate = ScanAggregate::new();
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let mut probes = JoinSet::new();

        for id in candidates {
            let semaphore = Arc::clone(&semaphore);
            let probe = self.probe.clone();
            probes.spawn(async move {
                let _permit = semaphore.acquire().await.ok()?;
                probe.probe(&id).await
            });
            aggregate.record_dispatch();
        }

        self.progress.set_length(aggregate.dispatched() as u64);
        self.drain(probes, &mut aggregate).await;
        aggregate.finalize();

        self.progress.finish_and_clear();
        self.log(format!(
            "{}",
            format!(
                "[+] Scan complete: {}/{} scanned, {} found ({:.2}%) in {:.2}s",
                aggregate.completed(),
                aggregate.dispatched(),
                aggregate.found_count(),
                aggregate.success_rate(),
                aggregate.duration_seconds()
            )
            .green()
            .bold()
        ));

        aggregate
    }

    /// Consume completions in completion order, pacing after each one
    async fn drain(
        &self,
        mut probes: JoinSet<Option<ProbeOutcome>>,
        aggregate: &mut ScanAggregate,
    ) {
        let mut deliveries = JoinSet::new();

        while let Some(joined) = probes.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.log(format!("[!] Probe task failed: {}", e).yellow().to_string());
                    None
                }
            };

            if let Some(hit) = outcome.as_ref().filter(|o| o.is_hit()) {
                self.log_hit(hit);
                if self.notifier.is_enabled() {
                    let notifier = self.notifier.clone();
                    let hit = hit.clone();
                    deliveries.spawn(async move { notifier.notify(&hit).await });
                }
            }

            aggregate.record_completion(outcome);
            self.progress.inc(1);

            sleep(self.config.delay()).await;
        }

        // Webhook deliveries are best-effort but must not be cut off by shutdown
        while deliveries.join_next().await.is_some() {}
    }

    fn log_hit(&self, outcome: &ProbeOutcome) {
        match outcome {
            ProbeOutcome::Found {
                url,
                total_files,
                total_size,
                ..
            } => self.log(format!(
                "{}",
                format!(
                    "    [+] FOUND {} ({} files, {} bytes)",
                    url, total_files, total_size
                )
                .green()
                .bold()
            )),
            ProbeOutcome::ValidPageUnparsed { url, .. } => self.log(format!(
                "{}",
                format!("    [+] VALID PAGE {} (content not parsed)", url).yellow()
            )),
            ProbeOutcome::NotFound { .. } => {}
        }
    }
}

/// Build a scanner for `config` and run it to completion
pub async fn run_scan(config: ScanConfig) -> Result<ScanAggregate> {
    let scanner = Scanner::new(config)?;
    Ok(scanner.run().await)
}
