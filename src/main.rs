// main.rs - gofscan CLI
// Purpose: Run a single GoFile identifier scan from the command line, or serve
//          the scanner as a JSON API
// License: MIT

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use gofscan::api::{start_api_server, ApiState};
use gofscan::config::{ScanConfig, ScanParams};
use gofscan::discord_notifier::{Branding, DEFAULT_AVATAR_URL, DEFAULT_USERNAME};
use gofscan::id_source::{parse_id_list, read_ids_from_file};
use gofscan::probe::DEFAULT_BASE_URL;
use gofscan::report::ScanReport;
use gofscan::scanner::Scanner;

/// gofscan - GoFile public identifier scanner
#[derive(Parser, Debug)]
#[command(
    name = "gofscan",
    version,
    about = "Probe GoFile for publicly reachable identifiers and report discovered files",
    after_help = r#"
EXAMPLES:

  Random scan of 200 identifiers:
    gofscan --count 200 --threads 40

  Built-in pattern list with Discord notifications:
    gofscan --patterns --webhook "https://discord.com/api/webhooks/..."

  Explicit identifiers, JSON report saved to disk:
    gofscan --ids AbC123,xYz789 --output report.json

  Serve the JSON API:
    gofscan --serve --port 3000
"#
)]
struct Args {
    // ═══════════════════════════════════════════════════════════════════════════
    // CANDIDATE OPTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Number of random identifiers to probe (1-1000)
    #[arg(short, long, default_value_t = 100, help_heading = "Candidates")]
    count: i64,

    /// Probe the built-in list of common patterns instead of random identifiers
    #[arg(long, help_heading = "Candidates")]
    patterns: bool,

    /// Comma separated identifiers to probe (overrides --count/--patterns)
    #[arg(long, value_name = "LIST", help_heading = "Candidates")]
    ids: Option<String>,

    /// File with identifiers, one per line (# for comments)
    #[arg(long, value_name = "FILE", help_heading = "Candidates")]
    ids_file: Option<PathBuf>,

    /// Length of random identifiers
    #[arg(long, default_value_t = 6, value_name = "N", help_heading = "Candidates")]
    id_length: i64,

    // ═══════════════════════════════════════════════════════════════════════════
    // PERFORMANCE OPTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Maximum concurrent probes (1-100)
    #[arg(short, long, default_value_t = 50, help_heading = "Performance")]
    threads: i64,

    /// Pause in seconds after each completed probe (0.01-5.0)
    #[arg(short, long, default_value_t = 0.1, help_heading = "Performance")]
    delay: f64,

    // ═══════════════════════════════════════════════════════════════════════════
    // NOTIFICATION OPTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Discord webhook URL for discoveries
    #[arg(long, visible_alias = "discord-webhook", value_name = "URL", help_heading = "Notifications")]
    webhook: Option<String>,

    /// Display name used for webhook messages
    #[arg(long, default_value = DEFAULT_USERNAME, value_name = "NAME", help_heading = "Notifications")]
    webhook_name: String,

    /// Avatar/icon URL used for webhook messages
    #[arg(long, default_value = DEFAULT_AVATAR_URL, value_name = "URL", help_heading = "Notifications")]
    webhook_avatar: String,

    // ═══════════════════════════════════════════════════════════════════════════
    // TARGET & OUTPUT OPTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Base URL of the hosting service
    #[arg(long, default_value = DEFAULT_BASE_URL, value_name = "URL", help_heading = "Target")]
    base_url: String,

    /// Print the JSON report instead of the text summary
    #[arg(long, help_heading = "Output")]
    json: bool,

    /// Save the JSON report to this file
    #[arg(short, long, value_name = "FILE", help_heading = "Output")]
    output: Option<PathBuf>,

    // ═══════════════════════════════════════════════════════════════════════════
    // API SERVER OPTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Serve the scanner as a JSON API instead of running one scan
    #[arg(long, help_heading = "API Server")]
    serve: bool,

    /// API listen port
    #[arg(long, default_value_t = 3000, value_name = "PORT", help_heading = "API Server")]
    port: u16,
}

impl Args {
    fn branding(&self) -> Branding {
        Branding {
            username: self.webhook_name.clone(),
            avatar_url: Some(self.webhook_avatar.clone()),
        }
    }

    fn scan_params(&self) -> Result<ScanParams> {
        let mut ids = Vec::new();
        if let Some(raw) = &self.ids {
            ids.extend(parse_id_list(raw));
        }
        if let Some(path) = &self.ids_file {
            ids.extend(read_ids_from_file(path)?);
        }

        Ok(ScanParams {
            webhook: self.webhook.clone(),
            count: Some(self.count),
            threads: Some(self.threads),
            delay: Some(self.delay),
            patterns: self.patterns,
            ids: if ids.is_empty() { None } else { Some(ids) },
            id_length: Some(self.id_length),
        })
    }
}

fn print_banner() {
    println!("{}", "╔═══════════════════════════════════════════════════════════════╗".cyan().bold());
    println!("{}", "║            GOFSCAN - GoFile Public Identifier Scanner         ║".cyan().bold());
    println!("{}", "╚═══════════════════════════════════════════════════════════════╝".cyan().bold());
    println!();
}

fn progress_bar(len: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

async fn run_cli_scan(args: &Args) -> Result<()> {
    let params = args.scan_params()?;
    let config = ScanConfig::from_params(&params)?
        .with_base_url(&args.base_url)
        .with_branding(args.branding());

    let pb = progress_bar(config.source.len() as u64)?;
    let scanner = Scanner::new(config.clone())?.with_progress(pb);
    let aggregate = scanner.run().await;
    let report = ScanReport::new(aggregate, &config);

    if args.json {
        println!("{}", report.to_json_pretty()?);
    } else {
        println!();
        println!("{}", "═══════════════════════════════════════════════════════════════".yellow().bold());
        println!("{}", "  SCAN SUMMARY".yellow().bold());
        println!("{}", "═══════════════════════════════════════════════════════════════".yellow().bold());
        println!("{}", report.summary());
    }

    if let Some(path) = &args.output {
        report
            .save_to_file(path)
            .context("Failed to save scan report")?;
        let saved = format!("[+] Report saved to {}", path.display()).green();
        if args.json {
            eprintln!("{}", saved);
        } else {
            println!("{}", saved);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if !args.json {
        print_banner();
    }

    if args.serve {
        let state = ApiState {
            base_url: args.base_url.clone(),
            branding: args.branding(),
        };
        start_api_server(state, args.port).await?;
        return Ok(());
    }

    if let Err(e) = run_cli_scan(&args).await {
        eprintln!("{}", format!("[ERROR] Scan failed: {:#}", e).red().bold());
        std::process::exit(1);
    }

    Ok(())
}
