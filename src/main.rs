mod cli;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use cli::{Args, BruteArgs, Mode, OutputArgs};
use wifi_sos::{report, wifi, BruteForceResult, BruteForcer, NetshControl, Termination};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    println!("\n{}", format!("📡 WifiSOS v{}", env!("CARGO_PKG_VERSION")).bold().cyan());
    println!(
        "{}\n",
        "Scan, recover and audit WiFi - only on networks you are authorized to test".dimmed()
    );

    match args.mode {
        Mode::Scan { output } => handle_scan_mode(&output).await?,
        Mode::Saved { output } => handle_saved_mode(&output).await?,
        Mode::Brute(brute) => handle_brute_mode(brute).await?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "wifi_sos=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handle scan mode - list nearby networks
async fn handle_scan_mode(output: &OutputArgs) -> Result<()> {
    println!("{}", "Scanning for WiFi networks...".yellow());

    let networks = match wifi::scan_networks() {
        Ok(networks) => networks,
        Err(e) => {
            println!("{}", format!("❌ Failed to scan WiFi networks: {}", e).red());
            println!("\n{}", "💡 Troubleshooting:".bold().yellow());
            println!("  - Ensure WiFi is enabled on your device");
            println!("  - Ensure the WLAN AutoConfig service is running");
            return Err(e.into());
        }
    };

    let text = report::format_networks(&networks);
    println!("{}", text);
    save_text(output, "wifi_scan", &text);

    Ok(())
}

/// Handle saved mode - list saved profiles and keys
async fn handle_saved_mode(output: &OutputArgs) -> Result<()> {
    println!("{}", "Reading saved WiFi profiles...".yellow());

    let networks = wifi::saved_networks().context("Failed to list saved profiles")?;
    if networks.iter().any(|n| matches!(n.key, wifi::StoredKey::Absent)) {
        println!(
            "{}",
            "💡 Some keys are hidden - run as Administrator to reveal them".dimmed()
        );
    }

    let text = report::format_saved_networks(&networks);
    println!("{}", text);
    save_text(output, "saved_wifi", &text);

    Ok(())
}

/// Handle brute mode - online dictionary attack against one SSID
async fn handle_brute_mode(brute: BruteArgs) -> Result<()> {
    println!("{}", format!("🔓 Auditing WiFi '{}'...", brute.ssid).cyan());
    match &brute.dict {
        Some(path) => println!("Dictionary: {}", path.display().to_string().cyan()),
        None => println!("Dictionary: {}", "built-in".cyan()),
    }
    if brute.max > 0 {
        println!("Max attempts: {}", brute.max.to_string().cyan());
    }
    println!("{}\n", "Press Ctrl+C to stop after the current attempt".dimmed());

    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n{}", "🛑 Stopping after the current attempt...".yellow());
            flag.store(true, Ordering::Release);
        }
    });

    let ssid = brute.ssid.clone();
    let dictionary = brute.dictionary();
    let config = brute.config();
    let control = NetshControl::new(brute.probe_target.clone(), brute.probe_timeout());
    let progress = progress_bar();

    let result = tokio::task::spawn_blocking(move || {
        BruteForcer::new(&control, config)
            .with_progress(progress)
            .with_stop_flag(stop)
            .run(&ssid, &dictionary)
    })
    .await
    .context("Brute-force worker stopped unexpectedly")?
    .context("Brute force failed")?;

    display_result(&result);

    if !brute.output.no_save {
        let prefix = format!("brute_force_{}", result.ssid);
        let saved = if brute.json {
            report::save_json_result(&brute.output.output_dir, &prefix, &result)
        } else {
            report::save_result(
                &brute.output.output_dir,
                &prefix,
                &report::format_brute_force_result(&result),
            )
        };
        announce_saved(saved);
    }

    Ok(())
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} trying {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░-"),
    );
    pb
}

fn display_result(result: &BruteForceResult) {
    println!();
    match &result.termination {
        Termination::Found { password } => {
            println!("{} {}", "✓ Password found:".bold().green(), password.bold().cyan());
            if result.restored == Some(false) {
                println!(
                    "{}",
                    "⚠️  Could not return the adapter to its previous connection".yellow()
                );
            }
        }
        Termination::Exhausted => {
            println!("{}", "✗ Password not found in the dictionary".red());
        }
        Termination::Interrupted => {
            println!("{}", "⚠️  Stopped before the dictionary was exhausted".yellow());
        }
    }

    println!("\n{}", "Statistics:".bold());
    println!("  Attempts: {}", result.tested_count.to_string().cyan());
    println!("  Duration: {:.2}s", result.elapsed.as_secs_f64());

    if !result.attempts.is_empty() {
        println!("\n{}", "Passwords tried:".bold());
        for (idx, attempt) in result.attempts.iter().enumerate() {
            let outcome = attempt.outcome.to_string();
            let outcome = if attempt.outcome.is_success() {
                outcome.green()
            } else {
                outcome.red()
            };
            println!("  {}. {} [{}]", idx + 1, attempt.password, outcome);
        }
    }

    if matches!(result.termination, Termination::Exhausted) {
        println!("\n{}", "💡 Tips:".bold().yellow());
        println!("  - Try a larger dictionary with --dict");
        println!("  - Raise --connect-settle-ms if the adapter is slow to associate");
    }
}

fn save_text(output: &OutputArgs, prefix: &str, text: &str) {
    if !output.no_save {
        announce_saved(report::save_result(&output.output_dir, prefix, text));
    }
}

fn announce_saved(saved: wifi_sos::Result<PathBuf>) {
    match saved {
        Ok(path) => println!("\n{}", format!("✓ Result saved to: {}", path.display()).green()),
        Err(e) => println!("\n{}", format!("Failed to save result: {}", e).red()),
    }
}
