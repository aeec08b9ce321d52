/*!
 * Text reports and timestamped result files
 */

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::core::bruteforce::{BruteForceResult, Termination};
use crate::error::{Error, Result};
use crate::wifi::{SavedNetwork, WifiNetwork};

const HEADER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FILE_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Brute-force report: target, counts, elapsed time, outcome and every attempt
pub fn format_brute_force_result(result: &BruteForceResult) -> String {
    render_brute_force(result, Local::now())
}

fn render_brute_force(result: &BruteForceResult, now: DateTime<Local>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "=== WiFi password audit - {} ===\n",
        now.format(HEADER_TIME_FORMAT)
    );
    let _ = writeln!(out, "Target SSID: {}", result.ssid);
    let _ = writeln!(out, "Passwords tried: {}", result.tested_count);
    let _ = writeln!(out, "Elapsed: {:.2?}\n", result.elapsed);

    match &result.termination {
        Termination::Found { password } => {
            let _ = writeln!(out, "Password found!\nPassword: {}", password);
            if result.restored == Some(false) {
                let _ = writeln!(out, "Warning: the adapter could not be returned to its previous state.");
            }
        }
        Termination::Exhausted => {
            let _ = writeln!(out, "No password in the dictionary unlocked the network.");
        }
        Termination::Interrupted => {
            let _ = writeln!(out, "Run interrupted before the dictionary was exhausted.");
        }
    }

    if !result.attempts.is_empty() {
        let _ = writeln!(out, "\nPasswords tried, in order:");
        for (idx, attempt) in result.attempts.iter().enumerate() {
            let _ = writeln!(out, "  {}. {} [{}]", idx + 1, attempt.password, attempt.outcome);
        }
    }

    out
}

/// Scan report: summary table followed by per-network details
pub fn format_networks(networks: &[WifiNetwork]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "=== WiFi scan - {} ===\n",
        Local::now().format(HEADER_TIME_FORMAT)
    );

    if networks.is_empty() {
        let _ = writeln!(out, "No WiFi networks found");
        return out;
    }

    let _ = writeln!(out, "Found {} WiFi networks:\n", networks.len());

    let ssid_width = networks
        .iter()
        .map(|n| n.ssid.chars().count())
        .max()
        .unwrap_or(0)
        .max(20);

    let _ = writeln!(
        out,
        "{:<4} | {:<ssid_width$} | {:<15} | {:<8} | {:<20} | BSSID",
        "#", "SSID", "Signal", "Channel", "Security"
    );
    let _ = writeln!(out, "{}", "-".repeat(4 + 3 + ssid_width + 3 + 15 + 3 + 8 + 3 + 20 + 3 + 17));

    for (idx, network) in networks.iter().enumerate() {
        let signal = if network.signal.is_empty() {
            "N/A".to_string()
        } else {
            network.signal_stars()
        };
        let _ = writeln!(
            out,
            "{:<4} | {:<ssid_width$} | {:<15} | {:<8} | {:<20} | {}",
            idx + 1,
            network.ssid,
            signal,
            or_na(&network.channel),
            or_na(&network.security),
            or_na(&network.bssid),
        );
    }

    let _ = writeln!(out, "\nDetails:\n");
    for (idx, network) in networks.iter().enumerate() {
        let _ = writeln!(out, "Network #{}:\n  {}\n", idx + 1, network);
    }

    let _ = writeln!(out, "Signal: * = 20%, ***** = 100%. N/A means the host did not report the field.");
    out
}

/// Saved-profile report
pub fn format_saved_networks(networks: &[SavedNetwork]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "=== Saved WiFi networks - {} ===\n",
        Local::now().format(HEADER_TIME_FORMAT)
    );
    let _ = writeln!(out, "Found {} saved WiFi networks:\n", networks.len());

    for (idx, network) in networks.iter().enumerate() {
        let _ = writeln!(out, "Network #{}:", idx + 1);
        let _ = writeln!(out, "  SSID: {}", network.ssid);
        let _ = writeln!(out, "  Password: {}\n", network.key);
    }

    out
}

/// Write `content` to `<dir>/<prefix>_<YYYYmmdd_HHMMSS>.txt`
pub fn save_result(dir: &Path, prefix: &str, content: &str) -> Result<PathBuf> {
    write_report(dir, prefix, "txt", content.as_bytes())
}

/// Write `value` as pretty JSON to `<dir>/<prefix>_<YYYYmmdd_HHMMSS>.json`
pub fn save_json_result<T: Serialize>(dir: &Path, prefix: &str, value: &T) -> Result<PathBuf> {
    let json = serde_json::to_vec_pretty(value).map_err(|e| Error::Report {
        path: dir.to_path_buf(),
        source: e.into(),
    })?;
    write_report(dir, prefix, "json", &json)
}

fn write_report(dir: &Path, prefix: &str, extension: &str, content: &[u8]) -> Result<PathBuf> {
    let path = dir.join(report_file_name(prefix, Local::now(), extension));
    std::fs::write(&path, content).map_err(|source| Error::Report {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn report_file_name(prefix: &str, now: DateTime<Local>, extension: &str) -> String {
    let prefix: String = prefix
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}_{}.{}", prefix, now.format(FILE_TIME_FORMAT), extension)
}

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bruteforce::AttemptRecord;
    use crate::core::verify::AttemptOutcome;
    use crate::wifi::StoredKey;
    use chrono::TimeZone;
    use std::time::Duration;

    fn result(termination: Termination, attempts: &[(&str, AttemptOutcome)]) -> BruteForceResult {
        BruteForceResult {
            ssid: "CafeNet".into(),
            tested_count: attempts.len(),
            termination,
            elapsed: Duration::from_millis(12_500),
            attempts: attempts
                .iter()
                .map(|(p, o)| AttemptRecord {
                    password: p.to_string(),
                    outcome: o.clone(),
                })
                .collect(),
            restored: None,
        }
    }

    #[test]
    fn test_found_report_lists_attempts() {
        let report = format_brute_force_result(&result(
            Termination::Found {
                password: "1q2w3e4r".into(),
            },
            &[
                ("12345678", AttemptOutcome::Failure),
                ("1q2w3e4r", AttemptOutcome::Success),
            ],
        ));

        assert!(report.contains("Target SSID: CafeNet"));
        assert!(report.contains("Passwords tried: 2"));
        assert!(report.contains("Elapsed: 12.50s"));
        assert!(report.contains("Password: 1q2w3e4r"));
        assert!(report.contains("  1. 12345678 [failed]"));
        assert!(report.contains("  2. 1q2w3e4r [success]"));
        assert!(!report.contains("previous state"));
    }

    #[test]
    fn test_found_report_flags_failed_restore() {
        let mut run = result(
            Termination::Found {
                password: "1q2w3e4r".into(),
            },
            &[("1q2w3e4r", AttemptOutcome::Success)],
        );
        run.restored = Some(false);

        let report = format_brute_force_result(&run);
        assert!(report.contains("could not be returned to its previous state"));
    }

    #[test]
    fn test_exhausted_report_keeps_order() {
        let report = format_brute_force_result(&result(
            Termination::Exhausted,
            &[
                ("b-second", AttemptOutcome::Failure),
                ("a-first", AttemptOutcome::Error("host rejected profile".into())),
            ],
        ));

        assert!(report.contains("No password in the dictionary"));
        let first = report.find("b-second").unwrap();
        let second = report.find("a-first").unwrap();
        assert!(first < second);
        assert!(report.contains("[error: host rejected profile]"));
    }

    #[test]
    fn test_empty_run_report() {
        let report = format_brute_force_result(&result(Termination::Exhausted, &[]));
        assert!(report.contains("Passwords tried: 0"));
        assert!(!report.contains("in order"));
    }

    #[test]
    fn test_report_file_name() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            report_file_name("brute_force_My Net/5G", now, "txt"),
            "brute_force_My_Net_5G_20240309_140507.txt"
        );
    }

    #[test]
    fn test_save_result_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_result(dir.path(), "wifi_scan", "hello").unwrap();

        assert!(path.starts_with(dir.path()));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("wifi_scan_"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_save_json_result() {
        let dir = tempfile::tempdir().unwrap();
        let run = result(Termination::Exhausted, &[("12345678", AttemptOutcome::Failure)]);
        let path = save_json_result(dir.path(), "brute_force_CafeNet", &run).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["ssid"], "CafeNet");
        assert_eq!(value["attempts"][0]["password"], "12345678");
        assert_eq!(path.extension().unwrap(), "json");
    }

    #[test]
    fn test_save_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_result(&dir.path().join("missing"), "x", "y").unwrap_err();
        assert!(matches!(err, Error::Report { .. }));
    }

    #[test]
    fn test_scan_and_saved_reports() {
        let networks = vec![WifiNetwork {
            ssid: "HomeNet".into(),
            bssid: "aa:bb:cc:dd:ee:ff".into(),
            signal: "60%".into(),
            channel: "6".into(),
            security: String::new(),
        }];
        let report = format_networks(&networks);
        assert!(report.contains("Found 1 WiFi networks"));
        assert!(report.contains("*** (60%)"));
        assert!(report.contains("N/A"));

        assert!(format_networks(&[]).contains("No WiFi networks found"));

        let saved = vec![SavedNetwork {
            ssid: "HomeNet".into(),
            key: StoredKey::Present("hunter2hunter2".into()),
        }];
        let report = format_saved_networks(&saved);
        assert!(report.contains("SSID: HomeNet"));
        assert!(report.contains("Password: hunter2hunter2"));
    }
}
