/*!
 * Nearby and saved WiFi networks
 *
 * Both come from `netsh wlan` listings. Parsing is kept separate from the
 * command calls and accepts English and Simplified Chinese field labels.
 */

use std::fmt;
use std::time::Duration;

use crate::error::Result;
use crate::platform::netsh::run_command;

/// WiFi network information, one entry per access point
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WifiNetwork {
    /// Network SSID (name)
    pub ssid: String,
    /// Access point MAC address
    pub bssid: String,
    /// Signal strength as reported, e.g. "85%"
    pub signal: String,
    /// WiFi channel
    pub channel: String,
    /// Authentication type (e.g. WPA2-Personal, Open)
    pub security: String,
}

impl WifiNetwork {
    /// Signal strength as a percentage, when it parses
    pub fn signal_percent(&self) -> Option<u8> {
        self.signal.trim().trim_end_matches('%').trim().parse().ok()
    }

    /// One star per 20 % followed by the raw value, e.g. `**** (85%)`
    pub fn signal_stars(&self) -> String {
        match self.signal_percent() {
            Some(pct) => format!("{} ({})", "*".repeat(usize::from(pct / 20)), self.signal),
            None => self.signal.clone(),
        }
    }
}

impl fmt::Display for WifiNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SSID: {:<20} | Signal: {:<10} | Channel: {:<8} | Security: {:<15} | BSSID: {}",
            self.ssid, self.signal, self.channel, self.security, self.bssid
        )
    }
}

/// Key stored with a saved profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredKey {
    Present(String),
    /// Profile exists but carries no key (open network or not exportable)
    Absent,
    /// Profile details could not be read
    Unavailable(String),
}

impl fmt::Display for StoredKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredKey::Present(key) => write!(f, "{}", key),
            StoredKey::Absent => write!(f, "(no key stored)"),
            StoredKey::Unavailable(reason) => write!(f, "(lookup failed: {})", reason),
        }
    }
}

/// Profile saved on this machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedNetwork {
    pub ssid: String,
    pub key: StoredKey,
}

/// Scan for nearby networks
pub fn scan_networks() -> Result<Vec<WifiNetwork>> {
    // Best effort: not every netsh build knows this form
    if let Err(e) = run_command("netsh", &["wlan", "show", "networks", "refresh"]) {
        tracing::debug!(error = %e, "network list refresh failed, scanning anyway");
    }
    std::thread::sleep(Duration::from_millis(500));

    let output = match run_command("netsh", &["wlan", "show", "networks", "mode=bssid"]) {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!(error = %e, "bssid scan failed, retrying basic scan");
            run_command("netsh", &["wlan", "show", "networks"])?
        }
    };

    let networks = parse_networks(&output);
    tracing::debug!(count = networks.len(), "parsed scan output");
    Ok(networks)
}

/// Saved profiles together with their stored keys
///
/// A profile whose details cannot be read is still listed.
pub fn saved_networks() -> Result<Vec<SavedNetwork>> {
    let listing = run_command("netsh", &["wlan", "show", "profiles"])?;

    let networks = parse_profile_names(&listing)
        .into_iter()
        .map(|ssid| {
            let name = format!("name={}", ssid);
            let key = match run_command("netsh", &["wlan", "show", "profile", &name, "key=clear"]) {
                Ok(details) => parse_key_content(&details).map_or(StoredKey::Absent, StoredKey::Present),
                Err(e) => {
                    tracing::warn!(ssid = %ssid, error = %e, "failed to read profile");
                    StoredKey::Unavailable(e.to_string())
                }
            };
            SavedNetwork { ssid, key }
        })
        .collect();

    Ok(networks)
}

/// Parse `netsh wlan show networks [mode=bssid]` output
///
/// Authentication is reported once per SSID and inherited by each of its
/// access points. An SSID without BSSID lines still yields one entry.
pub fn parse_networks(output: &str) -> Vec<WifiNetwork> {
    let mut networks = Vec::new();
    let mut ssid: Option<String> = None;
    let mut security = String::new();
    let mut current: Option<WifiNetwork> = None;
    let mut ssid_has_bssid = false;

    let flush_ssid = |networks: &mut Vec<WifiNetwork>,
                      current: &mut Option<WifiNetwork>,
                      ssid: &Option<String>,
                      security: &str,
                      has_bssid: bool| {
        if let Some(network) = current.take() {
            networks.push(network);
        } else if let (Some(ssid), false) = (ssid, has_bssid) {
            networks.push(WifiNetwork {
                ssid: ssid.clone(),
                security: security.to_string(),
                ..WifiNetwork::default()
            });
        }
    };

    for line in output.lines() {
        let Some((label, value)) = line.trim().split_once(':') else {
            continue;
        };
        let label = label.trim().to_lowercase();
        let value = value.trim();

        if label.starts_with("ssid") {
            flush_ssid(&mut networks, &mut current, &ssid, &security, ssid_has_bssid);
            ssid = Some(value.to_string());
            security.clear();
            ssid_has_bssid = false;
        } else if label.starts_with("bssid") {
            if let Some(network) = current.take() {
                networks.push(network);
            }
            current = Some(WifiNetwork {
                ssid: ssid.clone().unwrap_or_default(),
                bssid: value.to_string(),
                security: security.clone(),
                ..WifiNetwork::default()
            });
            ssid_has_bssid = true;
        } else if label.contains("authentication") || label.contains("验证") {
            security = value.to_string();
            if let Some(network) = current.as_mut() {
                network.security = security.clone();
            }
        } else if label.contains("signal") || label.contains("信号") {
            if let Some(network) = current.as_mut() {
                network.signal = value.to_string();
            }
        } else if matches!(label.as_str(), "channel" | "信道" | "频道") {
            if let Some(network) = current.as_mut() {
                network.channel = value.to_string();
            }
        }
    }
    flush_ssid(&mut networks, &mut current, &ssid, &security, ssid_has_bssid);

    networks
}

/// Profile names from `netsh wlan show profiles`
pub fn parse_profile_names(output: &str) -> Vec<String> {
    labelled_values(output, &["all user profile", "所有用户配置文件"])
}

/// Clear-text key from `netsh wlan show profile name=... key=clear`
pub fn parse_key_content(output: &str) -> Option<String> {
    labelled_values(output, &["key content", "关键内容"]).into_iter().next()
}

fn labelled_values(output: &str, labels: &[&str]) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_once(':'))
        .filter(|(label, _)| {
            let label = label.trim().to_lowercase();
            labels.iter().any(|l| label == *l)
        })
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}
