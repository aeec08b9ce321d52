/*!
 * Classification of free-text adapter output
 *
 * `netsh` output is localized and unstructured. Everything here is a pure
 * function over that text so the rules can be tested without an adapter.
 */

/// Locale-dependent words the host uses to report connection state
#[derive(Debug, Clone, Copy)]
pub struct LocaleMarkers {
    /// Found in `connect` output when the request was accepted
    pub connect_ok: &'static [&'static str],
    /// Interface state: associated
    pub connected: &'static [&'static str],
    /// Interface state: not associated
    pub disconnected: &'static [&'static str],
    /// Label of the state line in interface status
    pub state_labels: &'static [&'static str],
}

/// English and Simplified Chinese host output
pub const DEFAULT_MARKERS: LocaleMarkers = LocaleMarkers {
    connect_ok: &["success", "成功"],
    connected: &["connected", "已连接"],
    disconnected: &["disconnected", "已断开", "已断开连接"],
    state_labels: &["State", "状态"],
};

/// Verdict of the ordered status rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusVerdict {
    /// Target SSID does not appear in the status text
    SsidAbsent,
    /// SSID present and an explicit connected marker
    Connected,
    /// SSID present and an explicit disconnected marker
    Disconnected,
    /// SSID present, no recognizable state
    Ambiguous,
}

/// Whether `connect` output carries a success marker (case-insensitive)
///
/// ASCII markers must start a word: "successfully" is accepted,
/// "unsuccessful" is not.
pub fn connect_accepted(output: &str, markers: &LocaleMarkers) -> bool {
    markers.connect_ok.iter().any(|m| {
        if m.is_ascii() {
            words(output).any(|word| {
                word.get(..m.len())
                    .is_some_and(|prefix| prefix.eq_ignore_ascii_case(m))
            })
        } else {
            output.contains(m)
        }
    })
}

/// Apply the ordered rule table to interface status text
///
/// The SSID is compared against the `SSID` lines when the text has any, so
/// a target of `Cafe` is not satisfied by an association with `CafeNet`.
/// Text without an `SSID` line is searched as a whole.
///
/// 1. SSID absent -> [`StatusVerdict::SsidAbsent`]
/// 2. connected marker -> [`StatusVerdict::Connected`]
/// 3. disconnected marker -> [`StatusVerdict::Disconnected`]
/// 4. anything else -> [`StatusVerdict::Ambiguous`]
pub fn classify_status(status: &str, ssid: &str, markers: &LocaleMarkers) -> StatusVerdict {
    if ssid.is_empty() || !mentions_ssid(status, ssid) {
        return StatusVerdict::SsidAbsent;
    }
    if has_any_marker(status, markers.connected) {
        return StatusVerdict::Connected;
    }
    if has_any_marker(status, markers.disconnected) {
        return StatusVerdict::Disconnected;
    }
    StatusVerdict::Ambiguous
}

/// Point-in-time read of the wireless adapter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdapterStatus {
    /// Associated SSID, if the status reported one
    pub ssid: Option<String>,
    /// Whether the state line reported a connection
    pub connected: bool,
}

impl AdapterStatus {
    /// Parse `netsh wlan show interfaces` style text
    pub fn parse(text: &str, markers: &LocaleMarkers) -> Self {
        let mut ssid = None;
        let mut connected = false;

        for (label, value) in fields(text) {
            if label == "SSID" {
                if !value.is_empty() {
                    ssid = Some(value.to_string());
                }
            } else if markers.state_labels.contains(&label) {
                connected = has_any_marker(value, markers.connected);
            }
        }

        Self { ssid, connected }
    }

    /// Network to restore after the run, when there was one
    pub fn original_network(&self) -> Option<&str> {
        if self.connected {
            self.ssid.as_deref()
        } else {
            None
        }
    }
}

/// `label : value` pairs, both trimmed
fn fields(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.lines()
        .filter_map(|line| line.trim().split_once(':'))
        .map(|(label, value)| (label.trim(), value.trim()))
}

fn mentions_ssid(status: &str, ssid: &str) -> bool {
    let mut reported = fields(status)
        .filter(|(label, _)| *label == "SSID")
        .map(|(_, value)| value)
        .peekable();

    if reported.peek().is_some() {
        reported.any(|value| value.to_lowercase() == ssid.to_lowercase())
    } else {
        status.to_lowercase().contains(&ssid.to_lowercase())
    }
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
}

fn has_any_marker(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| has_marker(text, m))
}

/// ASCII markers match whole words only, so "connected" never matches
/// inside "disconnected". Other markers match as substrings.
fn has_marker(text: &str, marker: &str) -> bool {
    if marker.is_ascii() {
        words(text).any(|word| word.eq_ignore_ascii_case(marker))
    } else {
        text.contains(marker)
    }
}
