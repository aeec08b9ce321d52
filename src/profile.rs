/*!
 * Ephemeral WLAN profiles
 *
 * A profile binds an SSID to a WPA2-Personal/AES passphrase. It is rendered
 * as a WLAN profile XML document, staged to a temporary file for the host
 * to import, and removed again as soon as the attempt is over.
 */

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const PROFILE_NAMESPACE: &str = "http://www.microsoft.com/networking/WLAN/profile/v1";
const PROFILE_NAMESPACE_V3: &str = "http://www.microsoft.com/networking/WLAN/profile/v3";

/// Temporary network profile for a single connection attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    /// Profile name as registered with the host (equal to the SSID)
    pub name: String,
    /// Target network SSID
    pub ssid: String,
    /// Authentication scheme
    pub authentication: &'static str,
    /// Encryption scheme
    pub encryption: &'static str,
    /// Candidate passphrase, in clear
    pub key_material: String,
}

impl NetworkProfile {
    /// WPA2-Personal/AES profile named after the SSID
    pub fn wpa2_personal(ssid: &str, password: &str) -> Self {
        Self {
            name: ssid.to_string(),
            ssid: ssid.to_string(),
            authentication: "WPA2PSK",
            encryption: "AES",
            key_material: password.to_string(),
        }
    }

    /// Uppercase hex of the raw SSID bytes
    pub fn ssid_hex(&self) -> String {
        self.ssid.bytes().fold(String::new(), |mut acc, b| {
            let _ = write!(acc, "{:02X}", b);
            acc
        })
    }

    /// Render the profile as a WLAN profile XML document
    ///
    /// The connection is manual and auto-switch is off, so the host never
    /// joins this profile on its own once the attempt is over.
    pub fn to_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0"?>
<WLANProfile xmlns="{ns}">
	<name>{name}</name>
	<SSIDConfig>
		<SSID>
			<hex>{hex}</hex>
			<name>{ssid}</name>
		</SSID>
		<nonBroadcast>false</nonBroadcast>
	</SSIDConfig>
	<connectionType>ESS</connectionType>
	<connectionMode>manual</connectionMode>
	<autoSwitch>false</autoSwitch>
	<MSM>
		<security>
			<authEncryption>
				<authentication>{auth}</authentication>
				<encryption>{enc}</encryption>
				<useOneX>false</useOneX>
			</authEncryption>
			<sharedKey>
				<keyType>passPhrase</keyType>
				<protected>false</protected>
				<keyMaterial>{key}</keyMaterial>
			</sharedKey>
		</security>
	</MSM>
	<MacRandomization xmlns="{ns3}">
		<enableRandomization>false</enableRandomization>
	</MacRandomization>
</WLANProfile>
"#,
            ns = PROFILE_NAMESPACE,
            ns3 = PROFILE_NAMESPACE_V3,
            name = xml_escape(&self.name),
            hex = self.ssid_hex(),
            ssid = xml_escape(&self.ssid),
            auth = self.authentication,
            enc = self.encryption,
            key = xml_escape(&self.key_material),
        )
    }
}

/// Profile whose XML payload has been written to disk
///
/// The file is deleted when the value is dropped. Deletion is best effort.
#[derive(Debug)]
pub struct StagedProfile {
    profile: NetworkProfile,
    path: PathBuf,
}

impl StagedProfile {
    /// Write the profile payload into `dir`
    pub fn write(profile: NetworkProfile, dir: &Path) -> Result<Self> {
        let path = dir.join(staging_file_name(&profile.ssid));
        std::fs::write(&path, profile.to_xml()).map_err(|source| Error::ProfileStage {
            path: path.clone(),
            source,
        })?;
        Ok(Self { profile, path })
    }

    pub fn profile(&self) -> &NetworkProfile {
        &self.profile
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedProfile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to delete staged profile");
            }
        }
    }
}

/// File name for a staged payload: SSID with anything outside [A-Za-z0-9-]
/// replaced, suffixed with the process id
fn staging_file_name(ssid: &str) -> String {
    let sanitized: String = ssid
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("{}_{}_temp.xml", sanitized, std::process::id())
}

fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssid_hex_uses_raw_bytes() {
        let profile = NetworkProfile::wpa2_personal("Café 5G", "12345678");
        assert_eq!(profile.ssid_hex(), "436166C3A9203547");
    }

    #[test]
    fn test_xml_binds_name_ssid_and_key() {
        let profile = NetworkProfile::wpa2_personal("HomeNet", "1q2w3e4r");
        let xml = profile.to_xml();

        assert!(xml.contains("<name>HomeNet</name>"));
        assert!(xml.contains("<hex>486F6D654E6574</hex>"));
        assert!(xml.contains("<authentication>WPA2PSK</authentication>"));
        assert!(xml.contains("<encryption>AES</encryption>"));
        assert!(xml.contains("<keyMaterial>1q2w3e4r</keyMaterial>"));
        assert!(xml.contains("<connectionMode>manual</connectionMode>"));
    }

    #[test]
    fn test_xml_escapes_markup() {
        let profile = NetworkProfile::wpa2_personal("A&B <lab>", "p\"w'<>&");
        let xml = profile.to_xml();

        assert!(xml.contains("<name>A&amp;B &lt;lab&gt;</name>"));
        assert!(xml.contains("<keyMaterial>p&quot;w&apos;&lt;&gt;&amp;</keyMaterial>"));
    }

    #[test]
    fn test_staged_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let staged =
            StagedProfile::write(NetworkProfile::wpa2_personal("My Net", "secret99"), dir.path())
                .unwrap();
        let path = staged.path().to_path_buf();

        assert!(path.exists());
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("My_Net_"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("secret99"));

        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn test_staging_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = StagedProfile::write(NetworkProfile::wpa2_personal("X", "y"), &missing).unwrap_err();
        assert!(matches!(err, Error::ProfileStage { .. }));
    }
}
