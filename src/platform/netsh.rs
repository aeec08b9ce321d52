/*!
 * Host control plane backed by `netsh wlan` and `ping`
 */

use std::process::Command;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::platform::NetworkControl;
use crate::profile::StagedProfile;

/// Default reachability probe target
pub const DEFAULT_PROBE_TARGET: &str = "8.8.8.8";

/// Default reachability probe deadline
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Markers that show up in a ping reply line
const PING_REPLY_MARKERS: &[&str] = &["ttl=", "time=", "time<", "时间="];

/// Wireless adapter driven through the host's `netsh` tool
#[derive(Debug, Clone)]
pub struct NetshControl {
    probe_target: String,
    probe_timeout: Duration,
}

impl Default for NetshControl {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TARGET, DEFAULT_PROBE_TIMEOUT)
    }
}

impl NetshControl {
    pub fn new(probe_target: impl Into<String>, probe_timeout: Duration) -> Self {
        Self {
            probe_target: probe_target.into(),
            probe_timeout,
        }
    }

    fn ping_args(&self) -> Vec<String> {
        #[cfg(target_os = "windows")]
        {
            vec![
                "-n".to_string(),
                "1".to_string(),
                "-w".to_string(),
                self.probe_timeout.as_millis().max(1).to_string(),
                self.probe_target.clone(),
            ]
        }

        #[cfg(not(target_os = "windows"))]
        {
            // -W takes whole seconds here
            let secs = self.probe_timeout.as_secs_f64().ceil().max(1.0) as u64;
            vec![
                "-c".to_string(),
                "1".to_string(),
                "-W".to_string(),
                secs.to_string(),
                self.probe_target.clone(),
            ]
        }
    }
}

impl NetworkControl for NetshControl {
    fn install_profile(&self, staged: &StagedProfile) -> Result<()> {
        let filename = format!("filename={}", staged.path().display());
        run_command("netsh", &["wlan", "add", "profile", &filename])
            .map(|_| ())
            .map_err(|e| Error::ProfileInstall {
                name: staged.name().to_string(),
                detail: e.to_string(),
            })
    }

    fn remove_profile(&self, name: &str) -> Result<()> {
        let name = format!("name={}", name);
        run_command("netsh", &["wlan", "delete", "profile", &name]).map(|_| ())
    }

    fn disconnect(&self) -> Result<()> {
        run_command("netsh", &["wlan", "disconnect"]).map(|_| ())
    }

    fn connect(&self, profile_name: &str) -> Result<String> {
        let name = format!("name={}", profile_name);
        run_command("netsh", &["wlan", "connect", &name])
    }

    fn query_interface_status(&self) -> Result<String> {
        run_command("netsh", &["wlan", "show", "interfaces"])
    }

    fn probe_connectivity(&self) -> bool {
        let args = self.ping_args();
        match Command::new("ping").args(&args).output() {
            // Exit status is ignored: some ping builds exit 0 on "unreachable"
            Ok(output) => {
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                ping_reply_received(&text)
            }
            Err(e) => {
                tracing::debug!(error = %e, "ping could not be started");
                false
            }
        }
    }
}

/// Whether ping output contains a reply line
pub fn ping_reply_received(output: &str) -> bool {
    let lower = output.to_lowercase();
    PING_REPLY_MARKERS.iter().any(|m| lower.contains(m))
}

/// Run a host command and return its combined stdout and stderr
///
/// A non-zero exit status becomes [`Error::CommandFailed`] carrying the output.
pub(crate) fn run_command(program: &str, args: &[&str]) -> Result<String> {
    tracing::trace!(program, ?args, "running host command");

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| Error::Command {
            program: program.to_string(),
            source,
        })?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    if output.status.success() {
        Ok(text)
    } else {
        Err(Error::CommandFailed {
            program: program.to_string(),
            status: output.status.to_string(),
            output: text.trim().to_string(),
        })
    }
}
