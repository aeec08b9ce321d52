/*!
 * Deterministic in-memory control plane
 *
 * Simulates a single wireless adapter: installed profiles, the current
 * association and the text `netsh` would print for it. Every call is
 * recorded so tests can assert on the exact sequence the core issued.
 */

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::platform::NetworkControl;
use crate::profile::StagedProfile;

const CONNECT_OK: &str = "Connection request was completed successfully.";

/// A call observed by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    InstallProfile { name: String },
    RemoveProfile { name: String },
    Disconnect,
    Connect { name: String },
    QueryStatus,
    ProbeConnectivity,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<MockCall>,
    /// Installed profile name -> key material, one entry per install
    installed: Vec<(String, String)>,
    /// Highest number of same-named profiles ever installed at once
    peak_same_name: usize,
    associated: Option<String>,
}

/// Mock adapter for exercising the verifier and orchestrator
#[derive(Debug, Default)]
pub struct MockControl {
    accepted: Option<String>,
    known_networks: Vec<String>,
    fixed_status: Option<String>,
    fixed_connect_output: Option<String>,
    connect_output_for: Vec<(String, String)>,
    reachable: bool,
    fail_install: bool,
    fail_connect: bool,
    fail_status: bool,
    fail_disconnect: bool,
    state: Mutex<MockState>,
}

impl MockControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Passphrase the simulated access point accepts
    pub fn accepting(mut self, password: &str) -> Self {
        self.accepted = Some(password.to_string());
        self
    }

    /// Start out associated with `ssid` through a pre-existing profile
    pub fn connected_to(mut self, ssid: &str) -> Self {
        self.known_networks.push(ssid.to_string());
        self.state.get_mut().associated = Some(ssid.to_string());
        self
    }

    /// Always answer status queries with `text`
    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.fixed_status = Some(text.into());
        self
    }

    /// Always answer connect requests with `text`
    pub fn with_connect_output(mut self, text: impl Into<String>) -> Self {
        self.fixed_connect_output = Some(text.into());
        self
    }

    /// Answer connect requests for `profile` with `text`, overriding any other output
    pub fn with_connect_output_for(mut self, profile: &str, text: impl Into<String>) -> Self {
        self.connect_output_for.push((profile.to_string(), text.into()));
        self
    }

    /// Result of the reachability probe
    pub fn reachable(mut self, reachable: bool) -> Self {
        self.reachable = reachable;
        self
    }

    pub fn failing_install(mut self) -> Self {
        self.fail_install = true;
        self
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn failing_status(mut self) -> Self {
        self.fail_status = true;
        self
    }

    pub fn failing_disconnect(mut self) -> Self {
        self.fail_disconnect = true;
        self
    }

    /// Every call observed so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    /// Number of calls matching `pred`
    pub fn count(&self, pred: impl Fn(&MockCall) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| pred(c)).count()
    }

    /// Profile names passed to `connect`, in order
    pub fn connect_targets(&self) -> Vec<String> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                MockCall::Connect { name } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Profiles still installed
    pub fn installed_profiles(&self) -> Vec<String> {
        self.state
            .lock()
            .installed
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Highest number of same-named profiles that were ever installed together
    pub fn peak_same_name_profiles(&self) -> usize {
        self.state.lock().peak_same_name
    }

    /// Network the simulated adapter is associated with
    pub fn associated(&self) -> Option<String> {
        self.state.lock().associated.clone()
    }

    fn render_status(associated: Option<&str>) -> String {
        match associated {
            Some(ssid) => format!(
                "There is 1 interface on the system:\n\n\
                 \x20   Name                   : Wi-Fi\n\
                 \x20   State                  : connected\n\
                 \x20   SSID                   : {ssid}\n\
                 \x20   BSSID                  : 00:11:22:33:44:55\n\
                 \x20   Authentication         : WPA2-Personal\n\
                 \x20   Signal                 : 92%\n\
                 \x20   Profile                : {ssid}\n"
            ),
            None => "There is 1 interface on the system:\n\n\
                     \x20   Name                   : Wi-Fi\n\
                     \x20   State                  : disconnected\n\
                     \x20   Radio status           : Hardware On\n"
                .to_string(),
        }
    }
}

impl NetworkControl for MockControl {
    fn install_profile(&self, staged: &StagedProfile) -> Result<()> {
        let mut state = self.state.lock();
        let name = staged.name().to_string();
        state.calls.push(MockCall::InstallProfile { name: name.clone() });

        if self.fail_install {
            return Err(Error::ProfileInstall {
                name,
                detail: "The profile is corrupted.".to_string(),
            });
        }

        state
            .installed
            .push((name.clone(), staged.profile().key_material.clone()));

        let mut per_name: HashMap<&str, usize> = HashMap::new();
        for (n, _) in &state.installed {
            *per_name.entry(n.as_str()).or_default() += 1;
        }
        let peak = per_name.values().copied().max().unwrap_or(0);
        state.peak_same_name = state.peak_same_name.max(peak);
        Ok(())
    }

    fn remove_profile(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(MockCall::RemoveProfile {
            name: name.to_string(),
        });

        match state.installed.iter().position(|(n, _)| n == name) {
            Some(idx) => {
                state.installed.remove(idx);
                Ok(())
            }
            None => Err(Error::CommandFailed {
                program: "netsh".to_string(),
                status: "exit code: 1".to_string(),
                output: format!("Profile \"{}\" is not found on any interface.", name),
            }),
        }
    }

    fn disconnect(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(MockCall::Disconnect);
        state.associated = None;

        if self.fail_disconnect {
            return Err(Error::CommandFailed {
                program: "netsh".to_string(),
                status: "exit code: 1".to_string(),
                output: "The interface is not connected.".to_string(),
            });
        }
        Ok(())
    }

    fn connect(&self, profile_name: &str) -> Result<String> {
        let mut state = self.state.lock();
        state.calls.push(MockCall::Connect {
            name: profile_name.to_string(),
        });

        if self.fail_connect {
            return Err(Error::CommandFailed {
                program: "netsh".to_string(),
                status: "exit code: 1".to_string(),
                output: "There is no profile assigned to the specified interface.".to_string(),
            });
        }

        let key_accepted = state
            .installed
            .iter()
            .rev()
            .find(|(n, _)| n == profile_name)
            .is_some_and(|(_, key)| self.accepted.as_deref() == Some(key.as_str()));
        let known = self.known_networks.iter().any(|n| n == profile_name);

        state.associated = if key_accepted || known {
            Some(profile_name.to_string())
        } else {
            None
        };

        let output = self
            .connect_output_for
            .iter()
            .find(|(n, _)| n == profile_name)
            .map(|(_, text)| text.clone())
            .or_else(|| self.fixed_connect_output.clone())
            .unwrap_or_else(|| CONNECT_OK.to_string());
        Ok(output)
    }

    fn query_interface_status(&self) -> Result<String> {
        let mut state = self.state.lock();
        state.calls.push(MockCall::QueryStatus);

        if self.fail_status {
            return Err(Error::CommandFailed {
                program: "netsh".to_string(),
                status: "exit code: 1".to_string(),
                output: "The Wireless AutoConfig Service (wlansvc) is not running.".to_string(),
            });
        }

        Ok(match &self.fixed_status {
            Some(text) => text.clone(),
            None => Self::render_status(state.associated.as_deref()),
        })
    }

    fn probe_connectivity(&self) -> bool {
        self.state.lock().calls.push(MockCall::ProbeConnectivity);
        self.reachable
    }
}
