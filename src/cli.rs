use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use wifi_sos::platform::netsh::{DEFAULT_PROBE_TARGET, DEFAULT_PROBE_TIMEOUT};
use wifi_sos::{BruteforceConfig, DictionarySpec, SettleIntervals};

#[derive(Parser)]
#[command(name = "wifi-sos")]
#[command(version)]
#[command(about = "WiFi scanning, saved-profile recovery and passphrase auditing - use only on networks you are authorized to test", long_about = None)]
pub struct Args {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Subcommand)]
pub enum Mode {
    /// Scan nearby WiFi networks
    ///
    /// Example: wifi-sos scan
    Scan {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// List saved WiFi profiles and their stored keys
    ///
    /// Requires administrator privileges to reveal keys.
    ///
    /// Example: wifi-sos saved
    Saved {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Audit a network's passphrase with an online dictionary attack
    ///
    /// Each candidate is installed as a temporary profile, connected,
    /// verified and removed again. Expect several seconds per candidate.
    ///
    /// Example: wifi-sos brute --ssid "HomeNet" --dict passwords.txt --max 50
    Brute(BruteArgs),
}

#[derive(clap::Args)]
pub struct OutputArgs {
    /// Do not write the report to a timestamped file
    #[arg(long)]
    pub no_save: bool,

    /// Directory for report files
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(clap::Args)]
pub struct BruteArgs {
    /// Target network SSID
    #[arg(short, long)]
    pub ssid: String,

    /// Custom password dictionary (one password per line)
    #[arg(short, long, value_name = "FILE")]
    pub dict: Option<PathBuf>,

    /// Maximum number of passwords to try (0 = unlimited)
    #[arg(short, long, default_value = "0")]
    pub max: usize,

    /// Wait after disconnecting, in milliseconds
    #[arg(long, default_value = "3000")]
    pub disconnect_settle_ms: u64,

    /// Wait after a connect request before reading status, in milliseconds
    #[arg(long, default_value = "3000")]
    pub connect_settle_ms: u64,

    /// Wait before reconnecting to the original network, in milliseconds
    #[arg(long, default_value = "2000")]
    pub restore_settle_ms: u64,

    /// Address pinged when the interface status is ambiguous
    #[arg(long, default_value = DEFAULT_PROBE_TARGET)]
    pub probe_target: String,

    /// Reachability probe deadline, in milliseconds
    #[arg(long, default_value_t = DEFAULT_PROBE_TIMEOUT.as_millis() as u64)]
    pub probe_timeout_ms: u64,

    /// Write the report as JSON instead of text
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl BruteArgs {
    pub fn dictionary(&self) -> DictionarySpec {
        DictionarySpec {
            path: self.dict.clone(),
            max_attempts: self.max,
        }
    }

    pub fn config(&self) -> BruteforceConfig {
        BruteforceConfig {
            settle: SettleIntervals {
                disconnect: Duration::from_millis(self.disconnect_settle_ms),
                connect: Duration::from_millis(self.connect_settle_ms),
                restore: Duration::from_millis(self.restore_settle_ms),
            },
            ..BruteforceConfig::default()
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}
