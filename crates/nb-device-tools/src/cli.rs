//! CLI-scrape adapter: banner reads and GigabitEthernet summaries from
//! plain `show` output.

use async_trait::async_trait;

use crate::error::DeviceResult;
use crate::types::DeviceTarget;

/// Returned by [`CliScrape::read_banner`] whenever no banner can be read.
pub const NO_MOTD: &str = "Error: No MOTD Configured";

const SHOW_BANNER: &str = "show banner motd";
const SHOW_RUN_BANNER: &str = "show running-config | section banner motd";
const SHOW_IP_BRIEF: &str = "show ip interface brief";

/// Runs one CLI command on a device and returns its raw output.
#[async_trait]
pub trait CliTransport: Send + Sync {
    async fn run(&self, target: &DeviceTarget, command: &str) -> DeviceResult<String>;
}

/// Read-only CLI operations the dispatcher uses.
#[async_trait]
pub trait CliScrape: Send + Sync {
    /// Banner text, or [`NO_MOTD`]. Never fails.
    async fn read_banner(&self, target: &DeviceTarget) -> String;

    /// `"<name> <status>, ... -> <u> up, <d> down, <a> administratively down"`.
    async fn gigabit_status(&self, target: &DeviceTarget) -> DeviceResult<String>;
}

/// [`CliScrape`] over any [`CliTransport`].
pub struct CliScraper<T> {
    transport: T,
}

impl<T: CliTransport> CliScraper<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn try_read_banner(&self, target: &DeviceTarget) -> DeviceResult<Option<String>> {
        let direct = self.transport.run(target, SHOW_BANNER).await?;
        if let Some(text) = clean_banner(&direct) {
            return Ok(Some(text));
        }

        let running = self.transport.run(target, SHOW_RUN_BANNER).await?;
        Ok(banner_from_running_config(&running))
    }
}

#[async_trait]
impl<T: CliTransport> CliScrape for CliScraper<T> {
    async fn read_banner(&self, target: &DeviceTarget) -> String {
        match self.try_read_banner(target).await {
            Ok(Some(text)) => text,
            Ok(None) => NO_MOTD.to_string(),
            Err(e) => {
                tracing::warn!(device = %target.host, error = %e, "banner read failed");
                NO_MOTD.to_string()
            }
        }
    }

    async fn gigabit_status(&self, target: &DeviceTarget) -> DeviceResult<String> {
        let output = self.transport.run(target, SHOW_IP_BRIEF).await?;
        Ok(summarize_gigabit(&output))
    }
}

/// Clean `show banner motd` output. None when the device rejected the
/// command or printed nothing.
pub fn clean_banner(output: &str) -> Option<String> {
    let text = output.trim();
    if text.is_empty() || text.contains("Invalid input") || text.contains("Incomplete") {
        return None;
    }
    let text = text.strip_prefix("^C").unwrap_or(text).trim_start();
    let text = text.strip_suffix("^C").unwrap_or(text).trim_end();
    (!text.is_empty()).then(|| text.to_string())
}

/// Extract the body of `banner motd <d>...<d>` from running-config output.
/// The delimiter is `^C` or any single character.
pub fn banner_from_running_config(output: &str) -> Option<String> {
    let start = output.find("banner motd")?;
    let rest = output[start + "banner motd".len()..].trim_start_matches([' ', '\t']);

    let delimiter = if rest.starts_with("^C") {
        "^C"
    } else {
        let c = rest.chars().next()?;
        &rest[..c.len_utf8()]
    };
    let body = &rest[delimiter.len()..];
    let end = body.find(delimiter)?;

    let text = body[..end].trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Summarize `show ip interface brief` rows for GigabitEthernet interfaces.
///
/// Row layout: `Interface IP-Address OK? Method Status Protocol`, where
/// Status may be the two words `administratively down`.
pub fn summarize_gigabit(output: &str) -> String {
    let (mut up, mut down, mut admin_down) = (0, 0, 0);
    let mut rows = Vec::new();

    for line in output.lines() {
        let cols: Vec<&str> = line.split_whitespace().collect();
        let Some(name) = cols.first() else { continue };
        if !name.starts_with("GigabitEthernet") || cols.len() < 6 {
            continue;
        }
        // Status is everything between Method and the trailing Protocol column.
        let status = cols[4..cols.len() - 1].join(" ").to_lowercase();

        if status == "up" {
            up += 1;
        } else if status.contains("administratively") {
            admin_down += 1;
        } else {
            down += 1;
        }
        rows.push(format!("{name} {status}"));
    }

    format!(
        "{} -> {up} up, {down} down, {admin_down} administratively down",
        rows.join(", ")
    )
}
