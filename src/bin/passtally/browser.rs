use std::process::Command;

use anyhow::{Context, Result};
use tracing::debug;

#[cfg(target_os = "macos")]
const OPENER: &str = "open";

#[cfg(all(unix, not(target_os = "macos")))]
const OPENER: &str = "xdg-open";

/// Opens each url in the default browser, one opener process per link.
#[cfg(unix)]
pub fn open_urls(urls: &[&str]) -> Result<()> {
    for url in urls {
        debug!(url, opener = OPENER, "opening link");
        let status = Command::new(OPENER)
            .arg(url)
            .status()
            .with_context(|| format!("Failed to run {OPENER}"))?;
        if !status.success() {
            anyhow::bail!("{OPENER} exited with {status} for {url}");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn open_urls(urls: &[&str]) -> Result<()> {
    for url in urls {
        debug!(url, "opening link");
        let status = Command::new("cmd")
            .args(["/C", "start", "", url])
            .status()
            .context("Failed to run start")?;
        if !status.success() {
            anyhow::bail!("start exited with {status} for {url}");
        }
    }
    Ok(())
}
